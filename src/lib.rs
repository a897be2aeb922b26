pub mod config;
pub mod controller;
pub mod default_colors;
pub mod logging;
pub mod openlib_schema;
pub mod openlibrary;
pub mod traits;
pub mod types;
pub mod view;
