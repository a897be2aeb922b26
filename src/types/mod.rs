pub mod uuid;

pub mod book;
pub mod cover;
