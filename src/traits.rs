use std::future::Future;

use anyhow::Result;

use crate::{
    config::Config,
    openlib_schema::search::SearchResponse,
    openlibrary::SearchQuery,
    types::cover::{CoverImage, CoverSize},
};

/// The book catalog the controller talks to.
pub trait Catalog: Send + Sync + 'static {
    fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<SearchResponse>> + Send;

    fn cover(&self, cover_id: u64, size: CoverSize)
        -> impl Future<Output = Result<CoverImage>> + Send;
}

pub trait DisplayTerminal {
    fn fmt(&self, f: &mut String, config: &Config) -> Result<()>;

    fn fmt_to_string(&self, config: &Config) -> Result<String> {
        let mut s = String::new();
        DisplayTerminal::fmt(self, &mut s, config)?;
        Ok(s)
    }
}
