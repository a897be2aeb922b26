use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use tokio::{
    sync::RwLock,
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, warn};

use crate::{
    config::{Config, ResponseOrdering, SearchMode},
    openlibrary::SearchQuery,
    traits::Catalog,
    types::{
        book::Book,
        cover::{CoverHandle, CoverSize, CoverStore},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub mode:       SearchMode,
    pub limit:      u32,
    pub ordering:   ResponseOrdering,
    pub cover_size: Option<CoverSize>,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode:       config.search_mode,
            limit:      config.result_limit,
            ordering:   config.ordering,
            cover_size: config.covers.then_some(config.cover_size),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything the views render from.
#[derive(Debug, Default)]
pub struct RenderState {
    pub query:       String,
    pub results:     Vec<Book>,
    /// Sequence number of the search `results` came from.
    pub results_seq: u64,
    /// Cover handles for `results`, keyed by book key. Filled in after the
    /// results themselves.
    pub covers:      HashMap<String, CoverHandle>,
    pub error:       String,
    pub loading:     bool,
}

impl RenderState {
    pub fn cover_for(&self, book: &Book) -> Option<&CoverHandle> {
        self.covers.get(&book.key)
    }
}

/// Owns the search lifecycle and the [RenderState] it produces.
pub struct SearchController<C: Catalog> {
    catalog:  Arc<C>,
    covers:   CoverStore,
    state:    Arc<RwLock<RenderState>>,
    issued:   Arc<AtomicU64>,
    settings: SearchSettings,
}

impl<C: Catalog> Clone for SearchController<C> {
    fn clone(&self) -> Self {
        Self {
            catalog:  self.catalog.clone(),
            covers:   self.covers.clone(),
            state:    self.state.clone(),
            issued:   self.issued.clone(),
            settings: self.settings,
        }
    }
}

impl<C: Catalog> SearchController<C> {
    pub fn new(catalog: C, settings: SearchSettings) -> Self {
        Self {
            catalog: Arc::new(catalog),
            covers: CoverStore::new(),
            state: Arc::new(RwLock::new(RenderState::default())),
            issued: Arc::new(AtomicU64::new(0)),
            settings,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn state(&self) -> &Arc<RwLock<RenderState>> {
        &self.state
    }

    pub fn covers(&self) -> &CoverStore {
        &self.covers
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    pub async fn turn_loading_on(&self) {
        self.state.write().await.loading = true;
    }

    pub async fn turn_loading_off(&self) {
        self.state.write().await.loading = false;
    }

    /// Start a search for `name` and return without waiting for it.
    ///
    /// The returned handle resolves once the response has been applied to
    /// (or discarded from) the render state. Covers for the new results are
    /// attached later by a task of their own.
    pub async fn search(&self, name: &str) -> JoinHandle<()> {
        let query = SearchQuery::new(name, self.settings.mode, self.settings.limit);
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write().await;
            state.query = query.text().to_string();
            state.loading = true;
        }
        info!("Search #{seq} for {:?} issued.", query.text());

        let controller = self.clone();
        tokio::spawn(async move { controller.settle(seq, query).await })
    }

    async fn settle(self, seq: u64, query: SearchQuery) {
        let outcome = self.catalog.search(&query).await;

        // Decided under the lock, a search issued while waiting for it wins.
        let mut state = self.state.write().await;
        if self.is_superseded(seq) {
            debug!("Search #{seq} for {:?} superseded, dropping its response.", query.text());
            return;
        }

        match outcome {
            Ok(response) => {
                let results = Book::from_records(response.docs);
                info!("Search #{seq} for {:?} found {} books.", query.text(), results.len());
                let with_covers = results
                    .iter()
                    .filter(|x| x.cover_id.is_some())
                    .cloned()
                    .collect::<Vec<Book>>();
                state.results = results;
                state.results_seq = seq;
                state.covers.clear();
                state.error.clear();
                if self.is_latest(seq) {
                    state.loading = false;
                }
                drop(state);

                if let Some(size) = self.settings.cover_size {
                    if !with_covers.is_empty() {
                        tokio::spawn(self.attach_covers(seq, with_covers, size));
                    }
                }
            }
            Err(e) => {
                warn!("Search #{seq} for {:?} failed: {e:#}", query.text());
                state.error = format!("{e:#}");
                if self.is_latest(seq) {
                    state.loading = false;
                }
            }
        }
    }

    /// Fetch covers for `books` side by side and attach each one as it
    /// arrives, for as long as the results of search `seq` are on display.
    async fn attach_covers(self, seq: u64, books: Vec<Book>, size: CoverSize) {
        let mut fetches = JoinSet::new();
        for book in books {
            let controller = self.clone();
            fetches.spawn(async move {
                let handle = book
                    .find_cover(controller.catalog.as_ref(), size, &controller.covers)
                    .await;
                (book.key, handle)
            });
        }

        while let Some(fetched) = fetches.join_next().await {
            let (key, handle) = match fetched {
                Ok((key, Some(handle))) => (key, handle),
                Ok((_, None)) => continue,
                Err(e) => {
                    warn!("Cover fetch for search #{seq} died: {e}");
                    continue;
                }
            };
            let mut state = self.state.write().await;
            if state.results_seq != seq {
                // Dropping `fetches` aborts whatever is still in flight.
                debug!("Results of search #{seq} were replaced, dropping its covers.");
                return;
            }
            state.covers.insert(key, handle);
        }
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == seq
    }

    fn is_superseded(&self, seq: u64) -> bool {
        self.settings.ordering == ResponseOrdering::LatestIssued && !self.is_latest(seq)
    }
}
