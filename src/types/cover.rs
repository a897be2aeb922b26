use std::{
    collections::HashMap,
    fmt::Display,
    sync::{Arc, Mutex},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::types::uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoverSize {
    #[serde(rename = "S", alias = "small")]
    Small,
    #[serde(rename = "M", alias = "medium")]
    Medium,
    #[serde(rename = "L", alias = "large")]
    Large,
}

impl CoverSize {
    pub fn letter(&self) -> &'static str {
        match self {
            CoverSize::Small => "S",
            CoverSize::Medium => "M",
            CoverSize::Large => "L",
        }
    }
}

impl Display for CoverSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub bytes:        Vec<u8>,
    pub content_type: String,
}

/// Cover images fetched for the current results, addressable by id while a
/// [CoverHandle] for them is alive.
#[derive(Default, Debug, Clone)]
pub struct CoverStore {
    images: Arc<Mutex<HashMap<Uuid, CoverImage>>>,
}

impl CoverStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `image` until the returned handle is dropped.
    ///
    /// Gives `None` when the store is unusable, since a handle to nothing
    /// would only produce a broken link.
    pub fn register(&self, image: CoverImage) -> Option<CoverHandle> {
        let id = Uuid::new();
        match self.images.lock() {
            Ok(mut images) => {
                images.insert(id.clone(), image);
            }
            Err(e) => {
                warn!("Cover store is poisoned, not keeping cover {id}: {e}");
                return None;
            }
        }
        Some(CoverHandle {
            id,
            store: self.clone(),
        })
    }

    pub fn get(&self, id: &Uuid) -> Option<CoverImage> {
        self.images.lock().ok()?.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.images.lock().map(|x| x.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn release(&self, id: &Uuid) {
        if let Ok(mut images) = self.images.lock() {
            images.remove(id);
        }
    }
}

/// Owns one entry of a [CoverStore]; the entry goes away with the handle.
#[derive(Debug)]
pub struct CoverHandle {
    id:    Uuid,
    store: CoverStore,
}

impl CoverHandle {
    pub fn id(&self) -> &Uuid {
        &self.id
    }

    /// Path the web view serves this cover under.
    pub fn url(&self) -> String {
        format!("/covers/{}", self.id)
    }
}

impl Drop for CoverHandle {
    fn drop(&mut self) {
        debug!("Releasing cover {}.", self.id);
        self.store.release(&self.id);
    }
}
