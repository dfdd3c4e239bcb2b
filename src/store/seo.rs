use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::lock;
use crate::Result;

/// Page metadata rendered into the frontend for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeoEntry {
    pub id: u64,
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoChanges {
    pub path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_image: Option<String>,
}

pub trait SeoStore: Send + Sync {
    fn all(&self) -> Result<Vec<SeoEntry>>;

    fn find_by_path(&self, path: &str) -> Result<Option<SeoEntry>>;

    /// Replaces the entry for `changes.path`, creating it when missing.
    fn upsert(&self, changes: SeoChanges) -> Result<SeoEntry>;
}

pub type SeoStoreService = Arc<dyn SeoStore>;

#[derive(Debug, Default)]
struct State {
    last_id: u64,
    entries: Vec<SeoEntry>,
}

#[derive(Debug, Default)]
pub struct InMemorySeoStore {
    state: Mutex<State>,
}

impl InMemorySeoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeoStore for InMemorySeoStore {
    fn all(&self) -> Result<Vec<SeoEntry>> {
        Ok(lock(&self.state, "seo")?.entries.clone())
    }

    fn find_by_path(&self, path: &str) -> Result<Option<SeoEntry>> {
        let state = lock(&self.state, "seo")?;
        Ok(state.entries.iter().find(|entry| entry.path == path).cloned())
    }

    fn upsert(&self, changes: SeoChanges) -> Result<SeoEntry> {
        let mut state = lock(&self.state, "seo")?;
        let now = Utc::now();
        if let Some(entry) = state
            .entries
            .iter_mut()
            .find(|entry| entry.path == changes.path)
        {
            entry.title = changes.title;
            entry.description = changes.description;
            entry.keywords = changes.keywords;
            entry.og_image = changes.og_image;
            entry.updated_at = now;
            return Ok(entry.clone());
        }
        state.last_id += 1;
        let entry = SeoEntry {
            id: state.last_id,
            path: changes.path,
            title: changes.title,
            description: changes.description,
            keywords: changes.keywords,
            og_image: changes.og_image,
            created_at: now,
            updated_at: now,
        };
        state.entries.push(entry.clone());
        Ok(entry)
    }
}
