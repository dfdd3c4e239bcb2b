//! Persistence seams for the application data, with in-memory and SQLite implementations.

mod seed;
mod seo;
mod setting;
mod sqlite;
mod todo;

use std::sync::{Arc, Mutex, MutexGuard};

pub use seed::{seed, Seeded};
pub use seo::{InMemorySeoStore, SeoChanges, SeoEntry, SeoStore, SeoStoreService};
pub use setting::{InMemorySettingStore, SettingStore, SettingStoreService, ENABLE_DYNAMIC_SEO};
pub use sqlite::SqliteStore;
pub use todo::{InMemoryTodoStore, Todo, TodoChanges, TodoStore, TodoStoreService};

use crate::{Error, Result};

/// The stores backing one application instance.
#[derive(Clone)]
pub struct Stores {
    pub todos: TodoStoreService,
    pub settings: SettingStoreService,
    pub seo: SeoStoreService,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            todos: Arc::new(InMemoryTodoStore::new()),
            settings: Arc::new(InMemorySettingStore::new()),
            seo: Arc::new(InMemorySeoStore::new()),
        }
    }

    /// Uses one backend for every kind of record.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: TodoStore + SettingStore + SeoStore + 'static,
    {
        Self {
            todos: store.clone(),
            settings: store.clone(),
            seo: store,
        }
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| Error::configuration(format!("{name} store lock is poisoned")))
}
