use crate::item::ResultItem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory collection of the items scraped during one crawl
///
/// Cloning shares the underlying list, so extraction tasks can append
/// concurrently. Items keep the order in which they were appended.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    items: Arc<Mutex<Vec<ResultItem>>>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished item
    pub fn push(&self, item: ResultItem) {
        self.lock().push(item);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copies the current contents
    pub fn snapshot(&self) -> Vec<ResultItem> {
        self.lock().clone()
    }

    /// Moves the contents out, leaving the aggregate empty
    pub fn take(&self) -> Vec<ResultItem> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ResultItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
