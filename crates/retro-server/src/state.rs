use retro_core::cache::QueryCache;
use retro_core::store::DocStore;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocStore>,
    pub cache: Arc<Mutex<QueryCache>>,
    pub event_tx: broadcast::Sender<()>,
}

impl AppState {
    pub fn new(store: DocStore) -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            store: Arc::new(store),
            cache: Arc::new(Mutex::new(QueryCache::new())),
            event_tx: tx,
        }
    }

    /// Tell connected boards that something changed. Nobody listening is
    /// fine.
    pub fn notify(&self) {
        let _ = self.event_tx.send(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_subscribers_is_fine() {
        let state = AppState::new(DocStore::open_in_memory().unwrap());
        state.notify();
    }

    #[test]
    fn notify_reaches_subscribers() {
        let state = AppState::new(DocStore::open_in_memory().unwrap());
        let mut rx = state.event_tx.subscribe();
        state.notify();
        assert!(rx.try_recv().is_ok());
    }
}
