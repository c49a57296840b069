use crate::errors::AppError;
use crate::storage::FileStore;
use crate::store::EntryStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<EntryStore<FileStore>>>,
    pub seed_enabled: bool,
}

impl AppState {
    pub fn new(store: EntryStore<FileStore>, seed_enabled: bool) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            seed_enabled,
        }
    }

    /// Runs `f` against the store on the blocking pool. Mutations rewrite the
    /// backing file synchronously, so they must not run on a runtime worker.
    pub async fn with_store<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut EntryStore<FileStore>) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&mut store.blocking_lock()))
            .await
            .map_err(AppError::internal)
    }
}
