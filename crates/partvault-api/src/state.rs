//! Application state.
//!
//! One state struct aggregating the pool, the asset store, and the services
//! built over them. Handlers extract it as `State<Arc<AppState>>`.

use partvault_core::Config;
use partvault_db::{FileRepository, ReferenceRepository};
use partvault_services::{
    ArchiveExpander, FileCoordinator, LinkManager, OrphanDetector, UploadService,
};
use partvault_storage::AssetStore;
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    pub store: Arc<dyn AssetStore>,
    pub files: FileRepository,
    pub refs: ReferenceRepository,
    pub uploads: UploadService,
    pub expander: ArchiveExpander,
    pub coordinator: FileCoordinator,
    pub links: LinkManager,
    pub orphans: OrphanDetector,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, store: Arc<dyn AssetStore>) -> Self {
        let files = FileRepository::new(pool.clone());
        let refs = ReferenceRepository::new(pool.clone());

        let uploads = UploadService::new(store.clone(), files.clone(), refs.clone());
        let expander = ArchiveExpander::new(store.clone(), files.clone(), refs.clone());
        let coordinator = FileCoordinator::new(store.clone(), files.clone(), refs.clone());
        let links = LinkManager::new(store.clone(), files.clone(), refs.clone());
        let orphans = OrphanDetector::new(store.clone(), refs.clone());

        AppState {
            config,
            pool,
            store,
            files,
            refs,
            uploads,
            expander,
            coordinator,
            links,
            orphans,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
