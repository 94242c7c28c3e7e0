//! Shared test harness: boots the real application against a temporary
//! asset store directory and an in-memory database.

use axum_test::TestServer;
use partvault_api::setup;
use partvault_api::state::AppState;
use partvault_core::Config;
use std::sync::Arc;
use tempfile::TempDir;

/// Returns the versioned API path.
/// Usage: `api_path("/files/footprint")` -> `/api/v0/files/footprint`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", partvault_api::constants::API_PREFIX, path)
}

/// Test application state
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup a test application with isolated storage and database
pub async fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let config = Config {
        server_port: 0,
        cors_origins: Vec::new(),
        database_url: "sqlite::memory:".to_string(),
        // A single connection keeps the in-memory database alive and shared.
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_path: temp_dir.path().join("cad").to_string_lossy().into_owned(),
        max_upload_size_bytes: 16 * 1024 * 1024,
        environment: "test".to_string(),
    };

    let (state, router) = setup::initialize_app(config)
        .await
        .expect("Failed to initialize test application");

    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}

/// Build an in-memory ZIP archive from (name, bytes) members.
pub fn build_zip(members: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;

    let mut buffer = Vec::new();
    {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        for (name, data) in members {
            writer
                .start_file(*name, zip::write::FileOptions::default())
                .expect("Failed to start zip member");
            writer.write_all(data).expect("Failed to write zip member");
        }
        writer.finish().expect("Failed to finish zip");
    }
    buffer
}
