#![allow(dead_code)]

use std::sync::Once;
use std::time::Duration;

use convertig_core::ItemId;
use convertig_engine::{EngineConfig, LocalFile, Session};
use tempfile::TempDir;
use url::Url;
use wiremock::MockServer;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(convertig_logging::initialize_for_tests);
}

pub struct Harness {
    pub session: Session,
    pub save_dir: TempDir,
}

pub fn session_for(server: &MockServer) -> Harness {
    session_with_deadline(server, Duration::from_secs(5))
}

pub fn session_with_deadline(server: &MockServer, deadline: Duration) -> Harness {
    init_logging();
    let base = Url::parse(&server.uri()).unwrap();
    let save_dir = TempDir::new().unwrap();
    let config = EngineConfig::new(base.clone(), base, save_dir.path().to_path_buf())
        .with_deadline(deadline);
    Harness {
        session: Session::new(config).unwrap(),
        save_dir,
    }
}

pub fn local(name: &str, content: &[u8]) -> LocalFile {
    LocalFile::new(name, content.to_vec())
}

pub fn item_ids(session: &Session) -> Vec<ItemId> {
    session.state().store().list().iter().map(|item| item.id()).collect()
}

pub fn converted(files: &[(&str, &str)]) -> serde_json::Value {
    let files: Vec<serde_json::Value> = files
        .iter()
        .map(|(name, path)| serde_json::json!({ "name": name, "path": path }))
        .collect();
    serde_json::json!({ "files": files })
}
