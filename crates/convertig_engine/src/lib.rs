//! Convertig engine: source adapters, conversion service IO and the session driver.
mod config;
mod engine;
mod fetch;
mod filename;
mod orchestrator;
mod persist;
mod save;
mod service;
mod sources;
mod types;
mod vault;

pub use config::{
    EngineConfig, ProviderKeys, DEFAULT_CONVERSION_DEADLINE, DEFAULT_DRIVE_API_URL,
    DEFAULT_SERVICE_URL,
};
pub use engine::Session;
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use filename::{available_name, sanitize_filename};
pub use orchestrator::{run_job, timeout_message, JobContext};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use save::{DirectorySaveTarget, SaveTarget};
pub use service::{ConversionService, ConvertedFile, HttpConversionService};
pub use sources::{
    ingest_cloud_drive, ingest_file_share, ingest_local, DriveDocument, LocalFile, SharedLink,
    FILE_SHARE_EXTENSIONS,
};
pub use types::{error_message_from_body, EngineError, FailureKind, FetchError, FetchOutput};
pub use vault::ArtifactVault;
