use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::FetchSettings;

pub const DEFAULT_SERVICE_URL: &str = "https://convertorbackend.onrender.com";
pub const DEFAULT_DRIVE_API_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_CONVERSION_DEADLINE: Duration = Duration::from_millis(120_000);

/// Keys the provider pickers are initialised with. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderKeys {
    pub google_client_id: Option<String>,
    pub google_api_key: Option<String>,
    pub dropbox_app_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Base address of the conversion service; artifact paths are relative to it.
    pub service_url: Url,
    pub drive_api_url: Url,
    pub providers: ProviderKeys,
    /// Single deadline for one conversion submission.
    pub conversion_deadline: Duration,
    pub fetch: FetchSettings,
    /// Spool directory for converted bytes. A private temp dir when `None`.
    pub vault_dir: Option<PathBuf>,
    pub save_dir: PathBuf,
}

impl EngineConfig {
    pub fn new(service_url: Url, drive_api_url: Url, save_dir: PathBuf) -> Self {
        Self {
            service_url,
            drive_api_url,
            providers: ProviderKeys::default(),
            conversion_deadline: DEFAULT_CONVERSION_DEADLINE,
            fetch: FetchSettings::default(),
            vault_dir: None,
            save_dir,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.conversion_deadline = deadline;
        self
    }
}

/// `base` without its trailing slash, for string joins against server paths.
pub(crate) fn base_str(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}
