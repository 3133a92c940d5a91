use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use url::Url;

use convertig_core::{ConversionJob, JobEntry};
use convertig_logging::{cv_debug, cv_warn};

use crate::config::base_str;
use crate::fetch::map_reqwest_error;
use crate::types::error_message_from_body;
use crate::{FailureKind, FetchError, FetchOutput, FetchSettings, Fetcher, ReqwestFetcher};

/// One entry of a conversion response, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvertedFile {
    pub name: String,
    /// Relative to the service base address.
    pub path: String,
}

#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    files: Vec<ConvertedFile>,
}

/// The remote conversion service.
#[async_trait]
pub trait ConversionService: Send + Sync {
    /// Submit every entry of `job` in one request.
    async fn submit(&self, job: &ConversionJob) -> Result<Vec<ConvertedFile>, FetchError>;

    /// Retrieve an artifact by the path the service returned.
    async fn retrieve(&self, path: &str) -> Result<FetchOutput, FetchError>;
}

pub struct HttpConversionService {
    base: Url,
    client: reqwest::Client,
    fetcher: ReqwestFetcher,
}

impl HttpConversionService {
    pub fn new(base: Url, settings: FetchSettings) -> Result<Self, FetchError> {
        // No request timeout here: the orchestrator owns the submission deadline.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        let fetcher = ReqwestFetcher::new(settings)?;
        Ok(Self {
            base,
            client,
            fetcher,
        })
    }

    fn convert_url(&self) -> String {
        format!("{}/api/convert", base_str(&self.base))
    }

    fn artifact_url(&self, path: &str) -> String {
        let base = base_str(&self.base);
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

fn file_part(entry: &JobEntry) -> Part {
    let part = Part::bytes(entry.content.to_vec()).file_name(entry.name.clone());
    match part.mime_str(&entry.mime_type) {
        Ok(part) => part,
        Err(_) => {
            cv_warn!("invalid mime type {:?} for {}", entry.mime_type, entry.name);
            Part::bytes(entry.content.to_vec()).file_name(entry.name.clone())
        }
    }
}

#[async_trait]
impl ConversionService for HttpConversionService {
    async fn submit(&self, job: &ConversionJob) -> Result<Vec<ConvertedFile>, FetchError> {
        let formats = serde_json::to_string(&job.format_requests())
            .map_err(|err| FetchError::new(FailureKind::InvalidResponse, err.to_string()))?;
        let form = job
            .entries
            .iter()
            .fold(Form::new(), |form, entry| form.part("files", file_part(entry)))
            .text("formats", formats);

        cv_debug!("POST {} with {} file(s)", self.convert_url(), job.len());
        let response = self
            .client
            .post(self.convert_url())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = error_message_from_body(&body)
                .unwrap_or_else(|| format!("Conversion failed with status {}", status.as_u16()));
            return Err(FetchError::new(FailureKind::HttpStatus(status.as_u16()), message));
        }

        let parsed: ConvertResponse = serde_json::from_slice(&body).map_err(|err| {
            FetchError::new(
                FailureKind::InvalidResponse,
                format!("Unexpected response from conversion service: {err}"),
            )
        })?;
        Ok(parsed.files)
    }

    async fn retrieve(&self, path: &str) -> Result<FetchOutput, FetchError> {
        self.fetcher.fetch(&self.artifact_url(path), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_join_onto_the_base() {
        let base = Url::parse("http://localhost:9000/").unwrap();
        let service = HttpConversionService::new(base, FetchSettings::default()).unwrap();
        assert_eq!(service.convert_url(), "http://localhost:9000/api/convert");
        assert_eq!(
            service.artifact_url("/downloads/x.gif"),
            "http://localhost:9000/downloads/x.gif"
        );
        assert_eq!(
            service.artifact_url("downloads/x.gif"),
            "http://localhost:9000/downloads/x.gif"
        );
    }

    #[test]
    fn response_without_files_is_empty() {
        let parsed: ConvertResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.files.is_empty());
    }
}
