//! Source adapters: local files, cloud-drive documents and file-share links.
//!
//! Each adapter checks capacity before touching the network, retrieves what it
//! was handed and screens every file through [`IngestReport::admit`].
use std::io;
use std::path::Path;

use bytes::Bytes;
use futures_util::future::join_all;

use convertig_core::{
    catalog, check_capacity, IngestReport, IngestedFile, Origin, SourceRejection,
};
use convertig_logging::{cv_info, cv_warn};

use crate::{FailureKind, Fetcher};

/// Extensions the file-share picker lets users choose.
pub const FILE_SHARE_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "aac", "flac", "ogg", "opus", "wma", "aiff", "m4v", "mmf", "3g2", "mp4", "avi",
    "mov", "webm", "mkv", "flv", "wmv", "3gp", "mpg", "ogv", "png", "jpg", "jpeg", "svg", "bmp",
    "gif", "ico", "tga", "wbmp", "pdf", "doc", "docx", "txt", "rtf", "odt", "html", "ppt", "pptx",
    "xlsx", "zip", "7z", "epub", "mobi", "azw3", "fb2", "lit", "lrf", "pdb", "tcr",
];

/// A file the user picked from local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub content: Bytes,
}

impl LocalFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            content: content.into(),
        }
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let content = std::fs::read(path)?;
        Ok(Self::new(name, content))
    }
}

/// A document chosen in the cloud-drive picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveDocument {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

/// A `(name, direct-link)` pair from the file-share picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLink {
    pub name: String,
    pub link: String,
}

fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name).first_or_octet_stream().to_string()
}

pub fn ingest_local(tracked: usize, files: Vec<LocalFile>) -> IngestReport {
    if let Err(rejection) = check_capacity(tracked, files.len()) {
        return IngestReport::refused(Origin::Local, files.len(), rejection);
    }
    let mut report = IngestReport::new(Origin::Local, files.len());
    for file in files {
        let mime = file.mime_type.unwrap_or_else(|| guess_mime(&file.name));
        report.admit(IngestedFile::new(file.name, mime, file.content, Origin::Local, None));
    }
    cv_info!(
        "local: {} accepted, {} rejected",
        report.accepted.len(),
        report.rejected.len()
    );
    report
}

pub async fn ingest_cloud_drive(
    fetcher: &dyn Fetcher,
    drive_api: &str,
    token: Option<&str>,
    tracked: usize,
    documents: &[DriveDocument],
) -> IngestReport {
    let requested = documents.len();
    if let Err(rejection) = check_capacity(tracked, requested) {
        return IngestReport::refused(Origin::CloudDrive, requested, rejection);
    }
    let Some(token) = token.filter(|token| !token.is_empty()) else {
        return IngestReport::refused(Origin::CloudDrive, requested, SourceRejection::MissingToken);
    };

    let base = drive_api.trim_end_matches('/');
    let retrievals = documents.iter().map(|doc| async move {
        let url = format!("{base}/drive/v3/files/{}?alt=media", doc.id);
        (doc, fetcher.fetch(&url, Some(token)).await)
    });

    let mut report = IngestReport::new(Origin::CloudDrive, requested);
    for (doc, result) in join_all(retrievals).await {
        match result {
            Ok(output) => {
                let mime = output.content_type.unwrap_or_else(|| guess_mime(&doc.name));
                report.admit(IngestedFile::new(
                    doc.name.clone(),
                    mime,
                    output.bytes,
                    Origin::CloudDrive,
                    doc.url.clone(),
                ));
            }
            Err(err) if err.kind == FailureKind::Unauthorized => {
                cv_warn!("cloud-drive refused {}: {}", doc.name, err.message);
                report.reject(SourceRejection::Unauthorized {
                    name: doc.name.clone(),
                });
            }
            Err(err) => {
                cv_warn!("cloud-drive retrieval of {} failed: {}", doc.name, err);
                report.reject(SourceRejection::Retrieval {
                    name: doc.name.clone(),
                    message: err.message,
                });
            }
        }
    }
    report
}

pub async fn ingest_file_share(
    fetcher: &dyn Fetcher,
    tracked: usize,
    links: &[SharedLink],
) -> IngestReport {
    let requested = links.len();
    if let Err(rejection) = check_capacity(tracked, requested) {
        return IngestReport::refused(Origin::FileShare, requested, rejection);
    }

    let mut report = IngestReport::new(Origin::FileShare, requested);
    let mut wanted = Vec::with_capacity(links.len());
    for link in links {
        let ext = catalog::extension_of(&link.name);
        if FILE_SHARE_EXTENSIONS.contains(&ext.as_str()) {
            wanted.push(link);
        } else {
            report.reject(SourceRejection::UnsupportedType {
                name: link.name.clone(),
            });
        }
    }

    let retrievals = wanted
        .into_iter()
        .map(|link| async move { (link, fetcher.fetch(&link.link, None).await) });
    for (link, result) in join_all(retrievals).await {
        match result {
            Ok(output) => {
                let mime = output.content_type.unwrap_or_else(|| guess_mime(&link.name));
                report.admit(IngestedFile::new(
                    link.name.clone(),
                    mime,
                    output.bytes,
                    Origin::FileShare,
                    Some(link.link.clone()),
                ));
            }
            Err(err) => {
                cv_warn!("file-share retrieval of {} failed: {}", link.name, err);
                report.reject(SourceRejection::Retrieval {
                    name: link.name.clone(),
                    message: err.message,
                });
            }
        }
    }
    report
}
