use std::path::PathBuf;

use crate::ingest::IngestReport;
use crate::model::{ArtifactFailure, ContentHandle, ItemId, JobId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A source adapter finished retrieving and screening its files.
    FilesIngested(IngestReport),
    /// User removed a file from the list.
    ItemRemoved(ItemId),
    /// User opened or closed the format picker of a file.
    MenuToggled(ItemId),
    /// User chose a subcategory in the picker.
    SubcategorySelected { id: ItemId, subcategory: String },
    /// User chose a target format in the picker.
    FormatSelected {
        id: ItemId,
        subcategory: String,
        format: String,
    },
    /// User clicked Convert.
    ConvertClicked,
    /// User clicked Retry on one artifact.
    RetryClicked(ItemId),
    /// User clicked Download on one artifact.
    DownloadClicked(ItemId),
    /// The submission of a job failed as a whole.
    JobFailed {
        job_id: JobId,
        failure: ArtifactFailure,
    },
    /// One positional result of a job was retrieved, or failed to be.
    ArtifactFetched {
        job_id: JobId,
        id: ItemId,
        name: String,
        result: Result<ContentHandle, ArtifactFailure>,
    },
    /// Every fetch of a successfully submitted job has resolved.
    JobSettled { job_id: JobId },
    /// The save target finished with an artifact.
    DownloadFinished {
        id: ItemId,
        result: Result<PathBuf, String>,
    },
    /// User closed the diagnostic banner.
    DiagnosticDismissed,
    /// Fallback for placeholder wiring.
    NoOp,
}
