use crate::error::ValidationError;
use crate::job::ConversionJob;
use crate::model::{ContentHandle, ItemId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Submit a job under the conversion deadline and fetch its results.
    SubmitJob(ConversionJob),
    /// Hand a ready artifact to the save target.
    SaveArtifact {
        id: ItemId,
        handle: ContentHandle,
        suggested_name: String,
    },
    /// Locally held bytes are no longer referenced by any record.
    ReleaseContent(ContentHandle),
    /// A user action was refused before any IO.
    Rejected(ValidationError),
}
