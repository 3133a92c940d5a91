use thiserror::Error;

use crate::model::ItemId;

/// Upper bound on tracked items.
pub const MAX_ITEMS: usize = 5;

/// A request the state machine refuses before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No files selected for conversion.")]
    NoItems,
    #[error("Please select a format for all files: {}.", .names.join(", "))]
    MissingSelection { names: Vec<String> },
    #[error("Maximum {max} files allowed.")]
    TooManyItems { count: usize, max: usize },
    #[error(
        "The following files have unsupported formats for PDF conversion: {}. Use JPG, JPEG, or PNG.",
        .names.join(", ")
    )]
    UnsupportedPdfSource { names: Vec<String> },
    #[error("A conversion is already in progress.")]
    BatchInFlight,
    #[error("Unknown file {0}.")]
    UnknownItem(ItemId),
    #[error("{name} is still being processed.")]
    ItemBusy { name: String },
    #[error("{name} has no converted file to download.")]
    NotReady { name: String },
}

/// Why a file never entered the tracked collection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceRejection {
    #[error("Maximum {max} files allowed.")]
    CapacityExceeded {
        tracked: usize,
        incoming: usize,
        max: usize,
    },
    #[error("File {name} has an unsupported format for PDF conversion. Use JPG, JPEG, or PNG.")]
    UnsupportedPdfSource { name: String },
    #[error("File {name} is not a supported file type.")]
    UnsupportedType { name: String },
    #[error("Access token missing. Please sign in again.")]
    MissingToken,
    #[error("Unauthorized access. Please sign in again.")]
    Unauthorized { name: String },
    #[error("Failed to fetch file {name}: {message}")]
    Retrieval { name: String, message: String },
}

impl SourceRejection {
    /// Name of the single file concerned, if the rejection is per-file.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            SourceRejection::UnsupportedPdfSource { name }
            | SourceRejection::UnsupportedType { name }
            | SourceRejection::Unauthorized { name }
            | SourceRejection::Retrieval { name, .. } => Some(name),
            SourceRejection::CapacityExceeded { .. } | SourceRejection::MissingToken => None,
        }
    }

    /// Rejections that refuse the whole adapter call rather than one file.
    pub fn is_batch_level(&self) -> bool {
        self.file_name().is_none()
    }
}
