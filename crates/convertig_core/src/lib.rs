//! Convertig core: format catalog, selection store and the pure conversion state machine.
pub mod catalog;
mod effect;
mod error;
mod ingest;
mod job;
mod model;
mod msg;
mod state;
mod store;
mod update;
mod view_model;

pub use catalog::Category;
pub use effect::Effect;
pub use error::{SourceRejection, ValidationError, MAX_ITEMS};
pub use ingest::{check_capacity, screen, IngestReport};
pub use job::{validate_batch, ConversionJob, FormatRequest, JobEntry};
pub use model::{
    ArtifactFailure, ArtifactState, ContentHandle, ConvertedArtifact, FailureCause, FileItem,
    IngestedFile, ItemId, JobId, Origin, Selection,
};
pub use msg::Msg;
pub use state::{AppState, JobKind};
pub use store::{ArtifactMap, SelectionStore};
pub use update::update;
pub use view_model::{AppViewModel, ArtifactAction, ArtifactRowView, ItemRowView};
