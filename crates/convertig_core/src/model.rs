use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use crate::catalog::{self, Category};

/// Stable identity of a tracked file, assigned by the store at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

pub type JobId = u64;

/// Which source adapter produced a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Local,
    CloudDrive,
    FileShare,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Local => "local",
            Origin::CloudDrive => "cloud-drive",
            Origin::FileShare => "file-share",
        }
    }
}

/// A file as delivered by a source adapter. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestedFile {
    name: String,
    mime_type: String,
    content: Bytes,
    origin: Origin,
    remote_url: Option<String>,
}

impl IngestedFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content: impl Into<Bytes>,
        origin: Origin,
        remote_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content: content.into(),
            origin,
            remote_url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    pub fn extension(&self) -> String {
        catalog::extension_of(&self.name)
    }
}

/// A completed `subcategory:FORMAT` choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    pub subcategory: String,
    pub format: String,
}

impl Selection {
    pub fn new(subcategory: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            subcategory: subcategory.into(),
            format: format.into(),
        }
    }

    /// Composed token as shown to and typed by users, e.g. `pdf:PDF`.
    pub fn token(&self) -> String {
        format!("{}:{}", self.subcategory, self.format)
    }

    /// Splits a token on its first `:`; both halves must be non-empty.
    pub fn parse(token: &str) -> Option<Self> {
        let (subcategory, format) = token.split_once(':')?;
        let (subcategory, format) = (subcategory.trim(), format.trim());
        if subcategory.is_empty() || format.is_empty() {
            return None;
        }
        Some(Self::new(subcategory, format))
    }

    /// Target label as sent to the conversion service.
    pub fn wire_target(&self) -> String {
        self.format.to_ascii_lowercase()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subcategory, self.format)
    }
}

/// One tracked file and its current picker state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    id: ItemId,
    file: IngestedFile,
    category: Category,
    pub(crate) subcategory: Option<String>,
    pub(crate) selection: Option<Selection>,
    pub(crate) menu_open: bool,
}

impl FileItem {
    pub(crate) fn new(id: ItemId, file: IngestedFile) -> Self {
        let category = catalog::category_of(&file.extension());
        Self {
            id,
            file,
            category,
            subcategory: None,
            selection: None,
            menu_open: false,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn file(&self) -> &IngestedFile {
        &self.file
    }

    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    /// Subcategory the picker is showing: the chosen one or the category default.
    pub fn visible_subcategory(&self) -> &str {
        self.subcategory
            .as_deref()
            .unwrap_or_else(|| catalog::default_subcategory(self.category))
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }
}

/// Lifecycle of a converted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Converting,
    Ready,
    Downloading,
    Failed,
}

impl ArtifactState {
    /// Transient states always resolve without user input.
    pub fn is_transient(self) -> bool {
        matches!(self, ArtifactState::Converting | ArtifactState::Downloading)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCause {
    /// Batch submission exceeded its deadline.
    Timeout,
    /// The service answered with a non-success status.
    Rejected,
    /// The submission never got an answer.
    Network,
    /// Conversion succeeded but retrieving the artifact failed.
    Fetch,
    /// The response had no entry at this item's position.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFailure {
    pub cause: FailureCause,
    pub message: String,
}

impl ArtifactFailure {
    pub fn new(cause: FailureCause, message: impl Into<String>) -> Self {
        Self {
            cause,
            message: message.into(),
        }
    }
}

/// Locally held bytes of a converted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHandle {
    pub path: PathBuf,
    pub byte_len: u64,
    pub content_type: Option<String>,
}

/// Converted output of one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArtifact {
    pub name: String,
    pub state: ArtifactState,
    pub handle: Option<ContentHandle>,
    pub failure: Option<ArtifactFailure>,
    /// Selection the producing job was built from; retry reuses it.
    pub submitted: Selection,
    pub job_id: JobId,
}

impl ConvertedArtifact {
    pub(crate) fn converting(name: impl Into<String>, submitted: Selection, job_id: JobId) -> Self {
        Self {
            name: name.into(),
            state: ArtifactState::Converting,
            handle: None,
            failure: None,
            submitted,
            job_id,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == ArtifactState::Ready
    }

    pub fn is_failed(&self) -> bool {
        self.state == ArtifactState::Failed
    }
}
