use crate::catalog::Category;
use crate::model::{ArtifactState, ItemId, Origin};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub items: Vec<ItemRowView>,
    pub diagnostic: Option<String>,
    pub converting: bool,
    pub can_convert: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRowView {
    pub id: ItemId,
    pub name: String,
    pub origin: Origin,
    pub category: Category,
    pub subcategories: Vec<&'static str>,
    pub visible_subcategory: String,
    pub targets: Vec<&'static str>,
    pub selection: Option<String>,
    pub menu_open: bool,
    pub artifact: Option<ArtifactRowView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRowView {
    pub name: String,
    pub state: ArtifactState,
    pub error: Option<String>,
    pub action: Option<ArtifactAction>,
}

/// Affordance offered next to an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactAction {
    Download,
    Retry,
}

impl ArtifactAction {
    pub fn for_state(state: ArtifactState) -> Option<Self> {
        match state {
            ArtifactState::Ready => Some(ArtifactAction::Download),
            ArtifactState::Failed => Some(ArtifactAction::Retry),
            ArtifactState::Converting | ArtifactState::Downloading => None,
        }
    }
}
