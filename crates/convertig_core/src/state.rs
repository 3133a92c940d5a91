use std::collections::BTreeMap;

use crate::catalog;
use crate::model::{ItemId, JobId};
use crate::store::SelectionStore;
use crate::view_model::{AppViewModel, ArtifactAction, ArtifactRowView, ItemRowView};

/// What a submitted job was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Batch,
    Retry(ItemId),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    store: SelectionStore,
    diagnostic: Option<String>,
    jobs: BTreeMap<JobId, JobKind>,
    next_job_id: JobId,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut SelectionStore {
        &mut self.store
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub(crate) fn set_diagnostic(&mut self, message: Option<String>) {
        if self.diagnostic != message {
            self.diagnostic = message;
            self.dirty = true;
        }
    }

    /// Whether a batch submission is outstanding. Retries do not count.
    pub fn is_converting(&self) -> bool {
        self.jobs.values().any(|kind| *kind == JobKind::Batch)
    }

    pub fn job_kind(&self, job_id: JobId) -> Option<JobKind> {
        self.jobs.get(&job_id).copied()
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Id the next [`AppState::start_job`] call will hand out.
    pub(crate) fn upcoming_job_id(&self) -> JobId {
        self.next_job_id + 1
    }

    pub(crate) fn start_job(&mut self, kind: JobKind) -> JobId {
        self.next_job_id += 1;
        self.jobs.insert(self.next_job_id, kind);
        self.dirty = true;
        self.next_job_id
    }

    pub(crate) fn finish_job(&mut self, job_id: JobId) -> Option<JobKind> {
        let kind = self.jobs.remove(&job_id);
        if kind.is_some() {
            self.dirty = true;
        }
        kind
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether the state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let items = self
            .store
            .list()
            .iter()
            .map(|item| {
                let visible = item.visible_subcategory().to_string();
                let artifact = self.store.artifact(item.id()).map(|artifact| ArtifactRowView {
                    name: artifact.name.clone(),
                    state: artifact.state,
                    error: artifact.failure.as_ref().map(|f| f.message.clone()),
                    action: ArtifactAction::for_state(artifact.state),
                });
                ItemRowView {
                    id: item.id(),
                    name: item.name().to_string(),
                    origin: item.file().origin(),
                    category: item.category(),
                    subcategories: catalog::subcategories_of(item.category()),
                    targets: catalog::targets_of(item.category(), &visible).to_vec(),
                    visible_subcategory: visible,
                    selection: item.selection().map(|s| s.token()),
                    menu_open: item.is_menu_open(),
                    artifact,
                }
            })
            .collect();
        AppViewModel {
            items,
            diagnostic: self.diagnostic.clone(),
            converting: self.is_converting(),
            can_convert: !self.is_converting() && !self.store.is_empty(),
            dirty: self.dirty,
        }
    }
}
