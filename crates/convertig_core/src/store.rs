//! Ordered collection of tracked items plus their converted artifacts.
//!
//! Both collections sit behind `Arc` and are mutated through
//! [`Arc::make_mut`], so a snapshot taken by a reader is never observed
//! half-updated and artifact records that a mutation does not touch keep
//! their identity.
use std::collections::BTreeMap;
use std::sync::Arc;

use convertig_logging::cv_warn;

use crate::catalog;
use crate::model::{ConvertedArtifact, FileItem, IngestedFile, ItemId, Selection};

pub type ArtifactMap = BTreeMap<ItemId, Arc<ConvertedArtifact>>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionStore {
    items: Arc<Vec<FileItem>>,
    artifacts: Arc<ArtifactMap>,
    next_id: u64,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `files` in order, returning their freshly assigned ids.
    pub fn add(&mut self, files: Vec<IngestedFile>) -> Vec<ItemId> {
        let items = Arc::make_mut(&mut self.items);
        let mut ids = Vec::with_capacity(files.len());
        for file in files {
            self.next_id += 1;
            let id = ItemId(self.next_id);
            items.push(FileItem::new(id, file));
            ids.push(id);
        }
        ids
    }

    /// Drop an item together with its artifact.
    pub fn remove(&mut self, id: ItemId) -> Option<(FileItem, Option<Arc<ConvertedArtifact>>)> {
        let index = self.index_of(id)?;
        let item = Arc::make_mut(&mut self.items).remove(index);
        let artifact = if self.artifacts.contains_key(&id) {
            Arc::make_mut(&mut self.artifacts).remove(&id)
        } else {
            None
        };
        Some((item, artifact))
    }

    /// Choose a subcategory; any previous format choice is cleared.
    pub fn set_subcategory(&mut self, id: ItemId, subcategory: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            cv_warn!("set_subcategory for unknown {}", id);
            return false;
        };
        let category = self.items[index].category();
        if !catalog::subcategories_of(category).contains(&subcategory) {
            cv_warn!("subcategory {:?} is not offered for {}", subcategory, category);
            return false;
        }
        let item = &mut Arc::make_mut(&mut self.items)[index];
        item.subcategory = Some(subcategory.to_string());
        item.selection = None;
        true
    }

    /// Complete the selection with a format from the catalog and close the picker.
    pub fn set_format(&mut self, id: ItemId, subcategory: &str, format: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            cv_warn!("set_format for unknown {}", id);
            return false;
        };
        let category = self.items[index].category();
        let Some(label) = catalog::targets_of(category, subcategory)
            .iter()
            .find(|target| target.eq_ignore_ascii_case(format))
        else {
            cv_warn!(
                "format {:?} is not a target of {}/{}",
                format,
                category,
                subcategory
            );
            return false;
        };
        let item = &mut Arc::make_mut(&mut self.items)[index];
        item.subcategory = Some(subcategory.to_string());
        item.selection = Some(Selection::new(subcategory, *label));
        item.menu_open = false;
        true
    }

    /// Flip one item's picker; opening it closes every other picker.
    pub fn toggle_menu(&mut self, id: ItemId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        for item in Arc::make_mut(&mut self.items).iter_mut() {
            item.menu_open = item.id() == id && !item.menu_open;
        }
        true
    }

    pub fn list(&self) -> &[FileItem] {
        &self.items
    }

    /// Cheap snapshot of the item collection.
    pub fn items(&self) -> Arc<Vec<FileItem>> {
        Arc::clone(&self.items)
    }

    pub fn get(&self, id: ItemId) -> Option<&FileItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn artifact(&self, id: ItemId) -> Option<&Arc<ConvertedArtifact>> {
        self.artifacts.get(&id)
    }

    /// Cheap snapshot of the artifact map.
    pub fn artifacts(&self) -> Arc<ArtifactMap> {
        Arc::clone(&self.artifacts)
    }

    /// Insert or replace one record, returning the replaced one.
    pub fn put_artifact(
        &mut self,
        id: ItemId,
        artifact: ConvertedArtifact,
    ) -> Option<Arc<ConvertedArtifact>> {
        Arc::make_mut(&mut self.artifacts).insert(id, Arc::new(artifact))
    }

    /// Rewrite one record as a fresh value; siblings are left untouched.
    pub fn update_artifact(
        &mut self,
        id: ItemId,
        change: impl FnOnce(&mut ConvertedArtifact),
    ) -> bool {
        let Some(current) = self.artifacts.get(&id) else {
            return false;
        };
        let mut next = ConvertedArtifact::clone(current);
        change(&mut next);
        Arc::make_mut(&mut self.artifacts).insert(id, Arc::new(next));
        true
    }

    /// Swap in a whole new artifact map, returning the previous records.
    pub fn replace_artifacts(&mut self, artifacts: ArtifactMap) -> Vec<Arc<ConvertedArtifact>> {
        let previous = std::mem::replace(&mut self.artifacts, Arc::new(artifacts));
        previous.values().cloned().collect()
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}
