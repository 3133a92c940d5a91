use bytes::Bytes;
use serde::Serialize;

use crate::catalog::{self, Category};
use crate::error::{ValidationError, MAX_ITEMS};
use crate::model::{FileItem, ItemId, JobId, Selection};

/// One file of a conversion job, position-aligned with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub item_id: ItemId,
    pub name: String,
    pub mime_type: String,
    pub category: Category,
    pub selection: Selection,
    pub content: Bytes,
}

impl JobEntry {
    fn from_item(item: &FileItem, selection: Selection) -> Self {
        Self {
            item_id: item.id(),
            name: item.name().to_string(),
            mime_type: item.file().mime_type().to_string(),
            category: item.category(),
            selection,
            content: item.file().content().clone(),
        }
    }

    pub fn target(&self) -> String {
        self.selection.wire_target()
    }

    pub fn format_request(&self) -> FormatRequest {
        FormatRequest {
            name: self.name.clone(),
            target: self.target(),
            category: self.category,
            sub_section: self.selection.subcategory.clone(),
            id: self.item_id.0.to_string(),
        }
    }
}

/// Wire description of one requested conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRequest {
    pub name: String,
    pub target: String,
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "subSection")]
    pub sub_section: String,
    pub id: String,
}

/// Ordered batch handed to the conversion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub id: JobId,
    pub entries: Vec<JobEntry>,
}

impl ConversionJob {
    /// Build a batch job out of every tracked item.
    pub fn batch(id: JobId, items: &[FileItem]) -> Result<Self, ValidationError> {
        validate_batch(items)?;
        let entries = items
            .iter()
            .filter_map(|item| {
                item.selection()
                    .map(|selection| JobEntry::from_item(item, selection.clone()))
            })
            .collect();
        Ok(Self { id, entries })
    }

    /// A job covering exactly one item with a fixed selection.
    pub fn single(id: JobId, item: &FileItem, selection: Selection) -> Self {
        Self {
            id,
            entries: vec![JobEntry::from_item(item, selection)],
        }
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.entries.iter().map(|entry| entry.item_id).collect()
    }

    pub fn format_requests(&self) -> Vec<FormatRequest> {
        self.entries.iter().map(JobEntry::format_request).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Preconditions for a batch submission, checked in user-facing order.
pub fn validate_batch(items: &[FileItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::NoItems);
    }
    let missing: Vec<String> = items
        .iter()
        .filter(|item| item.selection().is_none())
        .map(|item| item.name().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingSelection { names: missing });
    }
    if items.len() > MAX_ITEMS {
        return Err(ValidationError::TooManyItems {
            count: items.len(),
            max: MAX_ITEMS,
        });
    }
    let unsupported: Vec<String> = items
        .iter()
        .filter(|item| !is_pdf_path_allowed(item))
        .map(|item| item.name().to_string())
        .collect();
    if !unsupported.is_empty() {
        return Err(ValidationError::UnsupportedPdfSource { names: unsupported });
    }
    Ok(())
}

fn is_pdf_path_allowed(item: &FileItem) -> bool {
    let wants_pdf = item
        .selection()
        .map(|selection| selection.subcategory == "pdf" && selection.format == "PDF")
        .unwrap_or(false);
    !(item.category() == Category::Image
        && wants_pdf
        && !catalog::accepts_pdf_source(&item.file().extension()))
}
