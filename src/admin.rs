//! Administrator record edits.
//!
//! An admin edit overwrites whichever fields it provides and locks the
//! record (`admin_defined`), exempting the populated fields from automatic
//! regeneration from then on. The editing UI itself is external; this is
//! the core operation it drives.

use std::collections::BTreeMap;

use crate::models::SefRecord;
use crate::slug::normalize_path;
use crate::store::{MappingStore, StoreError};

/// Field overrides supplied by an administrator. `None` leaves the stored
/// value alone; metatag entries are set key-by-key.
#[derive(Debug, Clone, Default)]
pub struct AdminEdit {
    pub sef_path: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub metatags: BTreeMap<String, String>,
}

/// Apply an admin edit to the record at `path`, creating an
/// identity-mapped record first when nothing is stored yet.
///
/// Returns `Ok(None)` when `path` is not editable (the site root, or a URL
/// under a foreign origin).
pub async fn apply_admin_edit(
    store: &MappingStore,
    base_url: &str,
    path: &str,
    edit: AdminEdit,
) -> Result<Option<SefRecord>, StoreError> {
    let Some(path) = normalize_path(path, base_url) else {
        return Ok(None);
    };
    if path == "/" {
        return Ok(None);
    }

    let mut record = store
        .get(&path)
        .await?
        .unwrap_or_else(|| SefRecord::identity(&path));

    if let Some(sef_path) = edit.sef_path {
        if let Some(sef_path) = normalize_path(&sef_path, base_url) {
            record.sef_path = sef_path;
        }
    }
    if let Some(title) = edit.title {
        record.title = title;
    }
    if let Some(description) = edit.description {
        record.description = description;
    }
    if let Some(keywords) = edit.keywords {
        record.keywords = keywords;
    }
    for (name, value) in edit.metatags {
        record.metatags.insert(name, value);
    }
    record.admin_defined = true;

    store.put(&record).await?;
    Ok(Some(record))
}
