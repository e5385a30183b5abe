//! Calendar store access.

use std::collections::BTreeMap;

use crate::error::{FreeBusyError, Result};
use crate::item::CalendarItem;
use crate::restriction::{PropertyRow, Restriction};

/// A store that answers restricted queries over calendar folders.
pub trait CalendarStore {
    /// Return every row of `folder` matching `restriction`.
    ///
    /// # Errors
    /// `FreeBusyError::Store` when the folder cannot be queried.
    fn query(&self, folder: &str, restriction: &Restriction) -> Result<Vec<PropertyRow>>;
}

/// In-memory store keyed by folder name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    folders: BTreeMap<String, Vec<PropertyRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty folder; a no-op if it already exists.
    pub fn create_folder(&mut self, folder: &str) {
        self.folders.entry(folder.to_string()).or_default();
    }

    pub fn insert_row(&mut self, folder: &str, row: PropertyRow) {
        self.folders.entry(folder.to_string()).or_default().push(row);
    }

    pub fn insert_item(&mut self, folder: &str, item: &CalendarItem) {
        self.insert_row(folder, item.to_row());
    }

    pub fn row_count(&self, folder: &str) -> usize {
        self.folders.get(folder).map_or(0, Vec::len)
    }
}

impl CalendarStore for MemoryStore {
    fn query(&self, folder: &str, restriction: &Restriction) -> Result<Vec<PropertyRow>> {
        let rows = self
            .folders
            .get(folder)
            .ok_or_else(|| FreeBusyError::Store(format!("folder not found: {}", folder)))?;

        Ok(rows
            .iter()
            .filter(|row| restriction.matches(row))
            .cloned()
            .collect())
    }
}
