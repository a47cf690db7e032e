//! Per-company inventory file
//!
//! Acts as the record source for duplicate checks and as the target of the
//! merge-or-create decision that follows one. Each company gets its own
//! JSON file, so a store only ever sees a single tenant's records.
//!
//! Files live at XDG_DATA_HOME/stockmatch/<company>.json unless a data
//! directory is configured.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::MatchError;
use crate::record::{CandidateRecord, ExistingRecord};

const APP_NAME: &str = "stockmatch";

/// On-disk layout of an inventory file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryFile {
    pub company: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub records: Vec<ExistingRecord>,
}

impl InventoryFile {
    fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            updated_at: Utc::now(),
            records: Vec::new(),
        }
    }
}

/// A company's inventory loaded into memory
#[derive(Debug)]
pub struct InventoryStore {
    path: PathBuf,
    file: InventoryFile,
}

impl InventoryStore {
    /// Load the inventory for `company` from `dir`, or start an empty one
    pub fn open(dir: &Path, company: &str) -> Result<Self> {
        let slug = company_slug(company)?;
        let path = dir.join(format!("{slug}.json"));

        let file = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading inventory {}", path.display()))?;
            serde_json::from_str::<InventoryFile>(&content)
                .with_context(|| format!("parsing inventory {}", path.display()))?
        } else {
            log::debug!("No inventory at {}, starting empty", path.display());
            InventoryFile::new(&slug)
        };

        log::debug!(
            "Loaded {} records for company {}",
            file.records.len(),
            file.company
        );

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn company(&self) -> &str {
        &self.file.company
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.file.updated_at
    }

    pub fn records(&self) -> &[ExistingRecord] {
        &self.file.records
    }

    pub fn get(&self, id: &str) -> Option<&ExistingRecord> {
        self.file.records.iter().find(|r| r.id == id)
    }

    /// Store `candidate` as a new record and return its id
    pub fn insert(&mut self, candidate: &CandidateRecord, attrs: Map<String, Value>) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        let mut record = ExistingRecord::from_candidate(id.clone(), candidate);
        record.extra = attrs;
        record
            .extra
            .insert("created_at".to_string(), json!(now.to_rfc3339()));
        record
            .extra
            .insert("updated_at".to_string(), json!(now.to_rfc3339()));

        self.file.records.push(record);
        self.file.updated_at = now;
        log::info!("Inserted record {id}");
        id
    }

    /// Add `quantity` to an existing record's quantity on hand
    pub fn merge(&mut self, id: &str, quantity: f64) -> Result<&ExistingRecord> {
        if !quantity.is_finite() || quantity < 0.0 {
            return Err(MatchError::InvalidArgument(format!(
                "merge quantity must be a non-negative number, got {quantity}"
            ))
            .into());
        }

        let now = Utc::now();
        let record = self
            .file
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| MatchError::NotFound(id.to_string()))?;

        let total = record.quantity() + quantity;
        record
            .extra
            .insert("quantity".to_string(), quantity_value(total));
        record
            .extra
            .insert("updated_at".to_string(), json!(now.to_rfc3339()));
        self.file.updated_at = now;

        log::info!("Merged {quantity} into record {id}, now {total}");
        Ok(record)
    }

    pub fn remove(&mut self, id: &str) -> Result<ExistingRecord> {
        let index = self
            .file
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MatchError::NotFound(id.to_string()))?;

        self.file.updated_at = Utc::now();
        Ok(self.file.records.remove(index))
    }

    /// Write the inventory back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating data directory {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(&self.file)?;
        fs::write(&self.path, content)
            .with_context(|| format!("writing inventory to {}", self.path.display()))
    }
}

/// Lowercase ASCII alphanumerics with runs of anything else collapsed to `-`
pub fn company_slug(company: &str) -> Result<String> {
    let mut slug = String::with_capacity(company.len());
    for ch in company.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();

    if slug.is_empty() {
        return Err(MatchError::InvalidArgument(format!(
            "company name {company:?} has no usable characters"
        ))
        .into());
    }
    Ok(slug)
}

/// Default directory holding inventory files
pub fn data_dir() -> Result<PathBuf> {
    // Check XDG_DATA_HOME first
    if let Some(dir) = env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir).join(APP_NAME));
    }

    // Use platform-specific data directory
    if let Some(mut dir) = dirs::data_dir() {
        dir.push(APP_NAME);
        return Ok(dir);
    }

    // Fallback to ~/.local/share
    dirs::home_dir()
        .map(|home| home.join(".local").join("share").join(APP_NAME))
        .ok_or_else(|| anyhow!("unable to determine data directory"))
}

/// Whole quantities stay integers in the file
fn quantity_value(quantity: f64) -> Value {
    if quantity.fract() == 0.0 && quantity.abs() < i64::MAX as f64 {
        json!(quantity as i64)
    } else {
        json!(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn attrs(quantity: f64, unit: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("quantity".to_string(), json!(quantity));
        map.insert("unit".to_string(), json!(unit));
        map
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = InventoryStore::open(dir.path(), "Acme Timber").unwrap();

        assert!(store.records().is_empty());
        assert_eq!(store.company(), "acme-timber");
        assert_eq!(store.path(), dir.path().join("acme-timber.json"));
    }

    #[test]
    fn test_insert_save_reopen() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();
        let candidate = CandidateRecord::new("Reclaimed Oak", "wood").with_origin("UK");

        let id = store.insert(&candidate, attrs(5.0, "m3"));
        store.save().unwrap();

        let reopened = InventoryStore::open(dir.path(), "acme").unwrap();
        let record = reopened.get(&id).unwrap();
        assert_eq!(record.name, "Reclaimed Oak");
        assert_eq!(record.origin_tag.as_deref(), Some("UK"));
        assert_eq!(record.quantity(), 5.0);
        assert_eq!(record.unit(), Some("m3"));
        assert!(record.extra.contains_key("created_at"));
    }

    #[test]
    fn test_merge_adds_quantity() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();
        let id = store.insert(&CandidateRecord::new("Cork", "cork"), attrs(2.0, "kg"));

        let merged = store.merge(&id, 3.5).unwrap();
        assert_eq!(merged.quantity(), 5.5);

        let merged = store.merge(&id, 0.5).unwrap();
        assert_eq!(merged.extra["quantity"], json!(6));
    }

    #[test]
    fn test_merge_without_quantity_starts_at_zero() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();
        let id = store.insert(&CandidateRecord::new("Jute", "textile"), Map::new());

        assert_eq!(store.merge(&id, 4.0).unwrap().quantity(), 4.0);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();

        let err = store.merge("missing", 1.0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchError>(),
            Some(MatchError::NotFound(_))
        ));

        let err = store.remove("missing").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MatchError>(),
            Some(MatchError::NotFound(_))
        ));
    }

    #[test]
    fn test_merge_rejects_negative_quantity() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();
        let id = store.insert(&CandidateRecord::new("Flax", "textile"), Map::new());

        assert!(store.merge(&id, -1.0).is_err());
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let mut store = InventoryStore::open(dir.path(), "acme").unwrap();
        let id = store.insert(&CandidateRecord::new("Hemp", "textile"), Map::new());

        let removed = store.remove(&id).unwrap();
        assert_eq!(removed.name, "Hemp");
        assert!(store.get(&id).is_none());
    }

    #[test]
    fn test_company_slug() {
        assert_eq!(company_slug("Acme Timber Ltd.").unwrap(), "acme-timber-ltd");
        assert_eq!(company_slug("  north//yard ").unwrap(), "north-yard");
        assert!(company_slug("../").is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("acme.json"), "not json").unwrap();

        let err = InventoryStore::open(dir.path(), "acme").unwrap_err();
        assert!(format!("{err:#}").contains("parsing inventory"));
    }
}
