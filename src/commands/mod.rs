//! Command implementations

pub mod check;
pub mod completions;
pub mod config;
pub mod record;

use anyhow::Result;
use stockmatch::InventoryStore;

use crate::config::RuntimeContext;

/// Open the inventory of the configured company
pub fn open_store(ctx: &RuntimeContext) -> Result<InventoryStore> {
    let dir = ctx.data_dir()?;
    let company = ctx.company()?;
    log::debug!("Opening inventory for {company} in {}", dir.display());
    InventoryStore::open(&dir, company)
}
