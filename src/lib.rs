//! stockmatch - duplicate detection for material inventory
//!
//! The core is a pure, deterministic matcher that scores a candidate record
//! against existing records field by field and returns the plausible
//! duplicates, best first. Around it sit the record types, a per-company
//! inventory file used as the record source, and the error type shared by
//! all of them.

pub mod error;
pub mod matcher;
pub mod record;
pub mod store;

pub use error::{MatchError, Result};
pub use matcher::{
    find_matches, find_matches_value, find_matches_with, score_breakdown, similarity,
    MatchPolicy, MatchResult, NameMatch, ScoreBreakdown,
};
pub use record::{records_from_value, CandidateRecord, ExistingRecord};
pub use store::InventoryStore;
