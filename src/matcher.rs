//! Duplicate detection for material records
//!
//! Scores a candidate against each existing record by summing fixed
//! per-field weights:
//! - Name: exact (case-insensitive) or substring in either direction
//! - Category: exact
//! - Subcategory: exact (case-insensitive), only when both sides have one
//! - Origin tag: exact (case-insensitive), only when both sides have one
//!
//! Records scoring at or above the threshold are returned best first. The
//! matcher is deterministic and side-effect free; callers own any caching.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MatchError, Result};
use crate::record::{records_from_value, CandidateRecord, ExistingRecord};

/// Highest score a record can reach
pub const MAX_SCORE: u8 = 100;

/// Default minimum score for a record to be suggested as a duplicate
pub const DEFAULT_THRESHOLD: u8 = 60;

/// Weights and threshold used for scoring
///
/// The default values are the business rules for inventory deduplication.
/// Overriding them changes which records are suggested for merging.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPolicy {
    pub name_exact: f64,
    pub name_substring: f64,
    pub category: f64,
    pub subcategory: f64,
    pub origin: f64,
    pub threshold: u8,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            name_exact: 40.0,
            name_substring: 20.0,
            category: 30.0,
            subcategory: 20.0,
            origin: 10.0,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    /// Reject weights that are negative or could push a score past 100
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("name_exact", self.name_exact),
            ("name_substring", self.name_substring),
            ("category", self.category),
            ("subcategory", self.subcategory),
            ("origin", self.origin),
        ];

        for (field, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchError::InvalidPolicy(format!(
                    "weight {field} must be a non-negative number, got {weight}"
                )));
            }
        }

        let max = self.name_exact.max(self.name_substring)
            + self.category
            + self.subcategory
            + self.origin;
        if max > f64::from(MAX_SCORE) {
            return Err(MatchError::InvalidPolicy(format!(
                "weights sum to {max}, above the maximum score of {MAX_SCORE}"
            )));
        }

        if self.threshold > MAX_SCORE {
            return Err(MatchError::InvalidPolicy(format!(
                "threshold {} is above the maximum score of {MAX_SCORE}",
                self.threshold
            )));
        }

        Ok(())
    }

    /// Per-field contributions of `record` against `candidate`
    pub fn breakdown(&self, candidate: &CandidateRecord, record: &ExistingRecord) -> ScoreBreakdown {
        let name_match = compare_names(&candidate.name, &record.name);
        let name = match name_match {
            NameMatch::Exact => self.name_exact,
            NameMatch::Substring => self.name_substring,
            NameMatch::None => 0.0,
        };

        let category = if !candidate.category.is_empty() && candidate.category == record.category {
            self.category
        } else {
            0.0
        };

        let subcategory = if optional_eq(&candidate.subcategory, &record.subcategory) {
            self.subcategory
        } else {
            0.0
        };

        let origin = if optional_eq(&candidate.origin_tag, &record.origin_tag) {
            self.origin
        } else {
            0.0
        };

        ScoreBreakdown {
            name_match,
            name,
            category,
            subcategory,
            origin,
        }
    }

    /// Rounded similarity score on the 0-100 scale
    pub fn score(&self, candidate: &CandidateRecord, record: &ExistingRecord) -> u8 {
        self.breakdown(candidate, record).total()
    }

    /// Whether a rounded score qualifies as a duplicate suggestion
    pub fn qualifies(&self, score: u8) -> bool {
        score >= self.threshold
    }
}

/// How the candidate's name related to the record's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameMatch {
    Exact,
    Substring,
    None,
}

/// Contribution of each field to a similarity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name_match: NameMatch,
    pub name: f64,
    pub category: f64,
    pub subcategory: f64,
    pub origin: f64,
}

impl ScoreBreakdown {
    /// Sum of the contributions, rounded and capped at 100
    pub fn total(&self) -> u8 {
        let sum = self.name + self.category + self.subcategory + self.origin;
        sum.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
    }
}

/// An existing record suggested as a duplicate of the candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub record: ExistingRecord,
    /// 0-100
    pub similarity: u8,
}

/// Rank existing records that plausibly duplicate `candidate`.
///
/// Uses the default weights and the 60-point threshold.
pub fn find_matches(candidate: &CandidateRecord, existing: &[ExistingRecord]) -> Vec<MatchResult> {
    find_matches_with(&MatchPolicy::default(), candidate, existing)
}

/// Rank existing records against `candidate` using an explicit policy.
///
/// Results are sorted by descending similarity; equal scores keep the
/// order of `existing`. The policy is assumed to be validated.
pub fn find_matches_with(
    policy: &MatchPolicy,
    candidate: &CandidateRecord,
    existing: &[ExistingRecord],
) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = existing
        .iter()
        .filter_map(|record| {
            let similarity = policy.score(candidate, record);
            log::trace!("record {} scored {similarity}", record.id);
            policy.qualifies(similarity).then(|| MatchResult {
                record: record.clone(),
                similarity,
            })
        })
        .collect();

    // Vec::sort_by is stable, so ties keep input order
    matches.sort_by(|a, b| b.similarity.cmp(&a.similarity));

    log::debug!(
        "{} of {} records matched candidate {:?}",
        matches.len(),
        existing.len(),
        candidate.name
    );

    matches
}

/// Untyped entry point for callers holding raw JSON.
///
/// Both shapes are validated before any scoring happens: a non-object
/// candidate or a non-array collection is an `InvalidArgument`. Elements
/// without a usable id are skipped.
pub fn find_matches_value(candidate: &Value, existing: &Value) -> Result<Vec<MatchResult>> {
    let candidate = CandidateRecord::from_value(candidate)?;
    let existing = records_from_value(existing)?;
    Ok(find_matches(&candidate, &existing))
}

/// Similarity of a single record under the default policy
pub fn similarity(candidate: &CandidateRecord, record: &ExistingRecord) -> u8 {
    MatchPolicy::default().score(candidate, record)
}

/// Per-field explanation of a single record's score under the default policy
pub fn score_breakdown(candidate: &CandidateRecord, record: &ExistingRecord) -> ScoreBreakdown {
    MatchPolicy::default().breakdown(candidate, record)
}

fn compare_names(candidate: &str, existing: &str) -> NameMatch {
    // An empty name would be a substring of everything
    if candidate.is_empty() || existing.is_empty() {
        return NameMatch::None;
    }

    let candidate = candidate.to_lowercase();
    let existing = existing.to_lowercase();

    if candidate == existing {
        NameMatch::Exact
    } else if candidate.contains(&existing) || existing.contains(&candidate) {
        NameMatch::Substring
    } else {
        NameMatch::None
    }
}

/// Case-insensitive equality of two optional fields, false unless both are set
fn optional_eq(left: &Option<String>, right: &Option<String>) -> bool {
    match (left.as_deref(), right.as_deref()) {
        (Some(l), Some(r)) if !l.is_empty() && !r.is_empty() => l.to_lowercase() == r.to_lowercase(),
        _ => false,
    }
}
