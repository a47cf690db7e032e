//! Duplicate check command

use anyhow::{bail, Result};
use serde::Serialize;
use stockmatch::matcher::{find_matches_with, MatchResult, ScoreBreakdown};
use stockmatch::CandidateRecord;
use tabled::Tabled;

use crate::cli::CandidateArgs;
use crate::commands::open_store;
use crate::config::RuntimeContext;
use crate::output::{format_number, output_for_format, parse_json_input, print_table};

#[derive(Debug, Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    rank: usize,
    id: String,
    similarity: String,
    name: String,
    category: String,
    subcategory: String,
    origin: String,
    quantity: String,
}

impl MatchRow {
    fn new(rank: usize, m: &MatchResult) -> Self {
        let record = &m.record;
        let quantity = format_number(record.recorded_quantity());
        Self {
            rank,
            id: record.id.clone(),
            similarity: format!("{}%", m.similarity),
            name: record.name.clone(),
            category: record.category.clone(),
            subcategory: record.subcategory.clone().unwrap_or_default(),
            origin: record.origin_tag.clone().unwrap_or_default(),
            quantity: match record.unit() {
                Some(unit) if !quantity.is_empty() => format!("{quantity} {unit}"),
                _ => quantity,
            },
        }
    }
}

/// A match with its per-field explanation
#[derive(Debug, Serialize)]
struct ExplainedMatch<'a> {
    #[serde(flatten)]
    result: &'a MatchResult,
    breakdown: ScoreBreakdown,
}

pub fn run(ctx: &RuntimeContext, args: &CandidateArgs, explain: bool) -> Result<()> {
    let candidate = candidate_from_args(args)?;
    let store = open_store(ctx)?;
    let policy = ctx.match_policy();
    let matches = find_matches_with(&policy, &candidate, store.records());

    if explain {
        let explained: Vec<ExplainedMatch> = matches
            .iter()
            .map(|m| ExplainedMatch {
                result: m,
                breakdown: policy.breakdown(&candidate, &m.record),
            })
            .collect();

        return output_for_format(ctx, &explained, || {
            print_matches(ctx, &candidate, &matches)?;
            for item in &explained {
                let b = &item.breakdown;
                println!();
                println!("{} ({}%)", item.result.record.id, item.result.similarity);
                println!("  Name:        {:>5.1}  ({:?})", b.name, b.name_match);
                println!("  Category:    {:>5.1}", b.category);
                println!("  Subcategory: {:>5.1}", b.subcategory);
                println!("  Origin:      {:>5.1}", b.origin);
            }
            Ok(())
        });
    }

    output_for_format(ctx, &matches, || print_matches(ctx, &candidate, &matches))
}

/// Human-readable match list, shared with `add`
pub fn print_matches(
    ctx: &RuntimeContext,
    candidate: &CandidateRecord,
    matches: &[MatchResult],
) -> Result<()> {
    if matches.is_empty() {
        if !ctx.global.quiet {
            println!("No likely duplicates of {:?}", candidate.name);
        }
        return Ok(());
    }

    if !ctx.global.quiet {
        println!(
            "{} likely duplicate(s) of {:?} in {}:",
            matches.len(),
            candidate.name,
            candidate.category
        );
    }
    let rows: Vec<MatchRow> = matches
        .iter()
        .enumerate()
        .map(|(i, m)| MatchRow::new(i + 1, m))
        .collect();
    print_table(ctx, &rows)
}

/// Build a candidate from flags or a JSON document
pub fn candidate_from_args(args: &CandidateArgs) -> Result<CandidateRecord> {
    if let Some(ref data) = args.data {
        let value = parse_json_input(data)?;
        return Ok(CandidateRecord::from_value(&value)?);
    }

    let (Some(name), Some(category)) = (args.name.as_deref(), args.category.as_deref()) else {
        bail!("A candidate needs --name and --category, or --data");
    };

    Ok(CandidateRecord {
        name: name.to_string(),
        category: category.to_string(),
        subcategory: args.subcategory.clone().filter(|s| !s.is_empty()),
        origin_tag: args.origin.clone().filter(|s| !s.is_empty()),
    })
}
