//! Inventory record commands

use anyhow::{bail, Result};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;
use serde_json::{json, Map, Value};
use stockmatch::matcher::find_matches_with;
use stockmatch::ExistingRecord;
use tabled::Tabled;

use crate::cli::{AttributeArgs, CandidateArgs, Command};
use crate::commands::check::{candidate_from_args, print_matches};
use crate::commands::open_store;
use crate::config::RuntimeContext;
use crate::output::{format_number, output_for_format, print_table};

#[derive(Debug, Tabled)]
struct RecordRow {
    id: String,
    name: String,
    category: String,
    subcategory: String,
    origin: String,
    quantity: String,
    unit: String,
    cost: String,
}

impl From<&ExistingRecord> for RecordRow {
    fn from(record: &ExistingRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            category: record.category.clone(),
            subcategory: record.subcategory.clone().unwrap_or_default(),
            origin: record.origin_tag.clone().unwrap_or_default(),
            quantity: format_number(record.recorded_quantity()),
            unit: record.unit().unwrap_or_default().to_string(),
            cost: format_number(record.cost()),
        }
    }
}

/// What `add` and `merge` did
#[derive(Debug, Serialize)]
struct Outcome<'a> {
    action: &'static str,
    record: &'a ExistingRecord,
}

pub fn run(ctx: &RuntimeContext, command: Command) -> Result<()> {
    match command {
        Command::Add {
            candidate,
            attrs,
            merge,
            new,
        } => add(ctx, &candidate, &attrs, merge.as_deref(), new),
        Command::Merge { id, quantity } => merge(ctx, &id, quantity),
        Command::List { filter } => list(ctx, filter.as_deref()),
        Command::Show { id } => show(ctx, &id),
        Command::Remove { id } => remove(ctx, &id),
        other => bail!("not a record command: {other:?}"),
    }
}

fn add(
    ctx: &RuntimeContext,
    args: &CandidateArgs,
    attrs: &AttributeArgs,
    merge_into: Option<&str>,
    force_new: bool,
) -> Result<()> {
    let candidate = candidate_from_args(args)?;
    let mut store = open_store(ctx)?;
    let matches = find_matches_with(&ctx.match_policy(), &candidate, store.records());

    if let Some(id) = merge_into {
        if !matches.iter().any(|m| m.record.id == id) {
            bail!(
                "Record {id} is not a likely duplicate of {:?}.\n\
                Use 'stockmatch merge {id} --quantity N' to update it directly.",
                candidate.name
            );
        }

        let Some(quantity) = attrs.quantity else {
            bail!("--merge needs --quantity to add to record {id}");
        };
        let record = store.merge(id, quantity)?.clone();
        store.save()?;
        return report(ctx, "merged", &record);
    }

    if !matches.is_empty() && !force_new {
        output_for_format(ctx, &matches, || print_matches(ctx, &candidate, &matches))?;
        bail!(
            "{} likely duplicate(s) found.\n\
            Re-run with --merge <ID> to add the quantity to one, or --new to insert anyway.",
            matches.len()
        );
    }

    if !matches.is_empty() {
        log::info!(
            "Inserting {:?} despite {} likely duplicate(s)",
            candidate.name,
            matches.len()
        );
    }

    let id = store.insert(&candidate, attribute_map(attrs));
    store.save()?;

    let record = store
        .get(&id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("inserted record {id} vanished"))?;
    report(ctx, "inserted", &record)
}

fn merge(ctx: &RuntimeContext, id: &str, quantity: f64) -> Result<()> {
    let mut store = open_store(ctx)?;
    let record = store.merge(id, quantity)?.clone();
    store.save()?;
    report(ctx, "merged", &record)
}

fn list(ctx: &RuntimeContext, filter: Option<&str>) -> Result<()> {
    let store = open_store(ctx)?;

    let filtered: Vec<&ExistingRecord> = if let Some(filter) = filter {
        let matcher = SkimMatcherV2::default();
        store
            .records()
            .iter()
            .filter(|r| {
                matcher.fuzzy_match(&r.name, filter).is_some()
                    || matcher.fuzzy_match(&r.category, filter).is_some()
            })
            .collect()
    } else {
        store.records().iter().collect()
    };

    output_for_format(ctx, &filtered, || {
        if filtered.is_empty() {
            if filter.is_some() {
                println!("No records found matching filter");
            } else {
                println!("No records in {} inventory", store.company());
            }
            return Ok(());
        }

        let rows: Vec<RecordRow> = filtered.iter().map(|r| RecordRow::from(*r)).collect();
        print_table(ctx, &rows)
    })
}

fn show(ctx: &RuntimeContext, id: &str) -> Result<()> {
    let store = open_store(ctx)?;
    let Some(record) = store.get(id) else {
        bail!("Record not found: {id}");
    };

    output_for_format(ctx, record, || {
        println!("Record:      {}", record.id);
        println!("Name:        {}", record.name);
        println!("Category:    {}", record.category);
        if let Some(ref subcategory) = record.subcategory {
            println!("Subcategory: {subcategory}");
        }
        if let Some(ref origin) = record.origin_tag {
            println!("Origin:      {origin}");
        }
        if !record.extra.is_empty() {
            println!();
            println!("Attributes:");
            for (key, value) in &record.extra {
                println!("  {key}: {value}");
            }
        }
        Ok(())
    })
}

fn remove(ctx: &RuntimeContext, id: &str) -> Result<()> {
    let mut store = open_store(ctx)?;
    let record = store.remove(id)?;
    store.save()?;
    report(ctx, "removed", &record)
}

fn report(ctx: &RuntimeContext, action: &'static str, record: &ExistingRecord) -> Result<()> {
    let outcome = Outcome { action, record };
    output_for_format(ctx, &outcome, || {
        if !ctx.global.quiet {
            println!("{} {} ({})", capitalize(action), record.id, record.name);
            if action != "removed" {
                print_table(ctx, &[RecordRow::from(record)])?;
            }
        }
        Ok(())
    })
}

fn attribute_map(attrs: &AttributeArgs) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(quantity) = attrs.quantity {
        map.insert("quantity".to_string(), json!(quantity));
    }
    if let Some(ref unit) = attrs.unit {
        map.insert("unit".to_string(), json!(unit));
    }
    if let Some(cost) = attrs.cost {
        map.insert("cost".to_string(), json!(cost));
    }
    map
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
