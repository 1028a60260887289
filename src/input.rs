use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{info, warn};

use crate::cli::MalformedRowPolicy;
use crate::model::{Category, GoldItem, InputFileSummary, Label, RowRejection};
use crate::util::sha256_file;

const GOLD_FIELDS: usize = 2;
const LABEL_FIELDS: usize = 3;

#[derive(Debug, Clone)]
pub struct LoadedTable<T> {
    pub rows: Vec<T>,
    pub summary: InputFileSummary,
}

#[derive(Debug, Clone)]
struct ParsedRows<T> {
    rows: Vec<T>,
    rejections: Vec<RowRejection>,
}

pub fn load_gold_table(path: &Path, policy: MalformedRowPolicy) -> Result<LoadedTable<GoldItem>> {
    let raw = read_table(path)?;
    let parsed = parse_gold_rows(&raw, policy)
        .with_context(|| format!("failed to ingest gold table {}", path.display()))?;
    finish_table(path, parsed)
}

pub fn load_label_table(path: &Path, policy: MalformedRowPolicy) -> Result<LoadedTable<Label>> {
    let raw = read_table(path)?;
    let parsed = parse_label_rows(&raw, policy)
        .with_context(|| format!("failed to ingest label table {}", path.display()))?;
    finish_table(path, parsed)
}

fn read_table(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn finish_table<T>(path: &Path, parsed: ParsedRows<T>) -> Result<LoadedTable<T>> {
    let sha256 = sha256_file(path)?;

    info!(
        path = %path.display(),
        accepted = parsed.rows.len(),
        rejected = parsed.rejections.len(),
        "ingested table"
    );

    Ok(LoadedTable {
        summary: InputFileSummary {
            path: path.display().to_string(),
            sha256,
            rows_accepted: parsed.rows.len(),
            rows_rejected: parsed.rejections.len(),
            rejections: parsed.rejections,
        },
        rows: parsed.rows,
    })
}

fn parse_gold_rows(raw: &str, policy: MalformedRowPolicy) -> Result<ParsedRows<GoldItem>> {
    let mut seen = HashSet::<String>::new();
    parse_rows(raw, policy, |line| {
        let fields = split_fields(line, GOLD_FIELDS)?;
        let item_id = fields[0];
        let true_category = fields[1].parse::<Category>()?;
        if !seen.insert(item_id.to_string()) {
            bail!("duplicate gold item {item_id}");
        }
        Ok(GoldItem::new(item_id, true_category))
    })
}

fn parse_label_rows(raw: &str, policy: MalformedRowPolicy) -> Result<ParsedRows<Label>> {
    parse_rows(raw, policy, |line| {
        let fields = split_fields(line, LABEL_FIELDS)?;
        let category = fields[2].parse::<Category>()?;
        Ok(Label::new(fields[0], fields[1], category))
    })
}

/// Parses every non-blank line. Under `Discard` a malformed row is logged and
/// recorded; under `Fail` the first malformed row aborts the ingest.
fn parse_rows<T, F>(
    raw: &str,
    policy: MalformedRowPolicy,
    mut parse_line: F,
) -> Result<ParsedRows<T>>
where
    F: FnMut(&str) -> Result<T>,
{
    let mut parsed = ParsedRows {
        rows: Vec::new(),
        rejections: Vec::new(),
    };

    for (index, line) in raw.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(row) => parsed.rows.push(row),
            Err(err) => match policy {
                MalformedRowPolicy::Fail => {
                    return Err(err.context(format!("malformed row at line {line_number}")));
                }
                MalformedRowPolicy::Discard => {
                    warn!(line = line_number, reason = %err, "discarding malformed row");
                    parsed.rejections.push(RowRejection {
                        line: line_number,
                        reason: err.to_string(),
                    });
                }
            },
        }
    }

    Ok(parsed)
}

fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>> {
    let fields = line.split('\t').map(str::trim).collect::<Vec<&str>>();
    if fields.len() != expected {
        return Err(anyhow!(
            "expected {expected} tab-separated fields, found {}",
            fields.len()
        ));
    }
    if let Some(position) = fields.iter().position(|field| field.is_empty()) {
        bail!("field {} is empty", position + 1);
    }
    Ok(fields)
}
