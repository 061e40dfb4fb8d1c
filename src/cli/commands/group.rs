//! `spcgen group` command - nested aggregates of a dataset

use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use serde_json::Value;

use crate::cli::helpers::{escape_md, fixed_or_dash, split_fields};
use crate::cli::output::effective_format;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{
    count, FieldAccess, GroupNode, GroupSummary, Grouper, KeySpec, MissingKey, NestedGroups,
};
use crate::entities::MeasurementRecord;

use super::utils::{generate_records, load_config};

/// What to compute for each terminal group
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Reduce {
    /// Keep the grouped elements
    List,
    /// Number of elements
    Count,
    /// OOC/OOS counts and point statistics (measurement records only)
    Summary,
}

/// Policy for elements lacking a grouping field
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingPolicy {
    /// Fail on the first element without the field
    Reject,
    /// Collect such elements under --bucket-name
    Bucket,
}

#[derive(clap::Args, Debug)]
pub struct GroupArgs {
    /// Fields to group by, outermost first (comma-separated or repeated)
    #[arg(long, short = 'b', required = true, value_delimiter = ',')]
    pub by: Vec<String>,

    /// Number of records to generate when no --input is given
    #[arg(long, short = 'n', allow_negative_numbers = true, conflicts_with = "input")]
    pub count: Option<i64>,

    /// JSON file holding an array of objects to group instead of generating
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Reducer applied to the deepest groups
    #[arg(long, short = 'r', default_value = "count")]
    pub reduce: Reduce,

    /// How to treat elements without a grouping field
    #[arg(long, default_value = "reject")]
    pub missing: MissingPolicy,

    /// Key used for elements without a grouping field (with --missing bucket)
    #[arg(long, default_value = "unclassified")]
    pub bucket_name: String,
}

/// Text shown for a leaf in tree, CSV and Markdown output
trait LeafText {
    fn leaf_text(&self) -> String;
}

impl LeafText for usize {
    fn leaf_text(&self) -> String {
        self.to_string()
    }
}

impl LeafText for GroupSummary {
    fn leaf_text(&self) -> String {
        format!(
            "n={} ooc={} oos={} mean={} min={} max={}",
            self.count,
            self.out_of_control,
            self.out_of_spec,
            fixed_or_dash(self.mean, 3),
            fixed_or_dash(self.min, 3),
            fixed_or_dash(self.max, 3)
        )
    }
}

impl<T> LeafText for Vec<T> {
    fn leaf_text(&self) -> String {
        format!("{} item(s)", self.len())
    }
}

pub fn run(args: GroupArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let fields = split_fields(&args.by);
    if fields.is_empty() {
        return Err(miette::miette!("--by needs at least one field name"));
    }

    let grouper = match args.missing {
        MissingPolicy::Reject => Grouper::new(),
        MissingPolicy::Bucket => {
            Grouper::new().missing_key(MissingKey::Bucket(args.bucket_name.clone()))
        }
    };
    let format = effective_format(global.format, &config, false);

    match &args.input {
        Some(path) => {
            let content = fs::read_to_string(path).into_diagnostic()?;
            if args.reduce == Reduce::Summary {
                let records: Vec<MeasurementRecord> = serde_json::from_str(&content)
                    .map_err(|e| {
                        miette::miette!(
                            "--reduce summary needs measurement records in {}: {}",
                            path.display(),
                            e
                        )
                    })?;
                group_and_print(
                    records,
                    &fields,
                    &grouper,
                    args.reduce,
                    Some(summarize_records),
                    format,
                )
            } else {
                let items = match serde_json::from_str::<Value>(&content).into_diagnostic()? {
                    Value::Array(items) => items,
                    _ => {
                        return Err(miette::miette!(
                            "{} must contain a JSON array",
                            path.display()
                        ))
                    }
                };
                group_and_print(items, &fields, &grouper, args.reduce, None, format)
            }
        }
        None => {
            let records = generate_records(global, &config, args.count)?;
            group_and_print(
                records,
                &fields,
                &grouper,
                args.reduce,
                Some(summarize_records),
                format,
            )
        }
    }
}

fn group_and_print<T>(
    items: Vec<T>,
    fields: &[String],
    grouper: &Grouper,
    reduce: Reduce,
    summarize: Option<fn(Vec<T>) -> GroupSummary>,
    format: OutputFormat,
) -> Result<()>
where
    T: FieldAccess + Serialize,
{
    let keys: Vec<KeySpec<'_, T>> = fields.iter().map(|f| KeySpec::field(f.as_str())).collect();

    match (reduce, summarize) {
        (Reduce::List, _) => {
            let nested = grouper.by_multi(items, &keys).into_diagnostic()?;
            print_groups(&nested, fields, format)
        }
        (Reduce::Count, _) => {
            let nested = grouper.by_multi_with(items, &keys, count).into_diagnostic()?;
            print_groups(&nested, fields, format)
        }
        (Reduce::Summary, Some(summarize)) => {
            let nested = grouper
                .by_multi_with(items, &keys, summarize)
                .into_diagnostic()?;
            print_groups(&nested, fields, format)
        }
        (Reduce::Summary, None) => Err(miette::miette!(
            "--reduce summary is only available for measurement records"
        )),
    }
}

fn summarize_records(group: Vec<MeasurementRecord>) -> GroupSummary {
    GroupSummary::of(&group)
}

/// Flatten a nested grouping into (key path, leaf) rows, depth-first
fn leaf_rows<'a, V>(
    nested: &'a NestedGroups<V>,
    path: &mut Vec<String>,
    rows: &mut Vec<(Vec<String>, &'a V)>,
) {
    for (key, node) in nested {
        path.push(key.clone());
        match node {
            GroupNode::Leaf(value) => rows.push((path.clone(), value)),
            GroupNode::Branch(children) => leaf_rows(children, path, rows),
        }
        path.pop();
    }
}

fn print_groups<V>(nested: &NestedGroups<V>, fields: &[String], format: OutputFormat) -> Result<()>
where
    V: Serialize + LeafText,
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(nested).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(nested).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv | OutputFormat::Tsv => {
            let delimiter = if format == OutputFormat::Csv { b',' } else { b'\t' };
            let mut writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .from_writer(std::io::stdout().lock());
            let mut header: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
            header.push("value");
            writer.write_record(&header).into_diagnostic()?;

            let mut rows = Vec::new();
            leaf_rows(nested, &mut Vec::new(), &mut rows);
            for (path, value) in rows {
                let mut record = path;
                record.push(value.leaf_text());
                writer.write_record(&record).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
        }
        OutputFormat::Md => {
            let header: Vec<String> = fields.iter().map(|f| escape_md(f)).collect();
            println!("| {} | value |", header.join(" | "));
            println!("|{}---|", "---|".repeat(fields.len()));
            let mut rows = Vec::new();
            leaf_rows(nested, &mut Vec::new(), &mut rows);
            for (path, value) in rows {
                let cells: Vec<String> = path.iter().map(|p| escape_md(p)).collect();
                println!("| {} | {} |", cells.join(" | "), escape_md(&value.leaf_text()));
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if nested.is_empty() {
                println!("No groups found.");
                return Ok(());
            }
            print_tree(nested, fields, 0);
        }
    }
    Ok(())
}

fn print_tree<V: LeafText>(nested: &NestedGroups<V>, fields: &[String], depth: usize) {
    let indent = "  ".repeat(depth);
    let field = fields.get(depth).map(String::as_str).unwrap_or("");
    for (key, node) in nested {
        match node {
            GroupNode::Leaf(value) => println!(
                "{}{}={}  {}",
                indent,
                style(field).dim(),
                style(key).cyan(),
                value.leaf_text()
            ),
            GroupNode::Branch(children) => {
                println!("{}{}={}", indent, style(field).dim(), style(key).cyan().bold());
                print_tree(children, fields, depth + 1);
            }
        }
    }
}
