//! `spcgen generate` command - synthetic SPC datasets

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{escape_md, fixed, truncate_str};
use crate::cli::output::{effective_format, styled_annotation};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::{Annotation, MeasurementRecord};

use super::utils::{generate_records, load_config};

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Number of records to generate (defaults to output.default_count)
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// Only print how many records fall in each class
    #[arg(long)]
    pub count_only: bool,

    /// Only show out-of-control and out-of-spec records
    #[arg(long)]
    pub excursions: bool,
}

pub fn run(args: GenerateArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let records = generate_records(global, &config, args.count)?;

    if args.count_only {
        print_counts(&records);
        return Ok(());
    }

    let records: Vec<MeasurementRecord> = if args.excursions {
        records.into_iter().filter(|r| r.is_excursion()).collect()
    } else {
        records
    };

    match effective_format(global.format, &config, true) {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&records).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Csv => write_delimited(&records, b',')?,
        OutputFormat::Tsv => write_delimited(&records, b'\t')?,
        OutputFormat::Md => print_markdown(&records),
        OutputFormat::Table | OutputFormat::Auto => print_table(&records),
    }

    Ok(())
}

fn print_counts(records: &[MeasurementRecord]) {
    for annotation in Annotation::all() {
        let n = records.iter().filter(|r| r.annotation == *annotation).count();
        println!("{}\t{}", annotation.label(), n);
    }
    println!("total\t{}", records.len());
}

fn write_delimited(records: &[MeasurementRecord], delimiter: u8) -> Result<()> {
    let stdout = std::io::stdout();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(stdout.lock());

    if records.is_empty() {
        writer
            .write_record(MeasurementRecord::columns())
            .into_diagnostic()?;
    }
    for record in records {
        writer.serialize(record).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;
    Ok(())
}

fn print_markdown(records: &[MeasurementRecord]) {
    println!("| Lot | Wafer | Fab | Gen | Product | Process EQP | Metrology EQP | Time | Point | LCL | UCL | LSL | USL | Comment |");
    println!("|---|---|---|---|---|---|---|---|---|---|---|---|---|---|");
    for r in records {
        println!(
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            r.lot_id,
            r.wafer_id,
            escape_md(&r.facility),
            escape_md(&r.generation_node),
            escape_md(&r.product),
            escape_md(&r.process_equipment),
            escape_md(&r.metrology_equipment),
            r.timestamp,
            fixed(r.point, 3),
            fixed(r.control_lower_limit, 2),
            fixed(r.control_upper_limit, 2),
            fixed(r.spec_lower_limit, 2),
            fixed(r.spec_upper_limit, 2),
            r.annotation.as_str()
        );
    }
}

fn print_table(records: &[MeasurementRecord]) {
    if records.is_empty() {
        println!("No records generated.");
        return;
    }

    let columns: [(&str, usize); 11] = [
        ("LOT", 16),
        ("WAFER", 8),
        ("FAB", 6),
        ("GEN", 4),
        ("PRODUCT", 8),
        ("PROC EQP", 9),
        ("MET EQP", 9),
        ("TIME", 20),
        ("POINT", 9),
        ("LCL/UCL", 15),
        ("STATUS", 6),
    ];

    for (header, width) in &columns {
        print!("{:<width$} ", style(header).bold(), width = *width);
    }
    println!();
    println!(
        "{}",
        "-".repeat(columns.iter().map(|(_, w)| w + 1).sum::<usize>())
    );

    for r in records {
        let cells = [
            r.lot_id.clone(),
            r.wafer_id.clone(),
            truncate_str(&r.facility, 6),
            truncate_str(&r.generation_node, 4),
            truncate_str(&r.product, 8),
            truncate_str(&r.process_equipment, 9),
            truncate_str(&r.metrology_equipment, 9),
            r.timestamp.clone(),
            fixed(r.point, 3),
            format!(
                "{}/{}",
                fixed(r.control_lower_limit, 2),
                fixed(r.control_upper_limit, 2)
            ),
        ];
        for (cell, (_, width)) in cells.iter().zip(columns.iter()) {
            print!("{:<width$} ", cell, width = *width);
        }
        println!("{}", styled_annotation(r.annotation));
    }

    let excursions = records.iter().filter(|r| r.is_excursion()).count();
    println!();
    println!(
        "{} record(s) generated, {} excursion(s).",
        style(records.len()).cyan(),
        style(excursions).yellow()
    );
}
