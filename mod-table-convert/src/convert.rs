//! The `convert` command.
//!
//! XML input is recognised (or checked against `--model`), verified to survive projection and
//! reflection under the configured comparison options, flattened and written as a workbook.
//! Workbook input is read from one worksheet, unflattened into a single document and written as
//! XML. With `--validate` every step runs except the final write.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mod_table_convert::registry::{self, ModelEntry};
use mod_table_convert::report::render_text;
use mod_table_convert::settings::{default_comparison_options, load_comparison_options};
use mod_table_convert::workbook::{read_workbook, write_workbook, Sheet};
use xml_presence_core::{parse, ComparisonOptions, FlattenOptions, RoundTripError, RunOptions};

use crate::cli::ConvertArgs;
use crate::path_guard::ensure_output_not_same;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Xml,
    Xlsx,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("xml") => Ok(Self::Xml),
            Some("xlsx") => Ok(Self::Xlsx),
            _ => bail!(
                "unsupported file type {}: expected a .xml or .xlsx extension",
                path.display()
            ),
        }
    }
}

pub fn run_convert(args: ConvertArgs) -> Result<()> {
    let from = FileFormat::of(&args.input)?;
    let to = FileFormat::of(&args.output)?;
    if from == to {
        bail!(
            "input {} and output {} have the same file type; convert goes between .xml and .xlsx",
            args.input.display(),
            args.output.display()
        );
    }
    ensure_output_not_same(&args.output, &args.input)?;

    match from {
        FileFormat::Xml => xml_to_workbook(&args),
        FileFormat::Xlsx => workbook_to_xml(&args),
    }
}

/// Options from `--options`, else the bundled settings.
pub fn comparison_options(path: Option<&Path>) -> Result<ComparisonOptions> {
    match path {
        Some(path) => Ok(load_comparison_options(path)?),
        None => Ok(default_comparison_options()),
    }
}

fn xml_to_workbook(args: &ConvertArgs) -> Result<()> {
    let input = args.input.display();
    let bytes = fs::read(&args.input).with_context(|| format!("failed to read {input}"))?;
    let model = match &args.model {
        Some(name) => registry::find(name)?,
        None => {
            let root = parse(&bytes).with_context(|| format!("failed to parse {input}"))?;
            registry::recognize(&root)?
        }
    };
    tracing::info!(model = model.name, input = %input, "converting XML to workbook");

    if args.validate {
        (model.validate)(&bytes)
            .with_context(|| format!("{input} is not a valid {} document", model.name))?;
        println!("{input}: valid {} document", model.name);
        return Ok(());
    }

    let verify = RunOptions::verified(comparison_options(args.options.as_deref())?);
    let flatten = FlattenOptions::with_separator(args.separator.as_str());
    let (table, rows) = match (model.xml_to_table)(&bytes, &flatten, &verify) {
        Ok(table) => table,
        Err(err) => return Err(report_round_trip(err, model)),
    };

    let sheet_name = args.worksheet.as_deref().unwrap_or(model.name);
    let sheet = Sheet::from_table(sheet_name, &table, &rows);
    write_workbook(&args.output, &sheet)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "{input} -> {} ({} model, {} rows, {} columns)",
        args.output.display(),
        model.name,
        rows.len(),
        table.width()
    );
    Ok(())
}

fn workbook_to_xml(args: &ConvertArgs) -> Result<()> {
    let input = args.input.display();
    let Some(name) = args.model.as_deref() else {
        bail!("--model is required when converting from a workbook (see `list-models`)");
    };
    let model = registry::find(name)?;
    tracing::info!(model = model.name, input = %input, "converting workbook to XML");

    let sheet = read_workbook(&args.input, args.worksheet.as_deref())
        .with_context(|| format!("failed to read workbook {input}"))?;
    let (table, rows) = sheet.to_table(&args.separator);
    let xml = (model.table_to_xml)(&table, &rows).with_context(|| {
        format!(
            "worksheet '{}' of {input} does not describe a {} document",
            sheet.name, model.name
        )
    })?;

    if args.validate {
        println!(
            "{input}: worksheet '{}' holds a valid {} table ({} rows)",
            sheet.name,
            model.name,
            rows.len()
        );
        return Ok(());
    }

    let filled = model.empty_cell_elements();
    if !filled.is_empty() {
        tracing::info!(elements = ?filled, "blank cells are written back as empty elements");
    }
    fs::write(&args.output, xml)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!(
        "{input} -> {} ({} model, {} rows)",
        args.output.display(),
        model.name,
        rows.len()
    );
    Ok(())
}

/// Print what a failed verification found before handing the error on.
fn report_round_trip(err: RoundTripError, model: &ModelEntry) -> anyhow::Error {
    if let RoundTripError::NotEquivalent { differences } = &err {
        eprintln!("{}", render_text(differences));
    }
    anyhow::Error::new(err).context(format!("{} round trip failed", model.name))
}
