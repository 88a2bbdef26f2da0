use colored::Colorize;
use xml_presence_core::{format_summary, format_text, Difference};

use crate::registry::ModelEntry;

/// Render differences for terminal output.
pub fn render_text(differences: &[Difference]) -> String {
    let raw = format_text(differences);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else if line.starts_with('!') {
            line.magenta().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render difference counts by kind.
pub fn render_summary(differences: &[Difference]) -> String {
    format_summary(differences).cyan().to_string()
}

/// One line per model, or a block per model with its root and columns when `verbose`.
pub fn render_models(models: &[&ModelEntry], verbose: bool, separator: &str) -> String {
    let mut out = Vec::new();
    for entry in models {
        out.push(format!("{:<20} {}", entry.name.bold(), entry.description));
        if !verbose {
            continue;
        }
        out.push(format!("  root: <{}>", entry.root()));
        if let Some((attribute, value)) = entry.discriminator {
            out.push(format!("  discriminator: {attribute}=\"{value}\""));
        }
        match entry.columns(separator) {
            Ok(columns) => out.push(format!("  columns: {}", columns.join(", "))),
            Err(err) => out.push(format!("  columns: {}", err.to_string().red())),
        }
        let filled = entry.empty_cell_elements();
        if !filled.is_empty() {
            let elements: Vec<String> = filled.iter().map(|name| format!("<{name}/>")).collect();
            out.push(format!(
                "  {} blank cells are written back as {}",
                "note:".yellow(),
                elements.join(", ")
            ));
        }
    }
    out.join("\n")
}
