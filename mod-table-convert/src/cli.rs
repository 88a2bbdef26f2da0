use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use xml_presence_core::ComparisonMode;

#[derive(Parser, Debug)]
#[command(name = "mod-table-convert")]
#[command(about = "Convert game mod XML files to spreadsheets and back without losing structure")]
pub struct Cli {
    /// Log progress to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Convert between XML and xlsx; the direction follows the file extensions.
    Convert(ConvertArgs),
    /// Print the model that matches an XML file.
    Recognize(RecognizeArgs),
    /// List the supported models.
    ListModels(ListModelsArgs),
    /// Compare two XML files for structural equivalence.
    Compare(CompareArgs),
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    #[arg(long)]
    pub input: PathBuf,
    #[arg(long)]
    pub output: PathBuf,
    /// Model name. Recognised from the document when converting from XML.
    #[arg(long)]
    pub model: Option<String>,
    /// Worksheet to read, or the name of the worksheet to write.
    #[arg(long)]
    pub worksheet: Option<String>,
    /// Check that the input converts, without writing the output.
    #[arg(long)]
    pub validate: bool,
    /// Joins field names into column names.
    #[arg(long, default_value = "_")]
    pub separator: String,
    /// Comparison settings TOML used to verify the XML round trip.
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct RecognizeArgs {
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ListModelsArgs {
    /// Only list models whose name, root or description contains this text.
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Print only the difference counts.
    #[arg(long)]
    pub summary: bool,
    /// Overrides the mode from the settings file.
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,
    #[arg(long)]
    pub options: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Mode {
    Strict,
    Logical,
    Loose,
}

impl From<Mode> for ComparisonMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Strict => Self::Strict,
            Mode::Logical => Self::Logical,
            Mode::Loose => Self::Loose,
        }
    }
}
