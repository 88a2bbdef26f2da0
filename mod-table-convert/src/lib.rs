//! Conversion of game mod XML files to spreadsheets and back.
//!
//! The heavy lifting (presence tracking, projection, flattening and comparison) lives in
//! `xml-presence-core`. This crate adds the file types it knows about and the pieces a command
//! line tool needs around them.
//!
//! - [`models`]: typed records for each supported file type
//! - [`registry`]: lookup and recognition of models by name or document root
//! - [`workbook`]: `.xlsx` packaging of flattened tables
//! - [`settings`]: comparison options loaded from TOML
//! - [`report`]: terminal-friendly colored output
//! - [`failure`]: exit codes for failed commands
//!
//! ```ignore
//! use mod_table_convert::registry::recognize;
//! use xml_presence_core::{parse, FlattenOptions, RunOptions};
//!
//! let bytes = std::fs::read("skills.xml")?;
//! let model = recognize(&parse(&bytes)?)?;
//! let (table, rows) = (model.xml_to_table)(&bytes, &FlattenOptions::default(), &RunOptions::default())?;
//! ```

pub mod failure;
pub mod models;
pub mod registry;
pub mod report;
pub mod settings;
pub mod workbook;
