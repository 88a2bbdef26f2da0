//! Registry of the file types the converter understands.
//!
//! Every entry binds a model name to its typed record through plain function pointers, so the
//! CLI can dispatch on a name or on a parsed document without knowing the concrete type.

use thiserror::Error;
use xml_presence_core::{
    flatten_with_schema, table_to_xml, validate, xml_to_table, ElementNode, FieldKind,
    FlattenOptions, RecordSchema, RoundTripError, RunOptions, SchemaInferenceError, TableRow, TableSchema,
    TypedRecord,
};

use crate::models::{ActionTypes, HardCodedSounds, ModuleStrings, Skills};

type XmlToTable =
    fn(&[u8], &FlattenOptions, &RunOptions) -> Result<(TableSchema, Vec<TableRow>), RoundTripError>;
type TableToXml = fn(&TableSchema, &[TableRow]) -> Result<String, RoundTripError>;
type Validate = fn(&[u8]) -> Result<(), RoundTripError>;

/// One convertible file type.
#[derive(Debug, Clone, Copy)]
pub struct ModelEntry {
    pub name: &'static str,
    pub description: &'static str,
    /// Root attribute and value that tell apart models sharing a root element name.
    pub discriminator: Option<(&'static str, &'static str)>,
    pub schema: fn() -> &'static RecordSchema,
    pub xml_to_table: XmlToTable,
    pub table_to_xml: TableToXml,
    pub validate: Validate,
}

impl ModelEntry {
    const fn of<T: TypedRecord>(
        name: &'static str,
        description: &'static str,
        discriminator: Option<(&'static str, &'static str)>,
    ) -> Self {
        Self {
            name,
            description,
            discriminator,
            schema: T::schema,
            xml_to_table: xml_to_table::<T>,
            table_to_xml: table_to_xml::<T>,
            validate: validate::<T>,
        }
    }

    /// Root element name of documents of this type.
    pub fn root(&self) -> &'static str {
        (self.schema)().name
    }

    /// Table header produced for this model.
    pub fn columns(&self, separator: &str) -> Result<Vec<String>, SchemaInferenceError> {
        let options = FlattenOptions::with_separator(separator);
        let (table, _) = flatten_with_schema((self.schema)(), &[], &options)?;
        Ok(table.columns)
    }

    /// Optional leaf elements that come back from a table as empty elements when their cell is
    /// blank, even if the source document left them out.
    pub fn empty_cell_elements(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        collect_empty_cell_elements((self.schema)(), &mut out);
        out
    }

    fn accepts(&self, root: &ElementNode) -> bool {
        if root.name != self.root() {
            return false;
        }
        match self.discriminator {
            Some((attribute, value)) => root.attribute(attribute).text() == Some(value),
            None => true,
        }
    }
}

fn collect_empty_cell_elements(schema: &'static RecordSchema, out: &mut Vec<&'static str>) {
    for field in schema.fields {
        match field.kind {
            FieldKind::Element if !field.required && !field.nullable => out.push(field.name),
            FieldKind::Nested(child) | FieldKind::Repeated(child) => {
                collect_empty_cell_elements(child, out);
            }
            FieldKind::Attribute | FieldKind::Element => {}
        }
    }
}

static MODELS: &[ModelEntry] = &[
    ModelEntry::of::<ActionTypes>(
        "action_types",
        "Action type definitions (action_types.xml)",
        None,
    ),
    ModelEntry::of::<ModuleStrings>(
        "module_strings",
        "Localised module strings (module_strings.xml)",
        Some(("type", "string")),
    ),
    ModelEntry::of::<HardCodedSounds>(
        "hard_coded_sounds",
        "Hard-coded sound event paths (hard_coded_sounds.xml)",
        Some(("type", "hard_coded_sound")),
    ),
    ModelEntry::of::<Skills>("skills", "Skill data with attribute modifiers (skills.xml)", None),
];

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown model '{name}' (available: {})", available.join(", "))]
    Unknown {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("no model recognises root element <{root}>")]
    Unrecognized { root: String },
}

/// All registered models in listing order.
pub fn models() -> &'static [ModelEntry] {
    MODELS
}

/// Look up a model by name, ignoring ASCII case.
pub fn find(name: &str) -> Result<&'static ModelEntry, ModelError> {
    MODELS
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| ModelError::Unknown {
            name: name.to_string(),
            available: MODELS.iter().map(|entry| entry.name).collect(),
        })
}

/// Models whose name, root element or description contains `query` (case-insensitive).
pub fn search(query: &str) -> Vec<&'static ModelEntry> {
    let query = query.to_lowercase();
    MODELS
        .iter()
        .filter(|entry| {
            entry.name.contains(&query)
                || entry.root().to_lowercase().contains(&query)
                || entry.description.to_lowercase().contains(&query)
        })
        .collect()
}

/// Pick the model for a parsed document. A discriminator match beats a bare root-name match.
pub fn recognize(root: &ElementNode) -> Result<&'static ModelEntry, ModelError> {
    let mut candidates: Vec<&'static ModelEntry> =
        MODELS.iter().filter(|entry| entry.accepts(root)).collect();
    candidates.sort_by_key(|entry| entry.discriminator.is_none());
    match candidates.first() {
        Some(&entry) => {
            tracing::debug!(model = entry.name, root = %root.name, "recognised model");
            Ok(entry)
        }
        None => Err(ModelError::Unrecognized {
            root: root.name.clone(),
        }),
    }
}
