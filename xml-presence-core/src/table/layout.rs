use indexmap::IndexMap;

use crate::projection::schema::{FieldDecl, FieldKind, RecordSchema};
use crate::table::SchemaInferenceError;

/// A table column bound to one scalar field.
#[derive(Debug)]
pub(crate) struct Column {
    pub name: String,
    /// Dotted field path used in diagnostics, e.g. `base.tags.tag.@language`.
    pub path: String,
    pub required: bool,
    /// Record the column belongs to. Group 0 is the root record.
    pub group: usize,
}

/// Compiled mirror of a schema's fields, aligned with `RecordSchema::fields`.
#[derive(Debug)]
pub(crate) enum Slot {
    Scalar {
        column: usize,
        nullable: bool,
    },
    Nested {
        decl: &'static FieldDecl,
        schema: &'static RecordSchema,
        slots: Vec<Slot>,
    },
    Repeated {
        schema: &'static RecordSchema,
        slots: Vec<Slot>,
    },
}

#[derive(Debug)]
pub(crate) struct Layout {
    pub columns: Vec<Column>,
    pub slots: Vec<Slot>,
    /// Number of record groups, root included.
    pub groups: usize,
}

impl Layout {
    pub fn build(
        schema: &'static RecordSchema,
        separator: &str,
    ) -> Result<Self, SchemaInferenceError> {
        let mut compiler = Compiler {
            separator,
            columns: Vec::new(),
            groups: 1,
        };
        let slots = compiler.compile(schema, None, schema.name, 0);
        check_ambiguity(&compiler.columns)?;
        Ok(Self {
            columns: compiler.columns,
            slots,
            groups: compiler.groups,
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }
}

struct Compiler<'a> {
    separator: &'a str,
    columns: Vec<Column>,
    groups: usize,
}

impl Compiler<'_> {
    fn compile(
        &mut self,
        schema: &'static RecordSchema,
        prefix: Option<&str>,
        path: &str,
        group: usize,
    ) -> Vec<Slot> {
        let mut slots = Vec::with_capacity(schema.fields.len());
        for field in schema.fields {
            let name = match prefix {
                Some(prefix) => format!("{prefix}{}{}", self.separator, field.name),
                None => field.name.to_string(),
            };
            let child_path = format!("{path}.{}", field.name);
            let slot = match field.kind {
                FieldKind::Attribute | FieldKind::Element => {
                    let marker = if matches!(field.kind, FieldKind::Attribute) {
                        "@"
                    } else {
                        ""
                    };
                    self.columns.push(Column {
                        name,
                        path: format!("{path}.{marker}{}", field.name),
                        required: field.required,
                        group,
                    });
                    Slot::Scalar {
                        column: self.columns.len() - 1,
                        nullable: field.nullable,
                    }
                }
                FieldKind::Nested(child) => {
                    let group = self.next_group();
                    Slot::Nested {
                        decl: field,
                        schema: child,
                        slots: self.compile(child, Some(&name), &child_path, group),
                    }
                }
                FieldKind::Repeated(child) => {
                    let group = self.next_group();
                    Slot::Repeated {
                        schema: child,
                        slots: self.compile(child, Some(&name), &child_path, group),
                    }
                }
            };
            slots.push(slot);
        }
        slots
    }

    fn next_group(&mut self) -> usize {
        self.groups += 1;
        self.groups - 1
    }
}

fn check_ambiguity(columns: &[Column]) -> Result<(), SchemaInferenceError> {
    let mut by_name: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for column in columns {
        by_name
            .entry(column.name.as_str())
            .or_default()
            .push(column.path.as_str());
    }
    match by_name.into_iter().find(|(_, paths)| paths.len() > 1) {
        Some((column, paths)) => Err(SchemaInferenceError::AmbiguousColumn {
            column: column.to_string(),
            paths: paths.into_iter().map(ToString::to_string).collect(),
        }),
        None => Ok(()),
    }
}

/// Columns that never vary across the rows of one record: scalars reachable without
/// crossing a repeated field.
pub(crate) fn fixed_columns(slots: &[Slot], out: &mut Vec<usize>) {
    for slot in slots {
        match slot {
            Slot::Scalar { column, .. } => out.push(*column),
            Slot::Nested { slots, .. } => fixed_columns(slots, out),
            Slot::Repeated { .. } => {}
        }
    }
}

pub(crate) fn all_columns(slots: &[Slot], out: &mut Vec<usize>) {
    for slot in slots {
        match slot {
            Slot::Scalar { column, .. } => out.push(*column),
            Slot::Nested { slots, .. } | Slot::Repeated { slots, .. } => all_columns(slots, out),
        }
    }
}
