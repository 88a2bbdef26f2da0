use thiserror::Error;

use crate::presence::PresenceState;
use crate::projection::record::{FieldValue, Record};
use crate::projection::schema::{FieldKind, RecordSchema};
use crate::tree::ElementNode;

/// Errors raised when a tree does not fit the target schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    /// The element at `path` has a different name than the schema expects.
    #[error("schema mismatch at {path}: expected <{expected}>, found <{found}>")]
    SchemaMismatch {
        path: String,
        expected: String,
        found: String,
    },
    /// A required attribute or element is absent.
    #[error("required field {path} is absent")]
    MissingField { path: String },
}

/// A statically-typed model that maps onto a [`RecordSchema`].
pub trait TypedRecord: Sized {
    /// Schema of the model's root element.
    fn schema() -> &'static RecordSchema;

    /// Build the typed value from a projected record.
    fn from_record(record: &Record) -> Result<Self, ProjectError>;

    /// Describe the typed value as a record for reflection or flattening.
    fn to_record(&self) -> Record;
}

/// Project a tree onto a typed model.
pub fn project<T: TypedRecord>(node: &ElementNode) -> Result<T, ProjectError> {
    let record = project_record(node, T::schema())?;
    T::from_record(&record)
}

/// Reflect a typed model back into a fresh tree.
pub fn reflect<T: TypedRecord>(value: &T) -> ElementNode {
    reflect_record(&value.to_record())
}

/// Project a tree onto a schema, copying each field's presence verbatim.
///
/// Content the schema does not declare is dropped.
pub fn project_record(
    node: &ElementNode,
    schema: &'static RecordSchema,
) -> Result<Record, ProjectError> {
    project_at(node, schema, schema.name)
}

fn project_at(
    node: &ElementNode,
    schema: &'static RecordSchema,
    path: &str,
) -> Result<Record, ProjectError> {
    if node.name != schema.name {
        return Err(ProjectError::SchemaMismatch {
            path: path.to_string(),
            expected: schema.name.to_string(),
            found: node.name.clone(),
        });
    }

    let mut values = Vec::with_capacity(schema.fields.len());
    for field in schema.fields {
        let value = match field.kind {
            FieldKind::Attribute => FieldValue::Scalar(node.attribute(field.name)),
            FieldKind::Element => {
                let matches = node.get_children(field.name);
                if matches.len() > 1 {
                    tracing::debug!(
                        path,
                        field = field.name,
                        count = matches.len(),
                        "keeping first of repeated single-valued element"
                    );
                }
                FieldValue::Scalar(
                    matches
                        .first()
                        .map(|child| child.presence())
                        .unwrap_or(PresenceState::Absent),
                )
            }
            FieldKind::Nested(child_schema) => {
                let child_path = format!("{path}.{}", field.name);
                let record = node
                    .get_child(field.name)
                    .map(|child| project_at(child, child_schema, &child_path))
                    .transpose()?;
                FieldValue::Nested(record)
            }
            FieldKind::Repeated(item_schema) => {
                let items = node
                    .get_children(field.name)
                    .into_iter()
                    .enumerate()
                    .map(|(index, child)| {
                        let child_path = format!("{path}.{}[{}]", field.name, index + 1);
                        project_at(child, item_schema, &child_path)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                FieldValue::Repeated(items)
            }
        };

        if field.required && value.is_absent() {
            let separator = if matches!(field.kind, FieldKind::Attribute) {
                ".@"
            } else {
                "."
            };
            return Err(ProjectError::MissingField {
                path: format!("{path}{separator}{}", field.name),
            });
        }
        values.push(value);
    }

    report_undeclared(node, schema, path);
    Ok(Record::from_values(schema, values))
}

fn report_undeclared(node: &ElementNode, schema: &RecordSchema, path: &str) {
    for name in node.attributes.keys() {
        let declared = schema
            .fields
            .iter()
            .any(|field| field.name == name && matches!(field.kind, FieldKind::Attribute));
        if !declared {
            tracing::debug!(path, attribute = %name, "dropping undeclared attribute");
        }
    }
    for child in &node.children {
        let declared = schema
            .fields
            .iter()
            .any(|field| field.name == child.name && !matches!(field.kind, FieldKind::Attribute));
        if !declared {
            tracing::debug!(path, element = %child.name, "dropping undeclared element");
        }
    }
    if node.text.is_some() {
        tracing::debug!(path, "dropping record text content");
    }
}

/// Reflect a record into a fresh tree, writing fields in schema order.
///
/// Absent fields are omitted; present-empty attributes become `name=""` and present-empty
/// elements become empty elements.
pub fn reflect_record(record: &Record) -> ElementNode {
    let schema = record.schema();
    let mut node = ElementNode::new(schema.name);

    for (field, value) in schema.fields.iter().zip(record.values()) {
        match (field.kind, value) {
            (FieldKind::Attribute, FieldValue::Scalar(state)) => {
                node.set_attribute(field.name, state.clone());
            }
            (FieldKind::Element, FieldValue::Scalar(state)) => {
                if let Some(text) = state.text() {
                    node.children.push(ElementNode::new(field.name).with_text(text));
                }
            }
            (FieldKind::Nested(_), FieldValue::Nested(Some(child))) => {
                node.children.push(reflect_record(child));
            }
            (FieldKind::Repeated(_), FieldValue::Repeated(items)) => {
                node.children.extend(items.iter().map(reflect_record));
            }
            (FieldKind::Nested(_), FieldValue::Nested(None)) => {}
            (kind, value) => {
                tracing::debug!(field = field.name, ?kind, ?value, "skipping mismatched field value");
            }
        }
    }

    node
}
