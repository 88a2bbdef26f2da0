use crate::presence::PresenceState;
use crate::projection::engine::ProjectError;
use crate::projection::schema::{FieldKind, RecordSchema};

/// Value of one declared field inside a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Attribute or leaf element.
    Scalar(PresenceState),
    /// Optional nested record; `None` means the element was absent.
    Nested(Option<Record>),
    /// Repeated records in document order.
    Repeated(Vec<Record>),
}

impl FieldValue {
    fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Attribute | FieldKind::Element => Self::Scalar(PresenceState::Absent),
            FieldKind::Nested(_) => Self::Nested(None),
            FieldKind::Repeated(_) => Self::Repeated(Vec::new()),
        }
    }

    /// Absent scalars and missing nested records.
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Scalar(state) => state.is_absent(),
            Self::Nested(record) => record.is_none(),
            Self::Repeated(_) => false,
        }
    }
}

/// Schema-driven record: one [`FieldValue`] per declared field, in schema order.
///
/// This is the untyped middle of the projection layer. Typed models convert to and from it,
/// and the tabular transcoder flattens it.
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static RecordSchema,
    values: Vec<FieldValue>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.values == other.values
    }
}

impl Record {
    /// A record with every field absent (or empty, for repeated fields).
    pub fn empty(schema: &'static RecordSchema) -> Self {
        let values = schema
            .fields
            .iter()
            .map(|field| FieldValue::empty_for(field.kind))
            .collect();
        Self { schema, values }
    }

    pub(crate) fn from_values(schema: &'static RecordSchema, values: Vec<FieldValue>) -> Self {
        Self { schema, values }
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    /// Field values aligned with `schema().fields`.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema
            .position(name)
            .and_then(|index| self.values.get(index))
    }

    /// Presence of a scalar field. Unknown or non-scalar fields read as `Absent`.
    pub fn scalar(&self, name: &str) -> PresenceState {
        match self.get(name) {
            Some(FieldValue::Scalar(state)) => state.clone(),
            _ => PresenceState::Absent,
        }
    }

    /// Text of a required scalar field, failing when it is absent.
    pub fn required_text(&self, name: &str) -> Result<String, ProjectError> {
        self.scalar(name)
            .text()
            .map(ToString::to_string)
            .ok_or_else(|| ProjectError::MissingField {
                path: format!("{}.{name}", self.schema.name),
            })
    }

    pub fn nested(&self, name: &str) -> Option<&Record> {
        match self.get(name) {
            Some(FieldValue::Nested(record)) => record.as_ref(),
            _ => None,
        }
    }

    pub fn repeated(&self, name: &str) -> &[Record] {
        match self.get(name) {
            Some(FieldValue::Repeated(items)) => items,
            _ => &[],
        }
    }

    /// Replace a field value. The value kind must match the declared field.
    ///
    /// # Panics
    ///
    /// Panics when `name` is not a field of the schema.
    pub fn set(&mut self, name: &str, value: FieldValue) -> &mut Self {
        let Some(index) = self.schema.position(name) else {
            panic!("<{}> has no field '{name}'", self.schema.name);
        };
        self.values[index] = value;
        self
    }

    pub fn with_scalar(mut self, name: &str, state: PresenceState) -> Self {
        self.set(name, FieldValue::Scalar(state));
        self
    }

    pub fn with_nested(mut self, name: &str, record: Option<Record>) -> Self {
        self.set(name, FieldValue::Nested(record));
        self
    }

    pub fn with_repeated(mut self, name: &str, items: Vec<Record>) -> Self {
        self.set(name, FieldValue::Repeated(items));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, Record};
    use crate::presence::PresenceState;
    use crate::projection::schema::{FieldDecl, RecordSchema};

    static ACTION: RecordSchema = RecordSchema::new(
        "action",
        &[
            FieldDecl::attribute("name").required(),
            FieldDecl::attribute("type"),
        ],
    );

    #[test]
    fn empty_record_reads_absent() {
        let record = Record::empty(&ACTION);
        assert_eq!(record.scalar("type"), PresenceState::Absent);
        assert!(record.required_text("name").is_err());
        assert!(record.values().iter().all(FieldValue::is_absent));
    }

    #[test]
    fn builder_sets_declared_fields() {
        let record = Record::empty(&ACTION)
            .with_scalar("name", PresenceState::from_text("act_jump"))
            .with_scalar("type", PresenceState::PresentEmpty);
        assert_eq!(record.required_text("name").as_deref(), Ok("act_jump"));
        assert_eq!(record.scalar("type"), PresenceState::PresentEmpty);
    }

    #[test]
    #[should_panic(expected = "<action> has no field 'nmae'")]
    fn setting_an_undeclared_field_panics() {
        let _ = Record::empty(&ACTION).with_scalar("nmae", PresenceState::from_text("a"));
    }
}
