/// How a declared field is stored in XML.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// An attribute on the record element.
    Attribute,
    /// A child element whose text is the value.
    Element,
    /// A single child element projected as its own record.
    Nested(&'static RecordSchema),
    /// Zero or more child elements of the same name, in document order.
    Repeated(&'static RecordSchema),
}

/// One declared field of a record schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl {
    /// Attribute or element name.
    pub name: &'static str,
    pub kind: FieldKind,
    /// Projection fails when a required field is absent.
    pub required: bool,
    /// An empty table cell for this field means "absent" rather than "present but empty".
    pub nullable: bool,
}

impl FieldDecl {
    pub const fn attribute(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Attribute)
    }

    pub const fn element(name: &'static str) -> Self {
        Self::with_kind(name, FieldKind::Element)
    }

    /// A single nested record named after the schema's element.
    pub const fn nested(schema: &'static RecordSchema) -> Self {
        Self::with_kind(schema.name, FieldKind::Nested(schema))
    }

    /// A repeated record named after the schema's element.
    pub const fn repeated(schema: &'static RecordSchema) -> Self {
        Self::with_kind(schema.name, FieldKind::Repeated(schema))
    }

    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    const fn with_kind(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            nullable: false,
        }
    }

    /// Attributes and leaf elements hold a single presence-tracked value.
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, FieldKind::Attribute | FieldKind::Element)
    }
}

/// Declarative description of one XML record type: its element name and fields in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [FieldDecl],
}

impl RecordSchema {
    pub const fn new(name: &'static str, fields: &'static [FieldDecl]) -> Self {
        Self { name, fields }
    }

    /// Index of the first field with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// True when this schema or any nested record declares a repeated field.
    pub fn has_repetition(&self) -> bool {
        self.fields.iter().any(|field| match field.kind {
            FieldKind::Repeated(_) => true,
            FieldKind::Nested(schema) => schema.has_repetition(),
            FieldKind::Attribute | FieldKind::Element => false,
        })
    }
}
