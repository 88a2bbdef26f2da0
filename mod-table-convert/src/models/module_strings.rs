//! `module_strings.xml`: localisable strings under a `base type="string"` root.

use xml_presence_core::{FieldDecl, PresenceState, ProjectError, Record, RecordSchema, TypedRecord};

use super::{container, container_record, present};

pub static TAG: RecordSchema = RecordSchema::new("tag", &[FieldDecl::attribute("language")]);

pub static TAGS: RecordSchema = RecordSchema::new("tags", &[FieldDecl::repeated(&TAG)]);

pub static STRING: RecordSchema = RecordSchema::new(
    "string",
    &[
        FieldDecl::attribute("id").required(),
        FieldDecl::attribute("text"),
    ],
);

pub static STRINGS: RecordSchema = RecordSchema::new("strings", &[FieldDecl::repeated(&STRING)]);

pub static MODULE_STRINGS: RecordSchema = RecordSchema::new(
    "base",
    &[
        FieldDecl::attribute("type").required(),
        FieldDecl::nested(&TAGS).nullable(),
        FieldDecl::nested(&STRINGS).nullable(),
    ],
);

#[derive(Debug, Clone, PartialEq)]
pub struct StringTag {
    pub language: PresenceState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleString {
    pub id: String,
    pub text: PresenceState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleStrings {
    /// Root discriminator, `string` for this file type.
    pub base_type: String,
    pub tags: Option<Vec<StringTag>>,
    pub strings: Option<Vec<ModuleString>>,
}

impl TypedRecord for StringTag {
    fn schema() -> &'static RecordSchema {
        &TAG
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            language: record.scalar("language"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&TAG).with_scalar("language", self.language.clone())
    }
}

impl TypedRecord for ModuleString {
    fn schema() -> &'static RecordSchema {
        &STRING
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            id: record.required_text("id")?,
            text: record.scalar("text"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&STRING)
            .with_scalar("id", present(&self.id))
            .with_scalar("text", self.text.clone())
    }
}

impl TypedRecord for ModuleStrings {
    fn schema() -> &'static RecordSchema {
        &MODULE_STRINGS
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            base_type: record.required_text("type")?,
            tags: container(record, "tags", "tag")?,
            strings: container(record, "strings", "string")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&MODULE_STRINGS)
            .with_scalar("type", present(&self.base_type))
            .with_nested("tags", container_record(&TAGS, "tag", self.tags.as_deref()))
            .with_nested(
                "strings",
                container_record(&STRINGS, "string", self.strings.as_deref()),
            )
    }
}
