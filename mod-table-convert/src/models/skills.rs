//! `skills.xml`: serialized skill data with attribute modifiers.

use xml_presence_core::{FieldDecl, PresenceState, ProjectError, Record, RecordSchema, TypedRecord};

use super::{container, container_record, items, present, records};

pub static ATTRIBUTE_MODIFIER: RecordSchema = RecordSchema::new(
    "AttributeModifier",
    &[
        FieldDecl::attribute("AttribCode"),
        FieldDecl::attribute("Modification"),
        FieldDecl::attribute("Value"),
    ],
);

pub static MODIFIERS: RecordSchema =
    RecordSchema::new("Modifiers", &[FieldDecl::repeated(&ATTRIBUTE_MODIFIER)]);

pub static SKILL_DATA: RecordSchema = RecordSchema::new(
    "SkillData",
    &[
        FieldDecl::attribute("id").required(),
        FieldDecl::attribute("Name"),
        FieldDecl::nested(&MODIFIERS).nullable(),
        FieldDecl::element("Documentation"),
    ],
);

pub static SKILLS: RecordSchema =
    RecordSchema::new("ArrayOfSkillData", &[FieldDecl::repeated(&SKILL_DATA)]);

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeModifier {
    pub attrib_code: PresenceState,
    pub modification: PresenceState,
    pub value: PresenceState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillData {
    pub id: String,
    pub name: PresenceState,
    pub modifiers: Option<Vec<AttributeModifier>>,
    pub documentation: PresenceState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skills {
    pub skills: Vec<SkillData>,
}

impl TypedRecord for AttributeModifier {
    fn schema() -> &'static RecordSchema {
        &ATTRIBUTE_MODIFIER
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            attrib_code: record.scalar("AttribCode"),
            modification: record.scalar("Modification"),
            value: record.scalar("Value"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&ATTRIBUTE_MODIFIER)
            .with_scalar("AttribCode", self.attrib_code.clone())
            .with_scalar("Modification", self.modification.clone())
            .with_scalar("Value", self.value.clone())
    }
}

impl TypedRecord for SkillData {
    fn schema() -> &'static RecordSchema {
        &SKILL_DATA
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            id: record.required_text("id")?,
            name: record.scalar("Name"),
            modifiers: container(record, "Modifiers", "AttributeModifier")?,
            documentation: record.scalar("Documentation"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&SKILL_DATA)
            .with_scalar("id", present(&self.id))
            .with_scalar("Name", self.name.clone())
            .with_nested(
                "Modifiers",
                container_record(&MODIFIERS, "AttributeModifier", self.modifiers.as_deref()),
            )
            .with_scalar("Documentation", self.documentation.clone())
    }
}

impl TypedRecord for Skills {
    fn schema() -> &'static RecordSchema {
        &SKILLS
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            skills: items(record, "SkillData")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&SKILLS).with_repeated("SkillData", records(&self.skills))
    }
}
