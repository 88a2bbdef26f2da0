//! `hard_coded_sounds.xml`: sound event paths under a `base type="hard_coded_sound"` root.

use xml_presence_core::{FieldDecl, PresenceState, ProjectError, Record, RecordSchema, TypedRecord};

use super::{container, container_record, present};

pub static HARD_CODED_SOUND: RecordSchema = RecordSchema::new(
    "hard_coded_sound",
    &[
        FieldDecl::attribute("id").required(),
        FieldDecl::attribute("path"),
    ],
);

pub static SOUND_LIST: RecordSchema =
    RecordSchema::new("hard_coded_sounds", &[FieldDecl::repeated(&HARD_CODED_SOUND)]);

pub static HARD_CODED_SOUNDS: RecordSchema = RecordSchema::new(
    "base",
    &[
        FieldDecl::attribute("type").required(),
        FieldDecl::nested(&SOUND_LIST).nullable(),
    ],
);

#[derive(Debug, Clone, PartialEq)]
pub struct HardCodedSound {
    pub id: String,
    pub path: PresenceState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HardCodedSounds {
    pub base_type: String,
    pub sounds: Option<Vec<HardCodedSound>>,
}

impl TypedRecord for HardCodedSound {
    fn schema() -> &'static RecordSchema {
        &HARD_CODED_SOUND
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            id: record.required_text("id")?,
            path: record.scalar("path"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&HARD_CODED_SOUND)
            .with_scalar("id", present(&self.id))
            .with_scalar("path", self.path.clone())
    }
}

impl TypedRecord for HardCodedSounds {
    fn schema() -> &'static RecordSchema {
        &HARD_CODED_SOUNDS
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            base_type: record.required_text("type")?,
            sounds: container(record, "hard_coded_sounds", "hard_coded_sound")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&HARD_CODED_SOUNDS)
            .with_scalar("type", present(&self.base_type))
            .with_nested(
                "hard_coded_sounds",
                container_record(&SOUND_LIST, "hard_coded_sound", self.sounds.as_deref()),
            )
    }
}
