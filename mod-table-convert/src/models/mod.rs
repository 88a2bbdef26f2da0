//! Typed models for the supported game data files.
//!
//! Each model pairs a static [`RecordSchema`](xml_presence_core::RecordSchema) with a plain
//! struct. Required attributes are `String`; optional attributes and leaf elements keep their
//! [`PresenceState`]; optional containers are `Option<Vec<_>>` so that a missing container and
//! an empty one stay distinct.

pub mod action_types;
pub mod hard_coded_sounds;
pub mod module_strings;
pub mod skills;

use xml_presence_core::{PresenceState, ProjectError, Record, RecordSchema, TypedRecord};

pub use action_types::{Action, ActionTypes};
pub use hard_coded_sounds::{HardCodedSound, HardCodedSounds};
pub use module_strings::{ModuleString, ModuleStrings, StringTag};
pub use skills::{AttributeModifier, SkillData, Skills};

/// Present state for a required value.
fn present(value: &str) -> PresenceState {
    PresenceState::from_text(value)
}

/// Project every item of a repeated field.
fn items<T: TypedRecord>(record: &Record, name: &str) -> Result<Vec<T>, ProjectError> {
    record.repeated(name).iter().map(T::from_record).collect()
}

/// Project the items of an optional container element. `None` when the container is absent.
fn container<T: TypedRecord>(
    record: &Record,
    container: &str,
    item: &str,
) -> Result<Option<Vec<T>>, ProjectError> {
    record
        .nested(container)
        .map(|inner| items(inner, item))
        .transpose()
}

fn records<T: TypedRecord>(values: &[T]) -> Vec<Record> {
    values.iter().map(TypedRecord::to_record).collect()
}

/// Wrap items into their container record, keeping an absent container absent.
fn container_record<T: TypedRecord>(
    schema: &'static RecordSchema,
    item: &str,
    values: Option<&[T]>,
) -> Option<Record> {
    values.map(|values| Record::empty(schema).with_repeated(item, records(values)))
}
