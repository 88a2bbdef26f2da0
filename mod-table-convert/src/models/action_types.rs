//! `action_types.xml`: a flat list of action definitions.

use xml_presence_core::{FieldDecl, PresenceState, ProjectError, Record, RecordSchema, TypedRecord};

use super::{items, present, records};

pub static ACTION: RecordSchema = RecordSchema::new(
    "action",
    &[
        FieldDecl::attribute("name").required(),
        FieldDecl::attribute("type"),
        FieldDecl::attribute("usage_direction"),
        FieldDecl::attribute("action_stage"),
    ],
);

pub static ACTION_TYPES: RecordSchema =
    RecordSchema::new("action_types", &[FieldDecl::repeated(&ACTION)]);

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub name: String,
    pub action_type: PresenceState,
    pub usage_direction: PresenceState,
    pub action_stage: PresenceState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionTypes {
    pub actions: Vec<Action>,
}

impl TypedRecord for Action {
    fn schema() -> &'static RecordSchema {
        &ACTION
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            name: record.required_text("name")?,
            action_type: record.scalar("type"),
            usage_direction: record.scalar("usage_direction"),
            action_stage: record.scalar("action_stage"),
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&ACTION)
            .with_scalar("name", present(&self.name))
            .with_scalar("type", self.action_type.clone())
            .with_scalar("usage_direction", self.usage_direction.clone())
            .with_scalar("action_stage", self.action_stage.clone())
    }
}

impl TypedRecord for ActionTypes {
    fn schema() -> &'static RecordSchema {
        &ACTION_TYPES
    }

    fn from_record(record: &Record) -> Result<Self, ProjectError> {
        Ok(Self {
            actions: items(record, "action")?,
        })
    }

    fn to_record(&self) -> Record {
        Record::empty(&ACTION_TYPES).with_repeated("action", records(&self.actions))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_presence_core::{parse_str, project, reflect, PresenceState};

    use super::ActionTypes;

    #[test]
    fn optional_attributes_keep_their_presence() {
        let xml = r#"<action_types><action name="a"/><action name="b" type=""/><action name="c" type="t"/></action_types>"#;
        let node = parse_str(xml).expect("parse");
        let model: ActionTypes = project(&node).expect("project");

        let kinds: Vec<_> = model.actions.iter().map(|a| a.action_type.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                PresenceState::Absent,
                PresenceState::PresentEmpty,
                PresenceState::from_text("t")
            ]
        );
        assert_eq!(reflect(&model), node);
    }
}
