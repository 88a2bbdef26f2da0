use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// Whether an optional XML construct was absent, present but empty, or present with a value.
///
/// `<tags/>` and `<tags></tags>` are both [`PresenceState::PresentEmpty`]; a document with no
/// `tags` element at all is [`PresenceState::Absent`]. The two must never be conflated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "state", content = "value")]
pub enum PresenceState {
    #[default]
    Absent,
    PresentEmpty,
    PresentWithValue(String),
}

impl PresenceState {
    /// Build a present state from raw text: empty text is [`PresenceState::PresentEmpty`].
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Self::PresentEmpty
        } else {
            Self::PresentWithValue(text)
        }
    }

    /// Build a state from an optional value; `None` is [`PresenceState::Absent`].
    pub fn from_option(value: Option<&str>) -> Self {
        match value {
            Some(text) => Self::from_text(text),
            None => Self::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Text of a present construct. `PresentEmpty` yields `Some("")`.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Absent => None,
            Self::PresentEmpty => Some(""),
            Self::PresentWithValue(value) => Some(value),
        }
    }

    /// Non-empty value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::PresentWithValue(value) => Some(value),
            _ => None,
        }
    }
}

impl Display for PresenceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "<absent>"),
            Self::PresentEmpty => write!(f, "\"\""),
            Self::PresentWithValue(value) => write!(f, "{value:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PresenceState;

    #[test]
    fn from_text_distinguishes_empty_from_value() {
        assert_eq!(PresenceState::from_text(""), PresenceState::PresentEmpty);
        assert_eq!(
            PresenceState::from_text("x"),
            PresenceState::PresentWithValue("x".to_string())
        );
        assert_eq!(PresenceState::from_option(None), PresenceState::Absent);
    }

    #[test]
    fn text_reports_empty_string_for_present_empty() {
        assert_eq!(PresenceState::PresentEmpty.text(), Some(""));
        assert_eq!(PresenceState::Absent.text(), None);
        assert_eq!(PresenceState::PresentEmpty.value(), None);
    }
}
