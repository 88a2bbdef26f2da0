use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::Serialize;

use crate::presence::PresenceState;

/// A parsed XML element that remembers which attributes were written and how.
///
/// Attributes keep their source order. An attribute written as `name=""` is stored as
/// [`PresenceState::PresentEmpty`]; attributes that were not written are simply missing from
/// the map, which [`ElementNode::attribute`] reports as [`PresenceState::Absent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    /// Element name, including any namespace prefix.
    pub name: String,
    /// Attributes in source order.
    pub attributes: IndexMap<String, PresenceState>,
    /// Child elements in source order.
    pub children: Vec<ElementNode>,
    /// Non-whitespace text content, concatenated across text and CDATA runs.
    pub text: Option<String>,
    /// Comments written directly inside this element.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

impl ElementNode {
    /// Create an element with no attributes, children, text or comments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: None,
            comments: Vec::new(),
        }
    }

    /// Builder-style attribute setter. `Absent` states are not stored.
    pub fn with_attribute(mut self, name: impl Into<String>, state: PresenceState) -> Self {
        self.set_attribute(name, state);
        self
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style text setter. Empty text leaves the element empty.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// Insert or remove an attribute according to its presence.
    pub fn set_attribute(&mut self, name: impl Into<String>, state: PresenceState) {
        let name = name.into();
        if state.is_absent() {
            self.attributes.shift_remove(&name);
        } else {
            self.attributes.insert(name, state);
        }
    }

    /// Presence of an attribute; missing attributes are `Absent`.
    pub fn attribute(&self, name: &str) -> PresenceState {
        self.attributes
            .get(name)
            .cloned()
            .unwrap_or(PresenceState::Absent)
    }

    /// Presence of this element's own content as seen by its parent.
    pub fn presence(&self) -> PresenceState {
        match &self.text {
            Some(text) => PresenceState::from_text(text.as_str()),
            None => PresenceState::PresentEmpty,
        }
    }

    /// True when the element has no attributes, children or text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_none()
    }

    /// Return the first child with the provided name.
    pub fn get_child(&self, name: &str) -> Option<&ElementNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Return all children with the provided name.
    pub fn get_children(&self, name: &str) -> Vec<&ElementNode> {
        self.children
            .iter()
            .filter(|child| child.name == name)
            .collect()
    }

    /// Presence of a child element: `Absent` when missing, otherwise its content presence.
    pub fn child_presence(&self, name: &str) -> PresenceState {
        self.get_child(name)
            .map(ElementNode::presence)
            .unwrap_or(PresenceState::Absent)
    }

    /// Walk a nested child path and return terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        current.text.as_deref()
    }

    /// Total number of elements in this subtree, including `self`.
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ElementNode::element_count)
            .sum::<usize>()
    }
}

impl Display for ElementNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::writer::emit_compact(self))
    }
}
