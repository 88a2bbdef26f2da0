use std::fs;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::ElementNode;

const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

/// Errors that can occur while writing XML from an [`ElementNode`] tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize XML bytes.
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Failed to write output file.
    #[error("failed to write XML file: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize an [`ElementNode`] tree into indented XML bytes.
pub fn write(node: &ElementNode) -> Result<Vec<u8>, WriteError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    write_node(&mut writer, node)?;
    Ok(writer.into_inner())
}

/// Serialize an [`ElementNode`] tree into indented XML text.
///
/// Absent attributes are never written; present-empty attributes are written as `name=""` and
/// childless, textless elements as `<name/>`. Elements carrying text are written on one line so
/// their text survives re-parsing unchanged.
pub fn emit(node: &ElementNode) -> String {
    into_text(write(node))
}

/// Serialize a tree with an XML declaration and trailing newline.
pub fn emit_document(node: &ElementNode) -> String {
    format!("{DECLARATION}\n{}\n", emit(node))
}

/// Serialize a tree without any indentation.
pub fn emit_compact(node: &ElementNode) -> String {
    let mut writer = Writer::new(Vec::new());
    into_text(write_node(&mut writer, node).map(|()| writer.into_inner()))
}

/// Serialize a tree as a document and write it to `path`.
pub fn write_file(node: &ElementNode, path: &Path) -> Result<(), WriteError> {
    fs::write(path, emit_document(node))?;
    Ok(())
}

fn into_text(bytes: Result<Vec<u8>, impl Into<WriteError>>) -> String {
    match bytes.map_err(Into::into) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        // The sink is a Vec, which never reports I/O errors.
        Err(err) => unreachable!("in-memory XML write failed: {err}"),
    }
}

fn start_tag(node: &ElementNode) -> BytesStart<'_> {
    let mut start = BytesStart::new(node.name.as_str());
    for (name, state) in &node.attributes {
        if let Some(value) = state.text() {
            start.push_attribute((name.as_str(), value));
        }
    }
    start
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &ElementNode) -> Result<(), quick_xml::Error> {
    let start = start_tag(node);
    if node.children.is_empty() && node.comments.is_empty() && node.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if node.text.is_some() {
        // Keeps the closing tag on the same line as the content.
        writer.write_event(Event::Text(BytesText::new("")))?;
        let mut inline = Writer::new(Vec::new());
        write_content(&mut inline, node)?;
        writer.get_mut().extend_from_slice(&inline.into_inner());
    } else {
        write_content(writer, node)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.name.as_str())))?;
    Ok(())
}

fn write_content(writer: &mut Writer<Vec<u8>>, node: &ElementNode) -> Result<(), quick_xml::Error> {
    for comment in &node.comments {
        writer.write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))?;
    }
    if let Some(text) = &node.text {
        writer.write_event(Event::Text(BytesText::new(text.as_str())))?;
    }
    for child in &node.children {
        write_node(writer, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{emit, emit_compact};
    use crate::parser::parse_str;
    use crate::presence::PresenceState;
    use crate::tree::ElementNode;

    #[test]
    fn absent_attributes_are_not_written() {
        let mut node = ElementNode::new("a").with_attribute("x", PresenceState::PresentEmpty);
        node.attributes.insert("y".to_string(), PresenceState::Absent);
        assert_eq!(emit(&node), r#"<a x=""/>"#);
    }

    #[test]
    fn text_is_escaped_and_kept_inline() {
        let node = ElementNode::new("a").with_text("1 < 2 & 3");
        assert_eq!(emit(&node), "<a>1 &lt; 2 &amp; 3</a>");
    }

    #[test]
    fn nested_elements_are_indented() {
        let node = parse_str(r#"<base type="string"><tags></tags></base>"#).expect("parse");
        assert_eq!(emit(&node), "<base type=\"string\">\n  <tags/>\n</base>");
    }

    #[test]
    fn compact_output_reparses_to_same_tree() {
        let source = parse_str(r#"<a k="v"><!--c--><b>t</b><c/></a>"#).expect("parse");
        let again = parse_str(&emit_compact(&source)).expect("reparse");
        assert_eq!(source, again);
    }

    #[test]
    fn comments_and_text_survive_indented_output() {
        let source =
            parse_str(r#"<a k="1 &amp; 2"><!-- note --><b>t<c/></b><d/></a>"#).expect("parse");
        let output = emit(&source);
        assert!(output.contains("<b>t<c/></b>"), "{output}");
        assert_eq!(parse_str(&output).expect("reparse"), source);
    }
}
