use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::presence::PresenceState;
use crate::tree::ElementNode;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const ACCEPTED_ENCODINGS: &[&str] = &["utf-8", "utf8", "us-ascii", "ascii"];

/// Errors that can occur while parsing XML into an [`ElementNode`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input is not well-formed XML. No partial tree is ever returned.
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },
    /// Declared or detected encoding cannot be honoured.
    #[error("unsupported XML encoding: {0}")]
    Encoding(String),
    /// Failed to read input file.
    #[error("failed to read XML file: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }
}

/// Parse XML bytes into an [`ElementNode`] tree.
///
/// Whitespace-only text is dropped, CDATA is merged into text, and comments are kept on the
/// element that contains them. Declarations, processing instructions and DOCTYPE are not kept.
pub fn parse(xml: &[u8]) -> Result<ElementNode, ParseError> {
    let xml = check_encoding(xml)?;
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<ElementNode> = Vec::new();
    let mut root: Option<ElementNode> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|err| ParseError::malformed(position, err.to_string()))?;

        match event {
            Event::Start(e) => {
                let node = build_node_start(&e, &reader, position)?;
                stack.push(node);
            }
            Event::Empty(e) => {
                let node = build_node_start(&e, &reader, position)?;
                attach(node, &mut stack, &mut root, position)?;
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|err| ParseError::malformed(position, err.to_string()))?;
                push_text(&mut stack, &text, position)?;
            }
            Event::CData(e) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|err| ParseError::Encoding(err.to_string()))?;
                push_text(&mut stack, text, position)?;
            }
            Event::Comment(e) => {
                let comment = std::str::from_utf8(&e)
                    .map_err(|err| ParseError::Encoding(err.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.comments.push(comment.to_string()),
                    None => tracing::debug!(comment, "dropping comment outside the root element"),
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    ParseError::malformed(position, "encountered closing tag without open tag")
                })?;
                attach(node, &mut stack, &mut root, position)?;
            }
            Event::Decl(e) => check_declared_encoding(&e, position)?,
            Event::Eof => break,
            Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(ParseError::malformed(
            reader.buffer_position() as u64,
            format!("unclosed element <{}> at end of document", open.name),
        ));
    }

    root.ok_or_else(|| ParseError::malformed(0, "no root element found"))
}

/// Parse an XML string into an [`ElementNode`] tree.
pub fn parse_str(xml: &str) -> Result<ElementNode, ParseError> {
    parse(xml.as_bytes())
}

/// Parse an XML file into an [`ElementNode`] tree.
pub fn parse_file(path: &Path) -> Result<ElementNode, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

fn check_encoding(xml: &[u8]) -> Result<&[u8], ParseError> {
    if xml.starts_with(b"\xFF\xFE") || xml.starts_with(b"\xFE\xFF") {
        return Err(ParseError::Encoding(
            "UTF-16 byte order mark found; only UTF-8 input is supported".to_string(),
        ));
    }
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);
    std::str::from_utf8(xml).map_err(|err| {
        ParseError::Encoding(format!(
            "input is not valid UTF-8 (first invalid byte at {})",
            err.valid_up_to()
        ))
    })?;
    Ok(xml)
}

fn check_declared_encoding(decl: &BytesDecl<'_>, position: u64) -> Result<(), ParseError> {
    let Some(encoding) = decl.encoding() else {
        return Ok(());
    };
    let encoding = encoding.map_err(|err| ParseError::malformed(position, err.to_string()))?;
    let label = String::from_utf8_lossy(&encoding).trim().to_ascii_lowercase();
    if ACCEPTED_ENCODINGS.contains(&label.as_str()) {
        Ok(())
    } else {
        Err(ParseError::Encoding(format!(
            "declared encoding '{label}' cannot be honoured"
        )))
    }
}

fn attach(
    node: ElementNode,
    stack: &mut [ElementNode],
    root: &mut Option<ElementNode>,
    position: u64,
) -> Result<(), ParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(ParseError::malformed(
            position,
            "multiple top-level elements found",
        ))
    }
}

fn push_text(stack: &mut [ElementNode], text: &str, position: u64) -> Result<(), ParseError> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let Some(current) = stack.last_mut() else {
        return Err(ParseError::malformed(
            position,
            "text content outside the root element",
        ));
    };
    match &mut current.text {
        Some(existing) => existing.push_str(text),
        None => current.text = Some(text.to_string()),
    }
    Ok(())
}

fn build_node_start(
    e: &BytesStart<'_>,
    reader: &Reader<&[u8]>,
    position: u64,
) -> Result<ElementNode, ParseError> {
    let name = qname_to_string(e.name())?;
    let mut node = ElementNode::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(|err| ParseError::malformed(position, err.to_string()))?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|err| ParseError::malformed(position, err.to_string()))?;
        node.attributes
            .insert(key, PresenceState::from_text(value.into_owned()));
    }

    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseError> {
    std::str::from_utf8(name.as_ref())
        .map(ToString::to_string)
        .map_err(|err| ParseError::Encoding(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{parse, parse_str, ParseError};
    use crate::presence::PresenceState;

    #[test]
    fn empty_attribute_is_present_empty() {
        let node = parse_str(r#"<a x="" y="1"/>"#).expect("parse");
        assert_eq!(node.attribute("x"), PresenceState::PresentEmpty);
        assert_eq!(
            node.attribute("y"),
            PresenceState::PresentWithValue("1".to_string())
        );
        assert_eq!(node.attribute("z"), PresenceState::Absent);
    }

    #[test]
    fn plain_text_is_malformed() {
        let err = parse_str("invalid xml content").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed { .. }), "{err}");
    }

    #[test]
    fn mismatched_end_tag_is_malformed() {
        let err = parse_str("<a><b></a>").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed { .. }), "{err}");
    }

    #[test]
    fn unclosed_element_is_malformed() {
        let err = parse_str("<a><b/>").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed { .. }), "{err}");
    }

    #[test]
    fn bare_ampersand_is_malformed() {
        let err = parse_str("<a>fish & chips</a>").expect_err("must fail");
        assert!(matches!(err, ParseError::Malformed { .. }), "{err}");
    }

    #[test]
    fn declared_latin1_is_an_encoding_error() {
        let err = parse_str(r#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#)
            .expect_err("must fail");
        assert!(matches!(err, ParseError::Encoding(_)), "{err}");
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = parse(b"<a>\xC3\x28</a>").expect_err("must fail");
        assert!(matches!(err, ParseError::Encoding(_)), "{err}");
    }

    #[test]
    fn utf8_bom_and_declaration_are_accepted() {
        let node = parse(b"\xEF\xBB\xBF<?xml version=\"1.0\" encoding=\"utf-8\"?><a/>")
            .expect("parse");
        assert_eq!(node.name, "a");
    }

    #[test]
    fn comments_are_kept_on_enclosing_element() {
        let node = parse_str("<a><!-- note --><b/></a>").expect("parse");
        assert_eq!(node.comments, vec![" note ".to_string()]);
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn cdata_and_entities_merge_into_text() {
        let node = parse_str("<a>x &amp; <![CDATA[<y>]]></a>").expect("parse");
        assert_eq!(node.text.as_deref(), Some("x & <y>"));
    }
}
