use std::path::PathBuf;

use xml_presence_core::{parse, parse_file, parse_str, ParseError, PresenceState};

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn attribute_presence_is_tracked_per_element() {
    let node = parse_file(&fixture("fixtures/module_strings.xml")).expect("parse should succeed");
    assert_eq!(node.name, "base");
    assert_eq!(node.attribute("type"), PresenceState::from_text("string"));

    let strings = node.get_child("strings").expect("strings should exist");
    let items = strings.get_children("string");
    assert_eq!(items.len(), 3);
    assert_eq!(
        items[0].attribute("text"),
        PresenceState::PresentWithValue("Mount & Blade".to_string())
    );
    assert_eq!(items[1].attribute("text"), PresenceState::PresentEmpty);
    assert_eq!(items[2].attribute("text"), PresenceState::Absent);
}

#[test]
fn element_text_and_empty_leaf_elements() {
    let node = parse_file(&fixture("fixtures/skills.xml")).expect("parse should succeed");
    let skills = node.get_children("SkillData");
    assert_eq!(skills.len(), 3);

    assert_eq!(
        skills[0].child_presence("Documentation"),
        PresenceState::from_text("Increases hit points by 1%.")
    );
    assert_eq!(skills[1].child_presence("Documentation"), PresenceState::Absent);
    assert_eq!(skills[2].child_presence("Documentation"), PresenceState::PresentEmpty);
}

#[test]
fn present_empty_container_is_kept() {
    let node = parse_file(&fixture("fixtures/module_strings_empty_tags.xml")).expect("parse");
    let tags = node.get_child("tags").expect("tags should exist");
    assert!(tags.is_empty());
    assert!(node.get_child("strings").is_none());
}

#[test]
fn malformed_input_yields_no_tree() {
    for input in [
        "invalid xml content",
        "<a><b></a>",
        "<a>",
        "<a/><b/>",
        "<a>&unknown;</a>",
        "",
    ] {
        match parse_str(input) {
            Err(ParseError::Malformed { .. }) => {}
            other => panic!("{input:?} should be malformed, got {other:?}"),
        }
    }
}

#[test]
fn non_utf8_encodings_are_rejected() {
    let latin1 = br#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#;
    assert!(matches!(parse(latin1), Err(ParseError::Encoding(_))));

    let utf16_bom = [0xFF, 0xFE, b'<', 0, b'a', 0, b'/', 0, b'>', 0];
    assert!(matches!(parse(&utf16_bom), Err(ParseError::Encoding(_))));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = parse_file(&fixture("fixtures/does-not-exist.xml")).expect_err("must fail");
    assert!(matches!(err, ParseError::Io(_)));
}
