use crate::compare::result::ComparisonResult;

/// Format a comparison result as JSON.
pub fn format_json(result: &ComparisonResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::format_json;
    use crate::compare::{compare, ComparisonOptions};
    use crate::parser::parse_str;

    #[test]
    fn differences_are_tagged_by_type() {
        let left = parse_str(r#"<a x="1"/>"#).expect("parse");
        let right = parse_str(r#"<a x="2"/>"#).expect("parse");
        let result = compare(&left, &right, &ComparisonOptions::default());

        let value: serde_json::Value =
            serde_json::from_str(&format_json(&result)).expect("valid json");
        assert_eq!(value["equivalent"], false);
        assert_eq!(value["differences"][0]["type"], "AttributeMismatch");
        assert_eq!(value["differences"][0]["left"]["value"], "1");
    }
}
