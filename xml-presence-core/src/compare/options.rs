use serde::{Deserialize, Serialize};

/// How strictly two documents must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    /// Raw values verbatim; sibling order across different element names matters.
    Strict,
    /// Booleans by truth value, numbers within tolerance.
    #[default]
    Logical,
    /// Logical, plus case-insensitive text and empty attributes treated as missing.
    Loose,
}

/// Tolerance policy for one comparison. Built per call and never shared mutably.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonOptions {
    pub mode: ComparisonMode,
    pub ignore_comments: bool,
    /// Trim text before comparing. Whitespace-only text is always treated as absent.
    pub ignore_whitespace: bool,
    /// Compare attributes as an unordered set. When disabled the name order must match too.
    pub ignore_attribute_order: bool,
    /// Skip `xmlns` and `xmlns:*` attributes.
    pub ignore_namespace_declarations: bool,
    pub case_insensitive_booleans: bool,
    /// Maximum absolute difference between numeric values. `None` means exact.
    pub numeric_tolerance: Option<f64>,
    pub true_literals: Vec<String>,
    pub false_literals: Vec<String>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            mode: ComparisonMode::Logical,
            ignore_comments: true,
            ignore_whitespace: true,
            ignore_attribute_order: true,
            ignore_namespace_declarations: true,
            case_insensitive_booleans: true,
            numeric_tolerance: Some(0.0001),
            true_literals: to_strings(&["true", "1", "yes", "on"]),
            false_literals: to_strings(&["false", "0", "no", "off"]),
        }
    }
}

impl ComparisonOptions {
    /// Default options with a different mode.
    pub fn with_mode(mode: ComparisonMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn strict() -> Self {
        Self::with_mode(ComparisonMode::Strict)
    }

    pub fn logical() -> Self {
        Self::with_mode(ComparisonMode::Logical)
    }

    pub fn loose() -> Self {
        Self::with_mode(ComparisonMode::Loose)
    }

    /// Truth value of a literal, if it is one of the configured spellings.
    pub fn boolean_value(&self, raw: &str) -> Option<bool> {
        let raw = raw.trim();
        let matches = |literal: &String| {
            if self.case_insensitive_booleans {
                literal.eq_ignore_ascii_case(raw)
            } else {
                literal == raw
            }
        };
        if self.true_literals.iter().any(matches) {
            Some(true)
        } else if self.false_literals.iter().any(matches) {
            Some(false)
        } else {
            None
        }
    }

    /// Whether an attribute takes part in the comparison at all.
    pub fn is_significant_attribute(&self, name: &str) -> bool {
        !(self.ignore_namespace_declarations && (name == "xmlns" || name.starts_with("xmlns:")))
    }

    /// Whether two numbers are equal under the configured tolerance.
    pub fn numbers_equal(&self, left: f64, right: f64) -> bool {
        match self.numeric_tolerance {
            Some(epsilon) => (left - right).abs() <= epsilon,
            None => left == right,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::ComparisonOptions;

    #[test]
    fn boolean_literals_respect_case_flag() {
        let mut opts = ComparisonOptions::default();
        assert_eq!(opts.boolean_value("True"), Some(true));
        assert_eq!(opts.boolean_value("OFF"), Some(false));

        opts.case_insensitive_booleans = false;
        assert_eq!(opts.boolean_value("True"), None);
        assert_eq!(opts.boolean_value("true"), Some(true));
    }

    #[test]
    fn tolerance_bounds_numeric_equality() {
        let opts = ComparisonOptions::default();
        assert!(opts.numbers_equal(1.0, 1.00005));
        assert!(!opts.numbers_equal(1.0, 1.001));

        let exact = ComparisonOptions {
            numeric_tolerance: None,
            ..ComparisonOptions::default()
        };
        assert!(!exact.numbers_equal(1.0, 1.00005));
    }
}
