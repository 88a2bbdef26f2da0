use std::borrow::Cow;

use crate::compare::options::{ComparisonMode, ComparisonOptions};
use crate::compare::result::{ComparisonResult, Difference};
use crate::parser::{parse, ParseError};
use crate::presence::PresenceState;
use crate::tree::ElementNode;

/// Parse two documents and compare them structurally.
pub fn compare_documents(
    left: &[u8],
    right: &[u8],
    opts: &ComparisonOptions,
) -> Result<ComparisonResult, ParseError> {
    let left = parse(left)?;
    let right = parse(right)?;
    Ok(compare(&left, &right, opts))
}

/// Compare two trees under the given tolerance policy.
///
/// Same-name siblings pair up by position. The relation is symmetric: swapping the inputs
/// mirrors every difference without changing `equivalent`.
pub fn compare(left: &ElementNode, right: &ElementNode, opts: &ComparisonOptions) -> ComparisonResult {
    let mut out = Vec::new();
    compare_node(left, right, &left.name, opts, &mut out);
    tracing::debug!(
        root = %left.name,
        mode = ?opts.mode,
        differences = out.len(),
        "compared documents"
    );
    ComparisonResult::from_differences(out)
}

fn compare_node(
    left: &ElementNode,
    right: &ElementNode,
    path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    if left.name != right.name {
        out.push(Difference::NameMismatch {
            path: path.to_string(),
            left: left.name.clone(),
            right: right.name.clone(),
        });
        return;
    }

    compare_attributes(left, right, path, opts, out);
    compare_text(left, right, path, opts, out);
    if !opts.ignore_comments {
        compare_comments(left, right, path, opts, out);
    }
    compare_children(left, right, path, opts, out);
}

fn compare_attributes(
    left: &ElementNode,
    right: &ElementNode,
    path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    let left_names = significant_attributes(left, opts);
    let right_names = significant_attributes(right, opts);

    let mut names: Vec<&str> = left_names.clone();
    for name in &right_names {
        if !names.contains(name) {
            names.push(name);
        }
    }

    let mut mismatched = false;
    for name in names {
        let l = significant_attribute(left, name, opts);
        let r = significant_attribute(right, name, opts);
        let same = match (l.text(), r.text()) {
            (None, None) => true,
            (Some(a), Some(b)) => values_equal(a, b, opts),
            _ => false,
        };
        if !same {
            mismatched = true;
            out.push(Difference::AttributeMismatch {
                path: path.to_string(),
                name: name.to_string(),
                left: l,
                right: r,
            });
        }
    }

    if !opts.ignore_attribute_order && !mismatched && left_names != right_names {
        out.push(Difference::AttributeOrder {
            path: path.to_string(),
            left: left_names.iter().map(ToString::to_string).collect(),
            right: right_names.iter().map(ToString::to_string).collect(),
        });
    }
}

fn significant_attributes<'a>(node: &'a ElementNode, opts: &ComparisonOptions) -> Vec<&'a str> {
    node.attributes
        .iter()
        .filter(|(name, _)| opts.is_significant_attribute(name))
        .filter(|(_, state)| opts.mode != ComparisonMode::Loose || state.value().is_some())
        .map(|(name, _)| name.as_str())
        .collect()
}

fn significant_attribute(node: &ElementNode, name: &str, opts: &ComparisonOptions) -> PresenceState {
    match node.attribute(name) {
        PresenceState::PresentEmpty if opts.mode == ComparisonMode::Loose => PresenceState::Absent,
        state => state,
    }
}

fn compare_text(
    left: &ElementNode,
    right: &ElementNode,
    path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    let l = normalize_text(left.text.as_deref(), opts);
    let r = normalize_text(right.text.as_deref(), opts);
    let same = match (&l, &r) {
        (None, None) => true,
        (Some(a), Some(b)) => values_equal(a, b, opts),
        _ => false,
    };
    if !same {
        out.push(Difference::TextMismatch {
            path: path.to_string(),
            left: left.text.clone(),
            right: right.text.clone(),
        });
    }
}

fn compare_comments(
    left: &ElementNode,
    right: &ElementNode,
    path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    let normalize = |comments: &[String]| -> Vec<String> {
        comments
            .iter()
            .map(|c| {
                if opts.ignore_whitespace {
                    c.trim().to_string()
                } else {
                    c.clone()
                }
            })
            .collect()
    };
    let l = normalize(&left.comments);
    let r = normalize(&right.comments);
    if l != r {
        out.push(Difference::CommentMismatch {
            path: path.to_string(),
            left: l,
            right: r,
        });
    }
}

fn compare_children(
    left: &ElementNode,
    right: &ElementNode,
    path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    let mut names: Vec<&str> = Vec::new();
    for child in left.children.iter().chain(&right.children) {
        if !names.contains(&child.name.as_str()) {
            names.push(&child.name);
        }
    }

    let mut counts_match = true;
    for name in names {
        let left_nodes = left.get_children(name);
        let right_nodes = right.get_children(name);
        counts_match &= left_nodes.len() == right_nodes.len();
        match_by_index(name, &left_nodes, &right_nodes, path, opts, out);
    }

    if opts.mode == ComparisonMode::Strict && counts_match {
        let left_order: Vec<&str> = left.children.iter().map(|c| c.name.as_str()).collect();
        let right_order: Vec<&str> = right.children.iter().map(|c| c.name.as_str()).collect();
        if left_order != right_order {
            out.push(Difference::ChildOrder {
                path: path.to_string(),
                left: left_order.iter().map(ToString::to_string).collect(),
                right: right_order.iter().map(ToString::to_string).collect(),
            });
        }
    }
}

fn match_by_index(
    name: &str,
    left_nodes: &[&ElementNode],
    right_nodes: &[&ElementNode],
    parent_path: &str,
    opts: &ComparisonOptions,
    out: &mut Vec<Difference>,
) {
    let max = left_nodes.len().max(right_nodes.len());
    for i in 0..max {
        let child_path = format!("{parent_path}.{name}[{}]", i + 1);
        match (left_nodes.get(i), right_nodes.get(i)) {
            (Some(l), Some(r)) => compare_node(l, r, &child_path, opts, out),
            (Some(l), None) => out.push(Difference::OnlyLeft {
                path: child_path,
                node: (*l).clone(),
            }),
            (None, Some(r)) => out.push(Difference::OnlyRight {
                path: child_path,
                node: (*r).clone(),
            }),
            (None, None) => {}
        }
    }
}

/// Canonical text: whitespace-only collapses to absence; trimming and run-collapsing follow the options.
fn normalize_text<'a>(input: Option<&'a str>, opts: &ComparisonOptions) -> Option<Cow<'a, str>> {
    let text = input.filter(|s| !s.trim().is_empty())?;
    if !opts.ignore_whitespace {
        return Some(Cow::Borrowed(text));
    }
    if opts.mode == ComparisonMode::Loose {
        return Some(Cow::Owned(
            text.split_whitespace().collect::<Vec<_>>().join(" "),
        ));
    }
    Some(Cow::Borrowed(text.trim()))
}

fn values_equal(left: &str, right: &str, opts: &ComparisonOptions) -> bool {
    if opts.mode == ComparisonMode::Strict {
        return left == right;
    }
    if let (Some(a), Some(b)) = (opts.boolean_value(left), opts.boolean_value(right)) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (parse_number(left), parse_number(right)) {
        return opts.numbers_equal(a, b);
    }
    match opts.mode {
        ComparisonMode::Loose => left.to_lowercase() == right.to_lowercase(),
        _ => left == right,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
