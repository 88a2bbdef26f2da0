use crate::compare::result::Difference;
use crate::presence::PresenceState;

/// Format differences as plain text, one block per difference.
pub fn format_text(differences: &[Difference]) -> String {
    let mut lines = Vec::with_capacity(differences.len() * 2);
    for difference in differences {
        match difference {
            Difference::NameMismatch { path, left, right } => {
                lines.push(format!("! {path}: element <{left}> vs <{right}>"));
            }
            Difference::AttributeMismatch {
                path,
                name,
                left,
                right,
            } => {
                lines.push(format!("~ {path}/@{name}"));
                lines.push(format!("  left:  {}", describe(left)));
                lines.push(format!("  right: {}", describe(right)));
            }
            Difference::AttributeOrder { path, left, right } => {
                lines.push(format!("~ {path}: attribute order"));
                lines.push(format!("  left:  {}", left.join(", ")));
                lines.push(format!("  right: {}", right.join(", ")));
            }
            Difference::TextMismatch { path, left, right } => {
                lines.push(format!("~ {path}/text()"));
                lines.push(format!("  left:  {left:?}"));
                lines.push(format!("  right: {right:?}"));
            }
            Difference::CommentMismatch { path, left, right } => {
                lines.push(format!("~ {path}: comments"));
                lines.push(format!("  left:  {left:?}"));
                lines.push(format!("  right: {right:?}"));
            }
            Difference::ChildOrder { path, left, right } => {
                lines.push(format!("~ {path}: child order"));
                lines.push(format!("  left:  {}", left.join(", ")));
                lines.push(format!("  right: {}", right.join(", ")));
            }
            Difference::OnlyLeft { path, .. } => lines.push(format!("- {path}")),
            Difference::OnlyRight { path, .. } => lines.push(format!("+ {path}")),
        }
    }
    lines.join("\n")
}

/// Count differences per kind.
pub fn format_summary(differences: &[Difference]) -> String {
    let mut attributes = 0;
    let mut text = 0;
    let mut order = 0;
    let mut only_left = 0;
    let mut only_right = 0;
    let mut other = 0;

    for difference in differences {
        match difference {
            Difference::AttributeMismatch { .. } => attributes += 1,
            Difference::TextMismatch { .. } => text += 1,
            Difference::AttributeOrder { .. } | Difference::ChildOrder { .. } => order += 1,
            Difference::OnlyLeft { .. } => only_left += 1,
            Difference::OnlyRight { .. } => only_right += 1,
            Difference::NameMismatch { .. } | Difference::CommentMismatch { .. } => other += 1,
        }
    }

    format!(
        "attributes={attributes} text={text} order={order} only_left={only_left} only_right={only_right} other={other}"
    )
}

fn describe(state: &PresenceState) -> String {
    match state {
        PresenceState::Absent => "(absent)".to_string(),
        PresenceState::PresentEmpty => "(empty)".to_string(),
        PresenceState::PresentWithValue(value) => format!("{value:?}"),
    }
}
