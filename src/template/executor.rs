use super::{CompiledTemplate, MatchResult, TemplateNode};
use thiserror::Error;

/// Errors reported while rendering a template against a match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("group {index} does not exist, the pattern has {group_count} groups (including group 0)")]
    GroupIndexOutOfRange { index: usize, group_count: usize },
    #[error("group {index} did not participate in the match")]
    GroupNotCaptured { index: usize },
}

/// Renders `template` against the capture groups in `groups`.
///
/// A group that did not participate in the match is an error rather than
/// an empty substitution.
pub fn render(template: &CompiledTemplate, groups: &MatchResult) -> Result<String, RenderError> {
    let mut out = String::new();
    for node in template.nodes() {
        match node {
            TemplateNode::Literal(text) => out.push_str(text),
            TemplateNode::GroupRef {
                index,
                pad,
                min_width,
            } => {
                let value = groups
                    .group(*index)
                    .ok_or(RenderError::GroupIndexOutOfRange {
                        index: *index,
                        group_count: groups.group_count(),
                    })?
                    .ok_or(RenderError::GroupNotCaptured { index: *index })?;

                let len = value.chars().count();
                if len < *min_width {
                    out.extend(std::iter::repeat_n(pad.as_char(), min_width - len));
                }
                out.push_str(value);
            }
        }
    }
    Ok(out)
}
