use super::{CompiledTemplate, PadChar, TemplateNode};
use thiserror::Error;

/// Widest padding a tag may ask for; no file name can be longer.
const MAX_WIDTH: usize = 255;

/// Errors reported while compiling a template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateParseError {
    /// `${` without a closing `}`.
    #[error("unterminated tag starting at column {position}")]
    UnterminatedTag { position: usize },
    /// A tag field that is not an integer, a negative group index or a
    /// width above 255.
    #[error("invalid number '{field}' in tag at column {position}")]
    InvalidGroupIndex { field: String, position: usize },
    /// A tag body with more than two comma-separated fields.
    #[error("tag '${{{body}}}' at column {position} has {fields} fields, expected 1 or 2")]
    InvalidArity {
        body: String,
        fields: usize,
        position: usize,
    },
}

struct TemplateParser {
    input: Vec<char>,
    pos: usize,
    nodes: Vec<TemplateNode>,
}

impl TemplateParser {
    fn new(template: &str) -> Self {
        TemplateParser {
            input: template.chars().collect(),
            pos: 0,
            nodes: Vec::new(),
        }
    }

    fn build(mut self) -> Result<CompiledTemplate, TemplateParseError> {
        while self.pos < self.input.len() {
            if self.at_tag_start() {
                self.parse_tag()?;
            } else {
                self.parse_literal();
            }
        }
        Ok(CompiledTemplate::new(self.nodes))
    }

    fn at_tag_start(&self) -> bool {
        self.input.get(self.pos) == Some(&'$') && self.input.get(self.pos + 1) == Some(&'{')
    }

    /// Literal run: everything up to the next `${` or the end of input.
    fn parse_literal(&mut self) {
        let mut text = String::new();
        while self.pos < self.input.len() && !self.at_tag_start() {
            text.push(self.input[self.pos]);
            self.pos += 1;
        }
        self.nodes.push(TemplateNode::Literal(text));
    }

    /// Tag: `${` body `}`, where body is `N` or `N,M` with whitespace ignored.
    fn parse_tag(&mut self) -> Result<(), TemplateParseError> {
        let position = self.pos;
        let body_start = self.pos + 2;
        let close = self.input[body_start..]
            .iter()
            .position(|&c| c == '}')
            .map(|offset| body_start + offset)
            .ok_or(TemplateParseError::UnterminatedTag { position })?;

        let body: String = self.input[body_start..close]
            .iter()
            .filter(|c| !c.is_whitespace())
            .collect();
        self.pos = close + 1;

        let fields: Vec<&str> = body.split(',').collect();
        let node = match fields.as_slice() {
            [index] => TemplateNode::GroupRef {
                index: parse_index(index, position)?,
                pad: PadChar::Space,
                min_width: 0,
            },
            [index, width] => {
                let index = parse_index(index, position)?;
                let min_width = width
                    .parse::<i32>()
                    .map_err(|_| invalid_number(width, position))?
                    .unsigned_abs() as usize;
                if min_width > MAX_WIDTH {
                    return Err(invalid_number(width, position));
                }
                let pad = if width.starts_with('0') {
                    PadChar::Zero
                } else {
                    PadChar::Space
                };
                TemplateNode::GroupRef {
                    index,
                    pad,
                    min_width,
                }
            }
            _ => {
                return Err(TemplateParseError::InvalidArity {
                    body: body.clone(),
                    fields: fields.len(),
                    position,
                });
            }
        };
        self.nodes.push(node);
        Ok(())
    }
}

fn parse_index(field: &str, position: usize) -> Result<usize, TemplateParseError> {
    field
        .parse::<usize>()
        .map_err(|_| invalid_number(field, position))
}

fn invalid_number(field: &str, position: usize) -> TemplateParseError {
    TemplateParseError::InvalidGroupIndex {
        field: field.to_string(),
        position,
    }
}

/// Compiles a template string.
///
/// Each maximal literal run becomes one [`TemplateNode::Literal`] and each
/// `${...}` tag one [`TemplateNode::GroupRef`]. A width field starting with
/// `0` selects zero padding; the width's sign is ignored.
pub fn parse(template: &str) -> Result<CompiledTemplate, TemplateParseError> {
    TemplateParser::new(template).build()
}
