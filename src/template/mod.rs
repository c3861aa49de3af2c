//! Filename templates for `massrename`.
//!
//! A template mixes literal text with group references such as `${1}` or
//! `${2,03}`. [`parse`] compiles the source once into a [`CompiledTemplate`],
//! which [`render`] then evaluates against the capture groups of each matched
//! filename.

mod executor;
mod parser;

pub use executor::{RenderError, render};
pub use parser::{TemplateParseError, parse};

use regex::Captures;

/// Character used to left-pad a group value up to its minimum width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadChar {
    Space,
    Zero,
}

impl PadChar {
    pub fn as_char(self) -> char {
        match self {
            PadChar::Space => ' ',
            PadChar::Zero => '0',
        }
    }
}

/// One element of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNode {
    /// Text copied verbatim.
    Literal(String),
    /// Value of capture group `index`, left-padded with `pad` to at least
    /// `min_width` characters.
    GroupRef {
        index: usize,
        pad: PadChar,
        min_width: usize,
    },
}

/// An ordered sequence of [`TemplateNode`]s. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTemplate {
    nodes: Vec<TemplateNode>,
}

impl CompiledTemplate {
    pub(crate) fn new(nodes: Vec<TemplateNode>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Capture groups of one regular-expression match.
///
/// Index 0 is the whole match. A group that did not participate in the match
/// is stored as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    groups: Vec<Option<String>>,
}

impl MatchResult {
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self { groups }
    }

    /// Number of groups including group 0.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// `None` if `index` is out of range, `Some(None)` if the group did not
    /// participate.
    pub fn group(&self, index: usize) -> Option<Option<&str>> {
        self.groups.get(index).map(|g| g.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&str>)> {
        self.groups.iter().enumerate().map(|(i, g)| (i, g.as_deref()))
    }
}

impl From<&Captures<'_>> for MatchResult {
    fn from(caps: &Captures<'_>) -> Self {
        Self::new(
            caps.iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}
