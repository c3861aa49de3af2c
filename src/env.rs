use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::env as stdenv;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

/// The three configurable prompt symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Printed before each command.
    Prompt,
    /// Printed before each continuation line.
    Multiline,
    /// A line ending with this symbol continues on the next line.
    Morelines,
}

impl FromStr for SymbolKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PROMPT" => Ok(SymbolKind::Prompt),
            "MULTILINE" => Ok(SymbolKind::Multiline),
            "MORELINES" => Ok(SymbolKind::Morelines),
            other => bail!("unknown symbol '{other}', expected PROMPT, MULTILINE or MORELINES"),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SymbolKind::Prompt => "PROMPT",
            SymbolKind::Multiline => "MULTILINE",
            SymbolKind::Morelines => "MORELINES",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbols {
    pub prompt: char,
    pub multiline: char,
    pub morelines: char,
}

impl Default for Symbols {
    fn default() -> Self {
        Self {
            prompt: '>',
            multiline: '|',
            morelines: '\\',
        }
    }
}

impl Symbols {
    pub fn get(&self, kind: SymbolKind) -> char {
        match kind {
            SymbolKind::Prompt => self.prompt,
            SymbolKind::Multiline => self.multiline,
            SymbolKind::Morelines => self.morelines,
        }
    }

    /// Replaces a symbol and returns the previous one.
    pub fn set(&mut self, kind: SymbolKind, symbol: char) -> char {
        let slot = match kind {
            SymbolKind::Prompt => &mut self.prompt,
            SymbolKind::Multiline => &mut self.multiline,
            SymbolKind::Morelines => &mut self.morelines,
        };
        std::mem::replace(slot, symbol)
    }
}

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// Nothing here touches the process itself: `cd` changes `current_dir`, not
/// the working directory of the process.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Directory that relative paths are resolved against.
    pub current_dir: PathBuf,
    /// When set to true, indicates that an interactive loop should exit.
    pub should_exit: bool,
    /// Directories saved by `pushd`, most recent last.
    pub dir_stack: Vec<PathBuf>,
    pub symbols: Symbols,
    /// Usage text of every registered command, by name.
    pub catalogue: BTreeMap<String, String>,
}

impl Environment {
    /// An environment rooted at the working directory of the process.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::with_current_dir(current_dir)
    }

    /// A fresh environment rooted at `current_dir`.
    pub fn with_current_dir(current_dir: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: current_dir.into(),
            should_exit: false,
            dir_stack: Vec::new(),
            symbols: Symbols::default(),
            catalogue: BTreeMap::new(),
        }
    }

    /// Resolves `path` against the current directory and removes `.` and
    /// `..` components lexically.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        let joined = self.current_dir.join(path);
        let mut out = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                        out.pop();
                    }
                }
                other => out.push(other),
            }
        }
        out
    }

    /// Makes `dir` the current directory. It must be an existing directory.
    pub fn set_current_dir(&mut self, dir: PathBuf) -> Result<()> {
        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }
        self.current_dir = dir;
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
