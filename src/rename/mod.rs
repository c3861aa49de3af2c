//! Batch renaming of directory entries.
//!
//! The pipeline works in four stages, each requested explicitly through a
//! [`PipelineRequest`]:
//!
//! - `filter`: entry names of the source directory that fully match the
//!   pattern (case-insensitive), sorted by name;
//! - `groups`: the capture groups of every filtered name;
//! - `show`: the planned `old => new` names, computed from a template;
//! - `execute`: the planned renames, moved into the destination directory.
//!
//! Planning is all-or-nothing: one name that fails to render aborts the whole
//! plan. Committing is best-effort: a failed move is recorded and the
//! remaining entries are still attempted.

mod pipeline;
mod store;

pub use pipeline::{commit, compile_pattern, filter, groups, show};
pub use store::{DirectoryStore, LocalFs};

use crate::template::{MatchResult, RenderError, TemplateParseError};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// The stage a pipeline invocation stops at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Filter,
    Groups,
    Show,
    Execute,
}

impl Stage {
    /// Whether the stage renders new names and so needs a template.
    pub fn needs_template(self) -> bool {
        matches!(self, Stage::Show | Stage::Execute)
    }
}

impl FromStr for Stage {
    type Err = RenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filter" => Ok(Stage::Filter),
            "groups" => Ok(Stage::Groups),
            "show" => Ok(Stage::Show),
            "execute" => Ok(Stage::Execute),
            other => Err(RenameError::UnknownStage(other.to_string())),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Filter => "filter",
            Stage::Groups => "groups",
            Stage::Show => "show",
            Stage::Execute => "execute",
        };
        f.write_str(name)
    }
}

/// Everything one pipeline invocation depends on, apart from the contents of
/// the directories themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
    pub pattern: String,
    pub template: Option<String>,
    pub stage: Stage,
}

/// A planned rename: entry `original` in the source directory becomes
/// `new_name` in the destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub original: String,
    pub new_name: String,
}

/// Capture groups of one filtered name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupListing {
    pub name: String,
    pub groups: MatchResult,
}

/// A rename that could not be committed.
#[derive(Debug)]
pub struct RenameFailure {
    pub entry: RenameEntry,
    pub error: io::Error,
}

/// Result of the `execute` stage.
#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub renamed: Vec<RenameEntry>,
    pub failures: Vec<RenameFailure>,
}

impl ExecutionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.renamed.len() + self.failures.len()
    }
}

/// What a pipeline invocation produced, one variant per [`Stage`].
#[derive(Debug)]
pub enum Outcome {
    Filtered(Vec<String>),
    Groups(Vec<GroupListing>),
    Preview(Vec<RenameEntry>),
    Committed(ExecutionReport),
}

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("'{0}' is not a valid subcommand, expected filter, groups, show or execute")]
    UnknownStage(String),
    #[error("the {0} subcommand needs a template")]
    MissingTemplate(Stage),
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
    #[error("invalid template: {0}")]
    Template(#[from] TemplateParseError),
    #[error("cannot compute a new name for '{file}': {source}")]
    Render { file: String, source: RenderError },
    #[error("new name '{name}' for '{file}' is not a single file name of at most 255 bytes")]
    IllegalName { file: String, name: String },
    #[error("{} is not a directory", .0.display())]
    InvalidSource(PathBuf),
    #[error("destination {} cannot be used: it is not a directory and cannot be created", .0.display())]
    InvalidDestination(PathBuf),
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Runs `request` up to and including its stage.
///
/// The pattern is compiled before the source directory is read, and for
/// `execute` the whole plan is computed before the first file is moved.
pub fn run(store: &dyn DirectoryStore, request: &PipelineRequest) -> Result<Outcome, RenameError> {
    let regex = compile_pattern(&request.pattern)?;
    let template = match (request.stage.needs_template(), &request.template) {
        (true, Some(template)) => Some(template.as_str()),
        (true, None) => return Err(RenameError::MissingTemplate(request.stage)),
        (false, _) => None,
    };

    let names = filter(store, &request.source_dir, &regex)?;
    tracing::debug!(
        stage = %request.stage,
        source = %request.source_dir.display(),
        matched = names.len(),
        "filtered source directory"
    );

    match (request.stage, template) {
        (Stage::Filter, _) => Ok(Outcome::Filtered(names)),
        (Stage::Groups, _) => Ok(Outcome::Groups(groups(&names, &regex))),
        (Stage::Show, Some(template)) => Ok(Outcome::Preview(show(&names, &regex, template)?)),
        (Stage::Execute, Some(template)) => {
            let entries = show(&names, &regex, template)?;
            let report = commit(
                store,
                &request.source_dir,
                &request.destination_dir,
                &entries,
            )?;
            Ok(Outcome::Committed(report))
        }
        (stage, None) => Err(RenameError::MissingTemplate(stage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn request(dir: &std::path::Path, stage: Stage, template: Option<&str>) -> PipelineRequest {
        PipelineRequest {
            source_dir: dir.to_path_buf(),
            destination_dir: dir.join("out"),
            pattern: r"slika(\d+)-([^.]+)\.jpg".to_string(),
            template: template.map(str::to_string),
            stage,
        }
    }

    fn photo_dir() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        for name in ["slika1-zagreb.jpg", "slika2-zagreb.jpg", "SLIKA3-split.JPG", "notes.txt"] {
            fs::write(dir.path().join(name), name).unwrap();
        }
        dir
    }

    #[test]
    fn test_stage_names() {
        assert_eq!("filter".parse::<Stage>().unwrap(), Stage::Filter);
        assert_eq!("execute".parse::<Stage>().unwrap(), Stage::Execute);
        assert!(matches!(
            "rename".parse::<Stage>(),
            Err(RenameError::UnknownStage(ref s)) if s == "rename"
        ));
        assert!(!Stage::Groups.needs_template());
        assert!(Stage::Show.needs_template());
    }

    #[test]
    fn test_run_filter_is_sorted_and_case_insensitive() {
        let dir = photo_dir();
        let outcome = run(&LocalFs, &request(dir.path(), Stage::Filter, None)).unwrap();

        let Outcome::Filtered(names) = outcome else {
            panic!("expected filtered names");
        };
        assert_eq!(
            names,
            vec!["SLIKA3-split.JPG", "slika1-zagreb.jpg", "slika2-zagreb.jpg"]
        );
    }

    #[test]
    fn test_run_show_does_not_touch_files() {
        let dir = photo_dir();
        let outcome = run(
            &LocalFs,
            &request(dir.path(), Stage::Show, Some("gradovi-${2}-${1,03}.jpg")),
        )
        .unwrap();

        let Outcome::Preview(entries) = outcome else {
            panic!("expected a preview");
        };
        assert_eq!(entries[0].new_name, "gradovi-split-003.jpg");
        assert_eq!(entries[1].new_name, "gradovi-zagreb-001.jpg");
        assert!(dir.path().join("slika1-zagreb.jpg").exists());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_run_execute_moves_into_destination() {
        let dir = photo_dir();
        let outcome = run(
            &LocalFs,
            &request(dir.path(), Stage::Execute, Some("${2}-${1}.jpg")),
        )
        .unwrap();

        let Outcome::Committed(report) = outcome else {
            panic!("expected a commit report");
        };
        assert!(report.is_complete());
        assert_eq!(report.renamed.len(), 3);
        assert!(dir.path().join("out").join("zagreb-2.jpg").is_file());
        assert!(dir.path().join("out").join("split-3.jpg").is_file());
        assert!(dir.path().join("notes.txt").is_file());
    }

    #[test]
    fn test_run_requires_template_for_show() {
        let dir = photo_dir();
        let err = run(&LocalFs, &request(dir.path(), Stage::Show, None)).unwrap_err();
        assert!(matches!(err, RenameError::MissingTemplate(Stage::Show)));
    }

    #[test]
    fn test_run_rejects_bad_regex_before_listing() {
        let mut req = request(std::path::Path::new("/definitely/not/here"), Stage::Filter, None);
        req.pattern = "(unclosed".to_string();
        assert!(matches!(run(&LocalFs, &req), Err(RenameError::Regex(_))));
    }

    #[test]
    fn test_run_rejects_bad_template_before_touching_files() {
        let dir = photo_dir();
        let err = run(&LocalFs, &request(dir.path(), Stage::Execute, Some("${1"))).unwrap_err();
        assert!(matches!(
            err,
            RenameError::Template(TemplateParseError::UnterminatedTag { .. })
        ));
        assert!(!dir.path().join("out").exists());
        assert!(dir.path().join("slika1-zagreb.jpg").exists());
    }
}
