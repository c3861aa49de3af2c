use super::{DirectoryStore, ExecutionReport, GroupListing, RenameEntry, RenameError, RenameFailure};
use crate::template::{self, MatchResult};
use regex::{Regex, RegexBuilder};
use std::path::{Component, Path};

/// Longest file name, in bytes, that common filesystems accept.
const MAX_NAME_LEN: usize = 255;

/// Compiles `pattern` so that it only matches whole names, ignoring case.
pub fn compile_pattern(pattern: &str) -> Result<Regex, RenameError> {
    Ok(RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .build()?)
}

/// Names of the entries in `source_dir` matched by `regex`, sorted by name.
pub fn filter(
    store: &dyn DirectoryStore,
    source_dir: &Path,
    regex: &Regex,
) -> Result<Vec<String>, RenameError> {
    if !store.is_dir(source_dir) {
        return Err(RenameError::InvalidSource(source_dir.to_path_buf()));
    }
    let mut names: Vec<String> = store
        .list(source_dir)
        .map_err(|source| RenameError::Io {
            path: source_dir.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|name| regex.is_match(name))
        .collect();
    names.sort();
    Ok(names)
}

/// Capture groups `0..=n` of every name.
pub fn groups(names: &[String], regex: &Regex) -> Vec<GroupListing> {
    names
        .iter()
        .filter_map(|name| {
            let caps = regex.captures(name)?;
            Some(GroupListing {
                name: name.clone(),
                groups: MatchResult::from(&caps),
            })
        })
        .collect()
}

/// Plans the new name of every entry from `template_source`.
///
/// Fails as a whole if the template does not compile or any single name
/// cannot be rendered into a valid file name.
pub fn show(
    names: &[String],
    regex: &Regex,
    template_source: &str,
) -> Result<Vec<RenameEntry>, RenameError> {
    let compiled = template::parse(template_source)?;

    let mut entries = Vec::with_capacity(names.len());
    for listing in groups(names, regex) {
        let new_name =
            template::render(&compiled, &listing.groups).map_err(|source| RenameError::Render {
                file: listing.name.clone(),
                source,
            })?;
        if !is_single_component(&new_name) {
            return Err(RenameError::IllegalName {
                file: listing.name,
                name: new_name,
            });
        }
        entries.push(RenameEntry {
            original: listing.name,
            new_name,
        });
    }
    Ok(entries)
}

/// Moves every planned entry from `source_dir` into `destination_dir`.
///
/// The destination is created when only its parent exists. Individual move
/// failures are collected in the report; they do not stop the batch.
pub fn commit(
    store: &dyn DirectoryStore,
    source_dir: &Path,
    destination_dir: &Path,
    entries: &[RenameEntry],
) -> Result<ExecutionReport, RenameError> {
    prepare_destination(store, destination_dir)?;

    let mut report = ExecutionReport::default();
    for entry in entries {
        let from = source_dir.join(&entry.original);
        let to = destination_dir.join(&entry.new_name);
        match store.rename(&from, &to) {
            Ok(()) => {
                tracing::info!(from = %from.display(), to = %to.display(), "renamed");
                report.renamed.push(entry.clone());
            }
            Err(error) => {
                tracing::warn!(from = %from.display(), to = %to.display(), %error, "rename failed");
                report.failures.push(RenameFailure {
                    entry: entry.clone(),
                    error,
                });
            }
        }
    }
    Ok(report)
}

fn prepare_destination(store: &dyn DirectoryStore, dir: &Path) -> Result<(), RenameError> {
    if store.is_dir(dir) {
        return Ok(());
    }
    if store.exists(dir) {
        return Err(RenameError::InvalidDestination(dir.to_path_buf()));
    }
    match dir.parent() {
        Some(parent) if parent.as_os_str().is_empty() || store.is_dir(parent) => {
            tracing::debug!(dir = %dir.display(), "creating destination directory");
            store.create_dir(dir).map_err(|source| RenameError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Err(RenameError::InvalidDestination(dir.to_path_buf())),
    }
}

fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    );
    single && !name.contains('\0') && name.len() <= MAX_NAME_LEN
}
