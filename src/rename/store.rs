use std::fs;
use std::io;
use std::path::Path;

/// Directory operations the rename pipeline needs from the platform.
pub trait DirectoryStore {
    /// Names of the entries directly inside `dir`, in whatever order the
    /// platform returns them.
    fn list(&self, dir: &Path) -> io::Result<Vec<String>>;
    fn is_dir(&self, path: &Path) -> bool;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir(&self, dir: &Path) -> io::Result<()>;
    /// Moves `from` to `to`. Fails with [`io::ErrorKind::AlreadyExists`]
    /// instead of replacing an existing `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Local filesystem implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl DirectoryStore for LocalFs {
    fn list(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(name = ?raw, dir = %dir.display(), "skipping entry with non UTF-8 name")
                }
            }
        }
        Ok(names)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn create_dir(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir(dir)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if self.exists(to) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", to.display()),
            ));
        }
        match fs::rename(from, to) {
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices && from.is_file() => {
                fs::copy(from, to)?;
                fs::remove_file(from)
            }
            other => other,
        }
    }
}
