use super::BuiltinCommand;
use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result, bail};
use argh::FromArgs;
use chrono::{DateTime, Local};
use encoding_rs::Encoding;
use std::fs::{self, DirEntry, Metadata};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

const HEXDUMP_ROW: usize = 16;

/// Entries of `dir` sorted by file name.
fn sorted_entries(dir: &Path) -> Result<Vec<DirEntry>> {
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("cannot list {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("cannot list {}", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

fn require_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        bail!("{} is not a directory", path.display());
    }
    Ok(())
}

#[cfg(unix)]
fn attribute_flags(meta: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = meta.permissions().mode();
    let flag = |bit: u32, c: char| if mode & bit != 0 { c } else { '-' };
    [
        if meta.is_dir() { 'd' } else { '-' },
        flag(0o400, 'r'),
        flag(0o200, 'w'),
        flag(0o100, 'x'),
    ]
    .iter()
    .collect()
}

#[cfg(not(unix))]
fn attribute_flags(meta: &Metadata) -> String {
    [
        if meta.is_dir() { 'd' } else { '-' },
        'r',
        if meta.permissions().readonly() { '-' } else { 'w' },
        '-',
    ]
    .iter()
    .collect()
}

#[derive(FromArgs)]
/// List a directory: attributes, size, modification time and name of every entry.
pub struct Ls {
    #[argh(positional)]
    /// directory to list.
    pub dir: String,
}

impl BuiltinCommand for Ls {
    fn name() -> &'static str {
        "ls"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(&self.dir);
        require_dir(&dir)?;

        for entry in sorted_entries(&dir)? {
            let meta = entry
                .metadata()
                .with_context(|| format!("cannot read {}", entry.path().display()))?;
            let modified: DateTime<Local> = meta.modified()?.into();
            writeln!(
                stdout,
                "{} {:>10} {} {}",
                attribute_flags(&meta),
                meta.len(),
                modified.format("%Y-%m-%d %H:%M:%S"),
                entry.file_name().to_string_lossy()
            )?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print a directory tree, each level indented by two more spaces.
pub struct Tree {
    #[argh(positional)]
    /// root of the tree.
    pub dir: String,
}

impl Tree {
    fn walk(dir: &Path, depth: usize, stdout: &mut dyn Write) -> Result<()> {
        let indent = "  ".repeat(depth);
        for entry in sorted_entries(dir)? {
            writeln!(stdout, "{indent}{}", entry.file_name().to_string_lossy())?;
            if entry.file_type()?.is_dir() {
                Self::walk(&entry.path(), depth + 1, stdout)?;
            }
        }
        Ok(())
    }
}

impl BuiltinCommand for Tree {
    fn name() -> &'static str {
        "tree"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(&self.dir);
        require_dir(&dir)?;
        writeln!(stdout, "{}", dir.display())?;
        Self::walk(&dir, 1, stdout)?;
        Ok(0)
    }
}

/// Every encoding `cat` can decode, in the order `charsets` lists them.
fn supported_charsets() -> [&'static Encoding; 40] {
    use encoding_rs::*;
    [
        UTF_8, UTF_16BE, UTF_16LE, IBM866, ISO_8859_2, ISO_8859_3, ISO_8859_4,
        ISO_8859_5, ISO_8859_6, ISO_8859_7, ISO_8859_8, ISO_8859_8_I, ISO_8859_10,
        ISO_8859_13, ISO_8859_14, ISO_8859_15, ISO_8859_16, KOI8_R, KOI8_U, MACINTOSH,
        WINDOWS_874, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252, WINDOWS_1253,
        WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257, WINDOWS_1258,
        X_MAC_CYRILLIC, GBK, GB18030, BIG5, EUC_JP, ISO_2022_JP, SHIFT_JIS, EUC_KR,
        REPLACEMENT, X_USER_DEFINED,
    ]
}

#[derive(FromArgs)]
/// Print a file to stdout, decoding it from the given charset (UTF-8 by default).
pub struct Cat {
    #[argh(positional)]
    /// file to print.
    pub file: String,
    #[argh(positional)]
    /// charset label such as windows-1250 or latin2, see `charsets`.
    pub charset: Option<String>,
}

impl BuiltinCommand for Cat {
    fn name() -> &'static str {
        "cat"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let encoding = match &self.charset {
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .with_context(|| format!("unsupported charset '{label}'"))?,
            None => encoding_rs::UTF_8,
        };
        let path = env.resolve(&self.file);
        let bytes = fs::read(&path).with_context(|| format!("cannot read {}", self.file))?;

        let (text, _, malformed) = encoding.decode(&bytes);
        if malformed {
            tracing::warn!(file = %path.display(), charset = encoding.name(), "malformed input replaced");
        }
        write!(stdout, "{text}")?;
        if !text.is_empty() && !text.ends_with('\n') {
            writeln!(stdout)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the charsets `cat` can decode.
pub struct Charsets {}

impl BuiltinCommand for Charsets {
    fn name() -> &'static str {
        "charsets"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        for encoding in supported_charsets() {
            writeln!(stdout, "{}", encoding.name())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Print the contents of a file as hexadecimal bytes, 16 per row.
pub struct Hexdump {
    #[argh(positional)]
    /// file to dump.
    pub file: String,
}

impl Hexdump {
    fn write_row(offset: usize, row: &[u8], stdout: &mut dyn Write) -> Result<()> {
        let mut line = format!("{offset:08X}: ");
        for i in 0..HEXDUMP_ROW {
            match row.get(i) {
                Some(byte) => line.push_str(&format!("{byte:02X} ")),
                None => line.push_str("   "),
            }
            if i % 8 == 7 {
                line.push_str("| ");
            }
        }
        line.extend(row.iter().map(|&b| {
            if (32..=127).contains(&b) {
                b as char
            } else {
                '.'
            }
        }));
        writeln!(stdout, "{line}")?;
        Ok(())
    }
}

impl BuiltinCommand for Hexdump {
    fn name() -> &'static str {
        "hexdump"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let path = env.resolve(&self.file);
        if !path.is_file() {
            bail!("{} is not a file", path.display());
        }
        let bytes = fs::read(&path).with_context(|| format!("cannot read {}", self.file))?;
        for (n, row) in bytes.chunks(HEXDUMP_ROW).enumerate() {
            Self::write_row(n * HEXDUMP_ROW, row, stdout)?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Create a directory together with any missing parents.
pub struct Mkdir {
    #[argh(positional)]
    /// directory to create.
    pub dir: String,
}

impl BuiltinCommand for Mkdir {
    fn name() -> &'static str {
        "mkdir"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(&self.dir);
        fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Copy a file. If the destination is a directory the file is copied into it;
/// an existing destination file is only overwritten after confirmation.
pub struct CopyFile {
    #[argh(positional)]
    /// file to copy.
    pub source: String,
    #[argh(positional)]
    /// destination file or directory.
    pub destination: String,
}

/// Asks until the answer is `y` or `n`. End of input counts as `n`.
fn confirm(question: &str, stdin: &mut dyn BufRead, stdout: &mut dyn Write) -> Result<bool> {
    loop {
        write!(stdout, "{question} (y/n) ")?;
        stdout.flush()?;
        let mut answer = String::new();
        if stdin.read_line(&mut answer)? == 0 {
            writeln!(stdout)?;
            return Ok(false);
        }
        match answer.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => continue,
        }
    }
}

impl BuiltinCommand for CopyFile {
    fn name() -> &'static str {
        "copy"
    }

    fn execute(
        self,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let source = env.resolve(&self.source);
        if source.is_dir() {
            bail!("{} is a directory, use cptree", source.display());
        }
        let mut target = env.resolve(&self.destination);
        if target.is_dir() {
            let name = source
                .file_name()
                .with_context(|| format!("{} has no file name", source.display()))?;
            target.push(name);
        }

        if target.exists() {
            let question = format!(
                "Destination file {} already exists. Overwrite?",
                target.display()
            );
            if !confirm(&question, stdin, stdout)? {
                writeln!(stdout, "Nothing copied.")?;
                return Ok(0);
            }
        }

        fs::copy(&source, &target).with_context(|| {
            format!("cannot copy {} to {}", source.display(), target.display())
        })?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Copy a directory tree.
pub struct Cptree {
    #[argh(positional)]
    /// directory to copy.
    pub source: String,
    #[argh(positional)]
    /// an existing directory to copy into, or a new directory to create.
    pub destination: String,
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to).with_context(|| format!("cannot create {}", to.display()))?;
    for entry in sorted_entries(from)? {
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("cannot copy {}", entry.path().display()))?;
        }
    }
    Ok(())
}

impl Cptree {
    fn target(source: &Path, destination: PathBuf) -> Result<PathBuf> {
        if destination.is_dir() {
            let name = source
                .file_name()
                .with_context(|| format!("{} has no directory name", source.display()))?;
            return Ok(destination.join(name));
        }
        match destination.parent() {
            Some(parent) if parent.is_dir() && !destination.exists() => Ok(destination),
            _ => bail!("{} cannot be used as a destination", destination.display()),
        }
    }
}

impl BuiltinCommand for Cptree {
    fn name() -> &'static str {
        "cptree"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let source = env.resolve(&self.source);
        require_dir(&source)?;
        let target = Self::target(&source, env.resolve(&self.destination))?;
        if target.starts_with(&source) {
            bail!("cannot copy {} into itself", source.display());
        }
        copy_tree(&source, &target)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Delete a directory and everything in it.
pub struct Rmtree {
    #[argh(positional)]
    /// directory to delete.
    pub dir: String,
}

impl BuiltinCommand for Rmtree {
    fn name() -> &'static str {
        "rmtree"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(&self.dir);
        require_dir(&dir)?;
        if env.current_dir.starts_with(&dir) {
            bail!("refusing to delete the current directory or one of its parents");
        }
        fs::remove_dir_all(&dir).with_context(|| format!("cannot delete {}", dir.display()))?;
        Ok(0)
    }
}
