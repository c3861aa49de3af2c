use super::BuiltinCommand;
use crate::command::ExitCode;
use crate::env::Environment;
use anyhow::{Context, Result};
use argh::FromArgs;
use std::io::{BufRead, Write};

#[derive(FromArgs)]
/// Print the current working directory to standard output.
pub struct Pwd {}

impl BuiltinCommand for Pwd {
    fn name() -> &'static str {
        "pwd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", env.current_dir.to_string_lossy())?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: String,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env.resolve(&self.target);
        env.set_current_dir(dir)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Save the current directory on the directory stack and change to another one.
pub struct Pushd {
    #[argh(positional)]
    /// directory to switch to.
    pub target: String,
}

impl BuiltinCommand for Pushd {
    fn name() -> &'static str {
        "pushd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let previous = env.current_dir.clone();
        let dir = env.resolve(&self.target);
        env.set_current_dir(dir)
            .with_context(|| format!("cannot push {}", self.target))?;
        env.dir_stack.push(previous);
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Remove the most recently saved directory from the stack and change to it.
pub struct Popd {}

impl BuiltinCommand for Popd {
    fn name() -> &'static str {
        "popd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let dir = env
            .dir_stack
            .pop()
            .context("no directories have been saved")?;
        env.set_current_dir(dir)
            .context("saved directory is gone, it was removed from the stack")?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the saved directories, most recent first.
pub struct Listd {}

impl BuiltinCommand for Listd {
    fn name() -> &'static str {
        "listd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        if env.dir_stack.is_empty() {
            writeln!(stdout, "No directories have been saved.")?;
        }
        for dir in env.dir_stack.iter().rev() {
            writeln!(stdout, "{}", dir.display())?;
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Remove the most recently saved directory from the stack without changing to it.
pub struct Dropd {}

impl BuiltinCommand for Dropd {
    fn name() -> &'static str {
        "dropd"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.dir_stack
            .pop()
            .context("no directories have been saved")?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn run<T: BuiltinCommand>(cmd: T, env: &mut Environment) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = cmd
            .execute(&mut Cursor::new(Vec::new()), &mut out, env)
            .unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cd_relative_and_back() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut env = Environment::with_current_dir(dir.path());

        run(Cd { target: "sub".into() }, &mut env);
        assert_eq!(env.current_dir, dir.path().join("sub"));

        run(Cd { target: "..".into() }, &mut env);
        assert_eq!(env.current_dir, dir.path());

        let (_, out) = run(Pwd {}, &mut env);
        assert_eq!(out.trim_end(), dir.path().to_string_lossy());
    }

    #[test]
    fn test_cd_into_file_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("f"), "").unwrap();
        let mut env = Environment::with_current_dir(dir.path());

        let result = Cd { target: "f".into() }.execute(
            &mut Cursor::new(Vec::new()),
            &mut Vec::new(),
            &mut env,
        );
        assert!(result.is_err());
        assert_eq!(env.current_dir, dir.path());
    }

    #[test]
    fn test_directory_stack() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        let mut env = Environment::with_current_dir(dir.path());

        let (_, out) = run(Listd {}, &mut env);
        assert_eq!(out, "No directories have been saved.\n");

        run(Pushd { target: "a".into() }, &mut env);
        run(Pushd { target: "../b".into() }, &mut env);
        assert_eq!(env.current_dir, dir.path().join("b"));

        let (_, out) = run(Listd {}, &mut env);
        assert_eq!(
            out,
            format!(
                "{}\n{}\n",
                dir.path().join("a").display(),
                dir.path().display()
            )
        );

        run(Popd {}, &mut env);
        assert_eq!(env.current_dir, dir.path().join("a"));

        run(Dropd {}, &mut env);
        assert_eq!(env.current_dir, dir.path().join("a"));
        assert!(env.dir_stack.is_empty());
    }

    #[test]
    fn test_pop_from_empty_stack_fails() {
        let mut env = Environment::with_current_dir("/");
        let mut sink = Vec::new();
        assert!(
            Popd {}
                .execute(&mut Cursor::new(Vec::new()), &mut sink, &mut env)
                .is_err()
        );
        assert!(
            Dropd {}
                .execute(&mut Cursor::new(Vec::new()), &mut sink, &mut env)
                .is_err()
        );
    }

    #[test]
    fn test_failed_pushd_keeps_stack() {
        let dir = tempdir().unwrap();
        let mut env = Environment::with_current_dir(dir.path());
        let result = Pushd {
            target: "missing".into(),
        }
        .execute(&mut Cursor::new(Vec::new()), &mut Vec::new(), &mut env);
        assert!(result.is_err());
        assert!(env.dir_stack.is_empty());
    }
}
