use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::interpreter::Factory;
use anyhow::Result;
use argh::{EarlyExit, FromArgs};
use std::io::{BufRead, Write};

mod files;
mod massrename;
mod navigation;
mod session;

pub use files::{Cat, Charsets, CopyFile, Cptree, Hexdump, Ls, Mkdir, Rmtree, Tree};
pub use massrename::MassRename;
pub use navigation::{Cd, Dropd, Listd, Popd, Pushd, Pwd};
pub use session::{Exit, Help, Symbol};

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "ls" or "cd".
    fn name() -> &'static str;

    /// Executes the command using provided IO streams and environment.
    ///
    /// Return value should follow shell conventions: 0 for success, non-zero for error.
    fn execute(
        self,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match T::execute(*self, stdin, stdout, env) {
            Ok(x) => Ok(x),
            Err(e) => {
                tracing::debug!(command = T::name(), error = %format!("{e:#}"), "command failed");
                writeln!(stdout, "{}: {:#}", T::name(), e)?;
                Ok(1)
            }
        }
    }
}

struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(
        self: Box<Self>,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        _env: &mut Environment,
    ) -> Result<ExitCode> {
        writeln!(stdout, "{}", self.output.trim_end())?;
        Ok(if self.is_error { 1 } else { 0 })
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn usage(&self) -> String {
        match T::from_args(&[T::name()], &["--help"]) {
            Ok(_) => String::new(),
            Err(EarlyExit { output, .. }) => output,
        }
    }

    fn try_create(
        &self,
        _env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>> {
        if name == T::name() {
            Some(match T::from_args(&[name], args) {
                Ok(cmd) => Box::new(cmd),
                Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                    output,
                    is_error: status.is_err(),
                }),
            })
        } else {
            None
        }
    }
}

/// Factories for every builtin, in the order `help` lists them.
pub(crate) fn factories() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Cat>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Charsets>::default()),
        Box::new(Factory::<CopyFile>::default()),
        Box::new(Factory::<Cptree>::default()),
        Box::new(Factory::<Dropd>::default()),
        Box::new(Factory::<Exit>::default()),
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Hexdump>::default()),
        Box::new(Factory::<Listd>::default()),
        Box::new(Factory::<Ls>::default()),
        Box::new(Factory::<MassRename>::default()),
        Box::new(Factory::<Mkdir>::default()),
        Box::new(Factory::<Popd>::default()),
        Box::new(Factory::<Pushd>::default()),
        Box::new(Factory::<Pwd>::default()),
        Box::new(Factory::<Rmtree>::default()),
        Box::new(Factory::<Symbol>::default()),
        Box::new(Factory::<Tree>::default()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_factory_matches_only_its_name() {
        let env = Environment::with_current_dir("/");
        let factory = Factory::<Pwd>::default();
        assert!(factory.try_create(&env, "pwd", &[]).is_some());
        assert!(factory.try_create(&env, "pwdx", &[]).is_none());
    }

    #[test]
    fn test_invalid_args_report_usage_with_error_code() {
        let mut env = Environment::with_current_dir("/");
        let cmd = Factory::<Cd>::default()
            .try_create(&env, "cd", &["a", "b"])
            .unwrap();

        let mut out = Vec::new();
        let code = cmd
            .execute(&mut Cursor::new(Vec::new()), &mut out, &mut env)
            .unwrap();

        assert_eq!(code, 1);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_failed_command_prints_error_and_exits_with_one() {
        let mut env = Environment::with_current_dir("/");
        let cmd: Box<dyn ExecutableCommand> = Box::new(Cd {
            target: "/definitely/not/a/dir".to_string(),
        });

        let mut out = Vec::new();
        let code = cmd
            .execute(&mut Cursor::new(Vec::new()), &mut out, &mut env)
            .unwrap();

        assert_eq!(code, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("cd: "));
    }

    #[test]
    fn test_every_builtin_has_usage() {
        for factory in factories() {
            assert!(
                factory.usage().contains(factory.name()),
                "no usage for {}",
                factory.name()
            );
        }
    }
}
