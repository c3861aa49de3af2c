use crate::env::Environment;
use anyhow::Result;
use std::io::{BufRead, Write};

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// Object-safe trait for any command that can be executed by the shell.
///
/// Builtins get it through a blanket impl; see `BuiltinCommand`.
pub trait ExecutableCommand {
    /// Executes the command.
    ///
    /// `stdin` is only read by commands that ask the user something, such
    /// as `copy` before overwriting a file.
    fn execute(
        self: Box<Self>,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode>;
}

/// Factory that tries to create a command from a name and its arguments.
pub trait CommandFactory {
    /// Name the factory answers to.
    fn name(&self) -> &'static str;

    /// Help text shown by `help <name>`.
    fn usage(&self) -> String;

    /// Attempt to create a command instance for the provided name and arguments.
    ///
    /// Returns `None` when the factory doesn't recognize the `name`.
    fn try_create(
        &self,
        env: &Environment,
        name: &str,
        args: &[&str],
    ) -> Option<Box<dyn ExecutableCommand>>;
}
