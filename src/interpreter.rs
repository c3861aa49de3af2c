use crate::command::{CommandFactory, ExitCode};
use crate::env::{Environment, Symbols};
use crate::lexer::{self, TokenizeError};
use anyhow::anyhow;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result};
use std::io::{BufRead, Write};

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports commands defined in this crate, see `BuiltinCommand`.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// Returns the line without its trailing continuation symbol, or `None` when
/// the line is complete.
///
/// `symbol` changes the symbols themselves, so its lines are always complete.
fn continued<'a>(line: &'a str, symbols: &Symbols) -> Option<&'a str> {
    let command = line.split_whitespace().next().unwrap_or_default();
    if command == "symbol" {
        return None;
    }
    line.strip_suffix(symbols.morelines)
}

/// A small interactive shell that executes its built-in commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried to create commands by name. See [`Default`] for the built-in
/// factories included out of the box.
///
/// Example
/// ```
/// use file_shell::Interpreter;
/// let mut sh = Interpreter::default();
/// let mut out = Vec::new();
/// let code = sh
///     .execute_line("symbol PROMPT", &mut std::io::empty(), &mut out)
///     .unwrap();
/// assert_eq!(code, 0);
/// assert_eq!(String::from_utf8(out).unwrap(), "Symbol for PROMPT is '>'\n");
/// ```
pub struct Interpreter {
    env: Environment,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self::with_env(Environment::new(), commands)
    }

    /// Create an interpreter working in a prepared environment.
    pub fn with_env(mut env: Environment, commands: Vec<Box<dyn CommandFactory>>) -> Self {
        env.catalogue = commands
            .iter()
            .map(|factory| (factory.name().to_string(), factory.usage()))
            .collect();
        Self { env, commands }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    fn dispatch(
        &mut self,
        name: &str,
        args: &[&str],
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, args) {
                tracing::debug!(command = name, ?args, "executing");
                return cmd.execute(stdin, stdout, &mut self.env);
            }
        }
        Err(anyhow!("command not found: {}", name))
    }

    /// Run a single command invocation by name with arguments.
    ///
    /// Returns the command's exit code or an error if the command cannot be created
    /// or fails to execute.
    pub fn run(&mut self, name: &str, args: &[&str]) -> anyhow::Result<ExitCode> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let code = self.dispatch(name, args, &mut stdin.lock(), &mut stdout)?;
        stdout.flush()?;
        Ok(code)
    }

    /// Execute one complete command line.
    ///
    /// The command name ends at the first whitespace; the rest of the line is
    /// split into arguments by [`lexer::split_into_tokens`]. A blank line is a
    /// no-op.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
    ) -> anyhow::Result<ExitCode> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(0);
        }
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let tokens = match lexer::split_into_tokens(rest) {
            Ok(tokens) => tokens,
            Err(TokenizeError::NoTokens) => Vec::new(),
            Err(e) => return Err(anyhow::Error::new(e).context("could not parse arguments")),
        };
        let args: Vec<&str> = tokens.iter().map(String::as_str).collect();
        self.dispatch(name, &args, stdin, stdout)
    }

    /// Read-Eval-Print Loop over the terminal.
    ///
    /// Stops on Ctrl-C, Ctrl-D or after `exit`.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        println!("Welcome to file_shell v{}!", env!("CARGO_PKG_VERSION"));

        while !self.env.should_exit {
            let mut line = match rl.readline(&format!("{} ", self.env.symbols.prompt)) {
                Ok(line) => line.trim().to_string(),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => {
                    tracing::warn!(error = %err, "cannot read line");
                    return Err(err);
                }
            };

            while let Some(head) = continued(&line, &self.env.symbols) {
                let head = head.to_string();
                match rl.readline(&format!("{} ", self.env.symbols.multiline)) {
                    Ok(next) => line = head + next.trim(),
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
                    Err(err) => return Err(err),
                }
            }

            if line.is_empty() {
                continue;
            }
            rl.add_history_entry(line.as_str())?;

            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            if let Err(e) = self.execute_line(&line, &mut stdin.lock(), &mut stdout) {
                println!("{e:#}");
            }
            stdout.flush().ok();
        }

        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with every builtin command registered.
    fn default() -> Self {
        Self::new(crate::builtin::factories())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn interpreter(dir: &std::path::Path) -> Interpreter {
        Interpreter::with_env(
            Environment::with_current_dir(dir),
            crate::builtin::factories(),
        )
    }

    fn exec(sh: &mut Interpreter, line: &str) -> anyhow::Result<(ExitCode, String)> {
        let mut out = Vec::new();
        let code = sh.execute_line(line, &mut Cursor::new(Vec::new()), &mut out)?;
        Ok((code, String::from_utf8(out).unwrap()))
    }

    #[test]
    fn test_catalogue_is_filled() {
        let sh = interpreter(std::path::Path::new("/"));
        assert!(sh.env().catalogue.contains_key("massrename"));
        assert!(sh.env().catalogue.contains_key("help"));
    }

    #[test]
    fn test_quoted_arguments_reach_the_command() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("my dir")).unwrap();
        let mut sh = interpreter(dir.path());

        let (code, _) = exec(&mut sh, "cd \"my dir\"").unwrap();
        assert_eq!(code, 0);
        assert_eq!(sh.env().current_dir, dir.path().join("my dir"));
    }

    #[test]
    fn test_command_without_arguments() {
        let dir = tempdir().unwrap();
        let mut sh = interpreter(dir.path());
        let (_, out) = exec(&mut sh, "  pwd   ").unwrap();
        assert_eq!(out, format!("{}\n", dir.path().display()));
        assert_eq!(exec(&mut sh, "").unwrap(), (0, String::new()));
    }

    #[test]
    fn test_unknown_command() {
        let mut sh = interpreter(std::path::Path::new("/"));
        let err = exec(&mut sh, "frobnicate a b").unwrap_err();
        assert_eq!(err.to_string(), "command not found: frobnicate");
    }

    #[test]
    fn test_illegal_arguments_are_reported() {
        let mut sh = interpreter(std::path::Path::new("/"));
        let err = exec(&mut sh, "cd \"a\"b").unwrap_err();
        assert!(format!("{err:#}").starts_with("could not parse arguments: "));
    }

    #[test]
    fn test_exit_stops_the_shell() {
        let mut sh = interpreter(std::path::Path::new("/"));
        exec(&mut sh, "exit").unwrap();
        assert!(sh.env().should_exit);
    }

    #[test]
    fn test_continued_lines() {
        let symbols = Symbols::default();
        assert_eq!(continued("ls \\", &symbols), Some("ls "));
        assert_eq!(continued("ls dir", &symbols), None);
        assert_eq!(continued("symbol MORELINES \\", &symbols), None);

        let custom = Symbols {
            morelines: '+',
            ..Symbols::default()
        };
        assert_eq!(continued("ls +", &custom), Some("ls "));
    }
}
