use super::BuiltinCommand;
use crate::command::ExitCode;
use crate::env::{Environment, SymbolKind};
use anyhow::{Result, anyhow, bail};
use argh::FromArgs;
use std::io::{BufRead, Write};

#[derive(FromArgs)]
/// Leave the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        _stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        env.should_exit = true;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// List the available commands, or describe one of them.
pub struct Help {
    #[argh(positional)]
    /// command to describe.
    pub command: Option<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        match self.command {
            None => {
                for name in env.catalogue.keys() {
                    writeln!(stdout, "{name}")?;
                }
            }
            Some(name) => {
                let usage = env
                    .catalogue
                    .get(&name)
                    .ok_or_else(|| anyhow!("no such command: {name}"))?;
                writeln!(stdout, "{}", usage.trim_end())?;
            }
        }
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Show or change one of the shell symbols: PROMPT, MULTILINE or MORELINES.
pub struct Symbol {
    #[argh(positional)]
    /// symbol to show or change.
    pub name: String,
    #[argh(positional)]
    /// new value, a single character.
    pub value: Option<String>,
}

impl BuiltinCommand for Symbol {
    fn name() -> &'static str {
        "symbol"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let kind: SymbolKind = self.name.parse()?;
        let Some(value) = self.value else {
            writeln!(stdout, "Symbol for {kind} is '{}'", env.symbols.get(kind))?;
            return Ok(0);
        };

        let mut chars = value.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(c), None) => c,
            _ => bail!("'{value}' is not a single character"),
        };
        let old = env.symbols.set(kind, symbol);
        writeln!(stdout, "Symbol for {kind} changed from '{old}' to '{symbol}'")?;
        Ok(0)
    }
}
