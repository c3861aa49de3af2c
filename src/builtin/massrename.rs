use super::BuiltinCommand;
use crate::command::ExitCode;
use crate::env::Environment;
use crate::rename::{self, ExecutionReport, LocalFs, Outcome, PipelineRequest, Stage};
use anyhow::{Result, bail};
use argh::FromArgs;
use std::io::{BufRead, Write};

#[derive(FromArgs)]
/// Rename every file of a directory whose name matches a regular expression,
/// moving it into a destination directory under a name built from a template.
///
/// Subcommands: `filter` lists the matching files, `groups` shows their
/// capture groups, `show` previews the new names and `execute` renames.
/// A template tag is `${index}` or `${index,width}`; a width starting
/// with 0 pads with zeros, otherwise with spaces.
///
/// Arguments starting with `-` are read as options. Put `--` before a
/// pattern or template that starts with `-`, for example
/// `massrename in out show -- -(\d+)\.txt ${1}.txt`.
pub struct MassRename {
    #[argh(positional)]
    /// directory whose entries are renamed.
    pub source: String,
    #[argh(positional)]
    /// directory the renamed entries are moved into.
    pub destination: String,
    #[argh(positional)]
    /// one of filter, groups, show or execute.
    pub subcommand: String,
    #[argh(positional)]
    /// regular expression a whole file name must match, ignoring case.
    pub pattern: String,
    #[argh(positional)]
    /// template for the new names; required by show and execute only.
    pub template: Option<String>,
}

impl MassRename {
    fn request(self, env: &Environment) -> Result<PipelineRequest> {
        let stage: Stage = self.subcommand.parse()?;
        if !stage.needs_template() && self.template.is_some() {
            bail!("the {stage} subcommand takes exactly 4 arguments");
        }
        Ok(PipelineRequest {
            source_dir: env.resolve(&self.source),
            destination_dir: env.resolve(&self.destination),
            pattern: self.pattern,
            template: self.template,
            stage,
        })
    }

    fn write_report(report: &ExecutionReport, stdout: &mut dyn Write) -> Result<()> {
        for entry in &report.renamed {
            writeln!(stdout, "{} => {}", entry.original, entry.new_name)?;
        }
        for failure in &report.failures {
            writeln!(
                stdout,
                "failed: {} => {}: {}",
                failure.entry.original, failure.entry.new_name, failure.error
            )?;
        }
        writeln!(
            stdout,
            "renamed {} of {} files",
            report.renamed.len(),
            report.attempted()
        )?;
        Ok(())
    }
}

impl BuiltinCommand for MassRename {
    fn name() -> &'static str {
        "massrename"
    }

    fn execute(
        self,
        _stdin: &mut dyn BufRead,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode> {
        let request = self.request(env)?;
        match rename::run(&LocalFs, &request)? {
            Outcome::Filtered(names) => {
                for name in names {
                    writeln!(stdout, "{name}")?;
                }
            }
            Outcome::Groups(listings) => {
                for listing in listings {
                    write!(stdout, "{}", listing.name)?;
                    for (index, group) in listing.groups.iter() {
                        write!(stdout, " {index}: {}", group.unwrap_or("<none>"))?;
                    }
                    writeln!(stdout)?;
                }
            }
            Outcome::Preview(entries) => {
                for entry in entries {
                    writeln!(stdout, "{} => {}", entry.original, entry.new_name)?;
                }
            }
            Outcome::Committed(report) => {
                Self::write_report(&report, stdout)?;
                if !report.is_complete() {
                    return Ok(1);
                }
            }
        }
        Ok(0)
    }
}
