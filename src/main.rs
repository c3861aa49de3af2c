use argh::FromArgs;
use file_shell::Interpreter;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive file shell with a batch renaming command.
struct Args {
    #[argh(switch, short = 'v')]
    /// log what the shell is doing to stderr.
    verbose: bool,

    #[argh(option)]
    /// prompt symbol to start with.
    prompt: Option<char>,

    #[argh(option, short = 'c')]
    /// run a single command line and exit with its code.
    command: Option<String>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    let mut shell = Interpreter::default();
    if let Some(prompt) = args.prompt {
        shell.env_mut().symbols.prompt = prompt;
    }

    if let Some(line) = args.command {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        let code = match shell.execute_line(&line, &mut stdin.lock(), &mut stdout) {
            Ok(code) => code,
            Err(e) => {
                writeln!(stdout, "{e:#}")?;
                1
            }
        };
        stdout.flush()?;
        return Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)));
    }

    shell.repl()?;
    Ok(ExitCode::SUCCESS)
}
