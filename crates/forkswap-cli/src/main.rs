use atty::Stream;
use clap::{error::ErrorKind, Parser};
use color_eyre::Result;
use forkswap_core::GlobalOptions;

mod cli;
mod dispatch;
mod output;
mod style;

use cli::{ForkswapCli, USAGE_GUIDANCE};
use dispatch::dispatch_command;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = match ForkswapCli::try_parse() {
        Ok(cli) => cli,
        Err(err) => std::process::exit(report_usage_error(&err)),
    };
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
    };
    let output = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };

    let (info, outcome) = dispatch_command(&global, &cli.command);
    let code = emit_output(&output, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

/// Help and version are successful invocations; any other parse failure is a
/// usage error and exits 1.
fn report_usage_error(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            0
        }
        _ => {
            let _ = err.print();
            eprintln!();
            eprint!("{USAGE_GUIDANCE}");
            1
        }
    }
}

fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("forkswap={level},forkswap_core={level},forkswap_domain={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(Stream::Stderr))
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
