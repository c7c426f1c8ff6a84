use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use playplan_cli::output::print_json;
use playplan_cli::{run, Cli, Ports, UsageError};
use playplan_core::ports::{Console, OsFileSystem, StdConsole, StderrConsole, SystemClock};
use std::path::PathBuf;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap exits 2 on usage errors; this tool reports every failure as 1.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let json = cli.json;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    // With --json, stdout holds only the summary document.
    let console: &dyn Console = if json { &StderrConsole } else { &StdConsole };
    let ports = Ports {
        fs: &OsFileSystem,
        clock: &SystemClock,
        console,
    };

    let result = cli
        .into_generate_args(&cwd)
        .and_then(|args| run(&args, &ports))
        .and_then(|outcome| {
            if json {
                print_json(&outcome.summary)?;
            }
            Ok(())
        });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        if e.downcast_ref::<UsageError>().is_some() {
            eprintln!("\n{}", Cli::command().render_usage());
        }
        std::process::exit(1);
    }
}
