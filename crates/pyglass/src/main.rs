use std::process::ExitCode;

use clap::Parser;
use pyglass::{check_command, dump_command, init_colors, init_logging, Cli, Command};
use pyglass_diff::Style;

fn main() -> ExitCode {
    init_colors();
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Dump {
            packages,
            output,
            search,
            extensions,
            full,
            resolve,
        } => dump_command(
            &packages,
            &search,
            output.as_ref(),
            &extensions,
            full,
            resolve,
        )
        .map(|()| ExitCode::SUCCESS),
        Command::Check {
            package,
            base,
            against,
            search,
            format,
            repo,
        } => {
            let style: Style = match format.parse() {
                Ok(style) => style,
                Err(error) => {
                    eprintln!("error: {error}");
                    return ExitCode::from(2);
                }
            };
            check_command(
                &package,
                &base,
                against.as_deref(),
                &search,
                style,
                &repo,
            )
            .map(|found_breakages| {
                if found_breakages {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            })
        }
    };

    match result {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(2)
        }
    }
}
