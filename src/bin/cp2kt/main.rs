use std::process::ExitCode;

mod cli;
mod commands;
mod config;
mod display;
mod io;
mod logging;
mod util;

fn main() -> ExitCode {
    let cli = cli::parse();

    if let Err(e) = logging::init(cli.global.log_level) {
        display::print_error(&e);
        return ExitCode::FAILURE;
    }

    let ctx = display::Context::new(cli.global.quiet);

    match commands::dispatch(cli.command, ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            display::print_error(&e);
            ExitCode::FAILURE
        }
    }
}
