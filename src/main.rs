use std::process::ExitCode;

use clap::Parser;
use rekoatlas::ConvertError;

mod cli;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    if let Err(err) = cli::init_logging(cli.verbose, cli.no_color) {
        eprintln!("{err:#}");
    }

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error converting file: {err:#}");
            let code = err
                .chain()
                .find_map(|cause| cause.downcast_ref::<ConvertError>())
                .map_or(1, ConvertError::exit_code);
            ExitCode::from(code)
        }
    }
}
