use std::process::ExitCode;

use mmv::{app, cli, output};

fn main() -> ExitCode {
    output::set_program_name(&cli::invocation_name());
    let args = cli::parse();
    app::run(args)
}
