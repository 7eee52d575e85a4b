mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() {
    agrofuturo_core::config::load_dotenv();
    agrofuturo_core::observability::init_tracing();
    let cli = Cli::parse();

    if let Err(e) = commands::run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(commands::exit_code(&e));
    }
}
