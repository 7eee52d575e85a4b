use clap::Parser;

/// AgroFuturo bootstrap: provision the venv, then run setup checks, the backend or the frontend
#[derive(Parser, Debug)]
#[command(name = "agrofuturo")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
Examples:
  agrofuturo --setup        install dependencies, check datasets, run the sanity probe
  agrofuturo                start the backend on http://localhost:8000
  agrofuturo --frontend     serve the frontend on http://localhost:8080")]
pub struct Cli {
    /// Install dependencies and run the sanity checks, then exit (wins over --frontend)
    #[arg(long)]
    pub setup: bool,

    /// Serve the frontend instead of the backend
    #[arg(long)]
    pub frontend: bool,

    /// Backend port (default: $PORT or 8000)
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Frontend port (default: $FRONTEND_PORT or 8080)
    #[arg(long, value_name = "PORT")]
    pub frontend_port: Option<u16>,
}
