mod cli;
mod commands;
mod config;
mod env_loader;
mod error;
mod ingest;
mod logging;
mod paths;
mod query;

fn main() {
    env_loader::load_dotenv();

    if let Err(err) = cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
