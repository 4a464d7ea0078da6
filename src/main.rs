mod annotations;
mod capture;
mod config;
mod core;
mod domain;
mod render;
mod screencast;
mod screenshot;
mod session;

use clap::Parser;

fn main() {
    let cli = core::app::Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    if let Err(err) = core::app::run(cli) {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}
