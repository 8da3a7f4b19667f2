mod cli;
mod commands;
mod config;
mod credentials;
mod logging;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use smartcare_client::Route;

use cli::{Cli, Commands, ConfigCommands};
use commands::Reported;
use output::print_error;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if e.downcast_ref::<Reported>().is_none() {
            print_error(&format!("{e:#}"));
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let profile = &cli.profile;
    let mut cfg = config::load_profile(profile)?;
    logging::init_tracing(cfg.log_level.as_deref());
    let format = cli.format.unwrap_or_else(|| cfg.output_format());

    if let Commands::Config(args) = &cli.command {
        match &args.command {
            ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    cfg.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format.as_deref().unwrap_or("json")
                );
                println!(
                    "{}: {}",
                    "Language".cyan(),
                    cfg.language.as_deref().unwrap_or("ko")
                );
                println!(
                    "{}: {}",
                    "Log level".cyan(),
                    cfg.log_level.as_deref().unwrap_or(logging::DEFAULT_LOG_LEVEL)
                );
            }
            ConfigCommands::Set(set_args) => {
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        }
        return Ok(());
    }

    let server = config::resolve_server(&cli.server, profile, &cfg)?;
    let initial = match &cli.command {
        Commands::Login(_) | Commands::Register(_) => Route::Auth,
        Commands::Open(args) => Route::parse(&args.path),
        _ => Route::Home,
    };

    // Every invocation is a fresh page load: the session check runs first.
    let client = commands::connect(&server, profile, &cfg, initial)?;
    let outcome = client.bootstrap().await;
    tracing::debug!(phase = %outcome.phase, location = %client.location(), "bootstrap finished");

    let result = match &cli.command {
        Commands::Login(args) => commands::auth::login(&client, args).await,
        Commands::Register(args) => commands::auth::register(&client, args).await,
        Commands::Logout => commands::auth::logout(&client).await,
        Commands::Whoami => commands::auth::whoami(&client, profile, format).await,
        Commands::Status => commands::session::status(&client, &server, &outcome, format),
        Commands::Open(args) => commands::session::open(&client, &args.path),
        Commands::List(args) => commands::crud::list(&client, args.resource, format).await,
        Commands::Create(args) => {
            commands::crud::create(&client, args.resource, &args.file, format).await
        }
        Commands::Update(args) => {
            commands::crud::update(&client, args.resource, args.id, &args.file, format).await
        }
        Commands::Delete(args) => commands::crud::delete(&client, args.resource, args.id).await,
        Commands::Config(_) => Ok(()),
    };

    if let Err(err) = client.persist_session() {
        tracing::warn!(error = %err, "could not save session cookies");
    }
    result
}
