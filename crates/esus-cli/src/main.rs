mod cli;
mod commands;
mod config;
mod credentials;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use config::ProfileConfig;
use esus_client::SessionContextManager;
use output::print_error;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    observability::init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let profile = cli.profile.as_str();
    let profile_cfg = config::load_profile(profile)?;
    let format = cli
        .format
        .or_else(|| profile_cfg.output_format())
        .unwrap_or_default();

    match &cli.command {
        Commands::Login(args) => {
            let endpoint = config::resolve_endpoint(cli.endpoint.as_deref(), profile)?;
            let client = commands::client_config(&endpoint, &profile_cfg)?;
            commands::session::login(client, args, profile).await?;
        }
        Commands::Logout => {
            commands::session::logout(profile)?;
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile);
                println!(
                    "{}: {}",
                    "Endpoint".cyan(),
                    profile_cfg.endpoint.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile_cfg.format.as_deref().unwrap_or("json")
                );
                println!(
                    "{}: {}",
                    "Client version".cyan(),
                    profile_cfg
                        .client_version
                        .as_deref()
                        .unwrap_or(esus_client::config::DEFAULT_CLIENT_VERSION)
                );
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = profile_cfg.clone();
                cfg.set(&set_args.key, &set_args.value)?;
                config::save_profile(profile, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
            }
        },
        Commands::Whoami => {
            let manager = connect(&cli, &profile_cfg).await?;
            commands::session::whoami(&manager, profile, format)?;
        }
        Commands::Citizens(args) => {
            let manager = connect(&cli, &profile_cfg).await?;
            commands::citizen::citizens(&manager, args, format).await?;
        }
        Commands::CitizenUnit(args) => {
            let manager = connect(&cli, &profile_cfg).await?;
            commands::citizen::citizen_unit(&manager, args, format).await?;
        }
        Commands::Professionals(args) => {
            let mut manager = connect(&cli, &profile_cfg).await?;
            commands::professional::professionals(&mut manager, args, format).await?;
        }
        Commands::Slots(args) => {
            let mut manager = connect(&cli, &profile_cfg).await?;
            commands::schedule::slots(&mut manager, args, format).await?;
        }
        Commands::Appointments(args) => {
            let mut manager = connect(&cli, &profile_cfg).await?;
            commands::schedule::appointments(&mut manager, args, format).await?;
        }
        Commands::ScopeUnit(args) => {
            let manager = connect(&cli, &profile_cfg).await?;
            commands::schedule::scope_unit(&manager, args, format).await?;
        }
        Commands::Book(args) => {
            let mut manager = connect(&cli, &profile_cfg).await?;
            commands::booking::book_appointment(&mut manager, args, format).await?;
        }
    }

    Ok(())
}

async fn connect(cli: &Cli, profile_cfg: &ProfileConfig) -> Result<SessionContextManager> {
    let endpoint = config::resolve_endpoint(cli.endpoint.as_deref(), &cli.profile)?;
    let client = commands::client_config(&endpoint, profile_cfg)?;
    commands::connect(client, &cli.profile).await
}
