//! Roster CLI - encrypted records for students, teachers and parents
//!
//! This is the command-line interface for Roster. It wires the core library
//! to configuration, password prompts and confirmation codes.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod ui;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use roster_core::{RosterError, VERSION};

use crate::app::AppContext;
use crate::cli::{Cli, Commands, MessengerCommands};
use crate::constants::{env_vars, DEFAULT_LOG_FILTER};
use crate::errors::CliError;

fn init_tracing() {
    let filter = EnvFilter::try_from_env(env_vars::LOG)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        if let Some(core_err) = err.downcast_ref::<RosterError>() {
            if let Some(mapped) = CliError::from_core(core_err) {
                mapped.exit();
            }
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let ctx = AppContext::new(cli);

    match &cli.command {
        Some(Commands::Init(args)) => commands::init::handle_init(cli, args),
        Some(Commands::Add(args)) => commands::records::handle_add(&ctx, args),
        Some(Commands::List(args)) => commands::records::handle_list(&ctx, args),
        Some(Commands::Show(args)) => commands::records::handle_show(&ctx, args),
        Some(Commands::Update(args)) => commands::records::handle_update(&ctx, args),
        Some(Commands::Delete(args)) => commands::records::handle_delete(&ctx, args),
        Some(Commands::Stats(args)) => commands::records::handle_stats(&ctx, args),
        Some(Commands::DecryptText(args)) => commands::text::handle_decrypt_text(&ctx, args),
        Some(Commands::Seal(args)) => commands::files::handle_seal(&ctx, args),
        Some(Commands::Unseal(args)) => commands::files::handle_unseal(&ctx, args),
        Some(Commands::Export(args)) => commands::files::handle_export(&ctx, args),
        Some(Commands::Messenger(MessengerCommands::Test)) => {
            commands::messenger::handle_test(&ctx)
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "roster", &mut std::io::stdout());
            Ok(())
        }
        None => {
            println!("Roster v{}", VERSION);
            println!("\nRun `roster --help` for usage information.");
            Ok(())
        }
    }
}
