use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use passvault::cli::commands;
use passvault::cli::{harden_process, Cli, Commands};
use passvault::errors::PassVaultError;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("PASSVAULT_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("passvault=debug")
        } else {
            EnvFilter::new("passvault=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    harden_process();

    let result = match cli.command {
        None | Some(Commands::Menu) => commands::menu::execute(&cli),
        Some(Commands::Init) => commands::init::execute(&cli),
        Some(Commands::List) => commands::list::execute(&cli),
        Some(Commands::Add {
            ref identifier,
            ref key,
            ref website,
            generate,
        }) => commands::add::execute(&cli, identifier, key, website, generate),
        Some(Commands::Remove {
            ref identifier,
            force,
        }) => commands::remove::execute(&cli, identifier, force),
        Some(Commands::Show { ref identifier }) => commands::show::execute(&cli, identifier),
        Some(Commands::Copy { ref identifier }) => commands::copy::execute(&cli, identifier),
        Some(Commands::Generate {
            size,
            no_symbols,
            ref exclude,
            copy,
        }) => commands::generate::execute(&cli, size, no_symbols, exclude, copy),
        Some(Commands::Passwd) => commands::passwd::execute(&cli),
        Some(Commands::Backup { ref dest }) => commands::backup::execute(&cli, dest.as_deref()),
        Some(Commands::Audit { last }) => commands::audit_cmd::execute(&cli, last),
        Some(Commands::Completions { ref shell }) => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        if let PassVaultError::VaultNotFound(_) = e {
            passvault::cli::output::tip("Run `passvault init` to create a vault.");
        }
        std::process::exit(1);
    }
}
