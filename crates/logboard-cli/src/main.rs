//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers.

use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};

use logboard_cli::handlers::live::LiveOptions;
use logboard_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads `env` defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err
                .downcast_ref::<CliError>()
                .map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // No command provided - show help
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let range = match &command {
        Commands::Live { range, .. } => *range,
        _ => None,
    };
    let config = CliConfig::from_env(cli.data_dir)?.with_range(range);
    let ctx = bootstrap(config).await?;

    let result = match command {
        Commands::Paths => handlers::paths::execute(&ctx),
        Commands::Status { command } => handlers::status::execute(&ctx, command).await,
        Commands::Live {
            range: _,
            kind,
            keyword,
            filters,
            ascending,
            rows,
            json,
            duration_secs,
        } => {
            let options = LiveOptions {
                range: ctx.settings.default_range,
                kind,
                keyword,
                filters,
                ascending,
                rows,
                json,
                duration: duration_secs.map(Duration::from_secs),
            };
            handlers::live::execute(&ctx, options).await
        }
    };

    ctx.shutdown().await;
    result
}
