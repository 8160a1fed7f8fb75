use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tributary::app::AppContext;
use tributary::cli::{browse, commands, Cli, Commands};
use tributary::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?.with_overrides(cli.url, cli.token);
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Entries {
            scope,
            filter,
            pages,
        } => {
            let spec = filter.apply_to(ctx.view.filter());
            commands::list_entries(&ctx, scope.scope(), spec, pages).await?;
        }
        Commands::ToggleRead { id, scope } => {
            commands::toggle_read(&ctx, scope.scope(), id).await?;
        }
        Commands::ToggleStar { id, scope } => {
            commands::toggle_star(&ctx, scope.scope(), id).await?;
        }
        Commands::MarkAllRead { scope } => {
            commands::mark_all_read(&ctx, scope.scope()).await?;
        }
        Commands::Counters => {
            commands::show_counters(&ctx).await?;
        }
        Commands::Browse { scope, filter } => {
            let spec = filter.apply_to(ctx.view.filter());
            browse::run(&ctx, scope.scope(), spec).await?;
        }
    }

    Ok(())
}
