use anyhow::{Context, Result};
use clap::Parser;
use folio::{
    build::{build_site, check_site},
    cli::{Cli, Commands},
    config::SiteConfig,
    log,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = load_config(&cli).and_then(|config| match &cli.command {
        Commands::Build { .. } => build_site(&config).map(|_| ()),
        Commands::Check { .. } => check_site(&config),
    });

    if let Err(err) = &result {
        log!("error"; "{err:#}");
        std::process::exit(1);
    }
    result
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<SiteConfig> {
    let config = SiteConfig::load(cli)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    config.validate()?;
    log!("build"; "using {}", config.config_path.display());
    Ok(config)
}
