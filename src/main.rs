use anyhow::{Context, Result};
use clap::Parser;
use sitebuild::build::build_site;
use sitebuild::config::{Args, Config};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(Args::parse())?;
    build_site(&config).with_context(|| {
        format!(
            "Building site from '{}'",
            config.source_directory.display()
        )
    })?;
    Ok(())
}
