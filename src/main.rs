use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use sinople_enhance::config::ThemeConfig;
use sinople_enhance::ThemeRuntime;

#[derive(Parser)]
#[command(name = "sinople-enhance", about = "Sinople feature detection and theme utilities.")]
struct Cli {
    /// Config file (defaults to ~/.sinople and .sinople discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host profile YAML to detect against (overrides config)
    #[arg(short, long)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the capability map
    Detect {
        /// Print document-root classes instead of JSON
        #[arg(long)]
        classes: bool,
    },
    /// Estimate reading time in minutes for FILE (or stdin)
    ReadingTime { file: Option<PathBuf> },
    /// Strip <script> elements from FILE (or stdin)
    Sanitize { file: Option<PathBuf> },
    /// Print the hex digest of PASSWORD
    Hash { password: String },
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sinople_enhance=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ThemeConfig::load_from(path)?,
        None => ThemeConfig::load(),
    };
    if let Some(profile) = cli.profile {
        config.host_profile = Some(profile);
    }
    debug!("config: {config:?}");

    let host = config.host()?;
    let runtime = ThemeRuntime::bootstrap(&host, &config);

    match cli.command {
        Command::Detect { classes } => {
            if classes {
                println!("{}", runtime.features().html_classes());
            } else {
                println!("{}", serde_json::to_string_pretty(runtime.features())?);
            }
        }
        Command::ReadingTime { file } => {
            let text = read_input(file.as_deref())?;
            println!("{}", runtime.utilities().await.estimate_reading_time(&text));
        }
        Command::Sanitize { file } => {
            let markup = read_input(file.as_deref())?;
            print!("{}", runtime.utilities().await.sanitize_html(&markup));
        }
        Command::Hash { password } => {
            let digest = runtime.utilities().await.hash_password(&password).await?;
            println!("{digest}");
        }
    }

    Ok(())
}
