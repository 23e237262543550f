use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use web_service::{ServiceConfig, StorageBackend};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "party-checklist")]
#[command(about = "Shared party prep checklist", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Document store backend
    #[arg(long, global = true, value_parser = parse_storage)]
    storage: Option<StorageBackend>,

    /// Directory holding one JSON document per party
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Checklist template (JSON or TOML) used for new parties
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Party shown when the address names none
    #[arg(long, global = true)]
    default_party: Option<String>,

    /// Base URL used when building share links
    #[arg(long, global = true)]
    public_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Print a fresh party key and its share link
    NewParty,
    /// Print a party's checklist and progress
    Show { party: String },
    /// Flip one task or subtask
    Toggle {
        party: String,
        section: String,
        task: String,
        subtask: Option<String>,
    },
    /// Check a template file for shape and id uniqueness
    Validate { template: PathBuf },
}

fn parse_storage(value: &str) -> Result<StorageBackend, String> {
    value.parse().map_err(|e: web_service::AppError| e.to_string())
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<ServiceConfig> {
        let mut config = ServiceConfig::load(self.config.as_deref())?;

        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(storage) = self.storage {
            config.storage = storage;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(template) = &self.template {
            config.template_path = Some(template.clone());
        }
        if let Some(key) = &self.default_party {
            config.default_party = key.clone();
        }
        if let Some(url) = &self.public_url {
            config.public_url = Some(url.clone());
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            if let Err(e) = web_service::run(config).await {
                tracing::error!("Failed to run web service: {}", e);
                return Err(e.into());
            }
        }
        Command::NewParty => commands::new_party(&config)?,
        Command::Show { party } => commands::show(&config, &party).await?,
        Command::Toggle {
            party,
            section,
            task,
            subtask,
        } => commands::toggle(&config, &party, section, task, subtask).await?,
        Command::Validate { template } => commands::validate(&template)?,
    }

    Ok(())
}
