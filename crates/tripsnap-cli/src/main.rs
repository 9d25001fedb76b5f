use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tripsnap_application::AppContext;
use tripsnap_infrastructure::{ConfigService, HttpClient};

mod commands;

#[derive(Parser)]
#[command(name = "tripsnap")]
#[command(about = "tripsnap CLI - bakery discovery and sharing from the terminal", long_about = None)]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Account email; logs in before running the command
    #[arg(long, env = "TRIPSNAP_EMAIL", global = true)]
    email: Option<String>,

    #[arg(long, env = "TRIPSNAP_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the logged-in account
    Me,
    /// Print the third-party login URL
    OauthUrl,
    /// Show a profile and its posts (your own without a nickname)
    Profile { nickname: Option<String> },
    /// List followers of a user
    Followers { nickname: String },
    /// List accounts a user follows
    Followings { nickname: String },
    /// Search users and bakeries
    Search { query: String },
    /// Show a bakery's detail
    Bakery {
        id: i64,
        /// Include the comment list
        #[arg(long)]
        comments: bool,
        /// Skip the detail cache
        #[arg(long)]
        refresh: bool,
    },
    /// Create a post on your profile
    PostCreate {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image files to attach
        #[arg(long = "image")]
        images: Vec<PathBuf>,
    },
    /// Replace your profile image
    Avatar { path: PathBuf },
    /// Ask for bakery recommendations
    Chat {
        #[arg(long)]
        preference: String,
        #[arg(long, default_value = "")]
        region: String,
        #[arg(long, default_value = "")]
        dates: String,
        #[arg(long, default_value = "")]
        transport: String,
        /// Message to send after the conversation starts
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Trigger the backend keyword rebuild (operator only)
    RebuildKeywords,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_service = match &cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new_default()?,
    };
    let config = config_service
        .load()
        .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

    tracing::debug!("[Cli] Using backend {}", config.base_url);

    let transport = Arc::new(HttpClient::new(&config)?);
    let context = AppContext::new(transport, config);
    if context.bootstrap().await.is_none() && cli.email.is_none() {
        tracing::warn!("[Cli] No saved session; continuing anonymously");
    }

    if let (Some(email), Some(password)) = (&cli.email, &cli.password) {
        if !context.session.login(email, password).await {
            let message = context.session.error().await.unwrap_or_default();
            anyhow::bail!("Login failed: {}", message);
        }
    }

    match cli.command {
        Commands::Me => commands::session::me(&context).await?,
        Commands::OauthUrl => commands::session::oauth_url(&context),
        Commands::Profile { nickname } => {
            commands::profile::show(&context, nickname.as_deref()).await?
        }
        Commands::Followers { nickname } => {
            commands::profile::followers(&context, &nickname).await?
        }
        Commands::Followings { nickname } => {
            commands::profile::followings(&context, &nickname).await?
        }
        Commands::Search { query } => commands::profile::search(&context, &query).await?,
        Commands::Bakery {
            id,
            comments,
            refresh,
        } => commands::bakery::show(&context, id, comments, refresh).await?,
        Commands::PostCreate {
            title,
            content,
            images,
        } => commands::profile::create_post(&context, title, content, &images).await?,
        Commands::Avatar { path } => commands::profile::avatar(&context, &path).await?,
        Commands::Chat {
            preference,
            region,
            dates,
            transport,
            message,
        } => {
            let filters = tripsnap_core::model::ChatFilters {
                preference,
                region,
                dates,
                transport,
            };
            commands::chat::run(&context, filters, &message.join(" ")).await?
        }
        Commands::RebuildKeywords => commands::session::rebuild_keywords(&context).await?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
