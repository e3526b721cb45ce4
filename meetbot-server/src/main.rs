use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use meetbot_core::auth::{CredentialGate, ManualTokenProvider};
use meetbot_core::platforms::graph::GraphClient;
use meetbot_core::{BotConfig, ConversationService};

mod console;

#[derive(Parser, Debug, Clone)]
#[command(name = "meetbot")]
#[command(author, version, about = "MeetBot - books meeting rooms through a chat dialog")]
struct Args {
    /// User id the console speaks as
    #[arg(long, default_value = "console-user")]
    user: String,

    /// Bearer token to start out signed in with (otherwise paste one when asked)
    #[arg(long, env = "MEETBOT_TOKEN")]
    token: Option<String>,

    /// Overrides MEETBOT_GRAPH_BASE_URL
    #[arg(long)]
    graph_url: Option<String>,

    /// Overrides MEETBOT_LOGIN_TIMEOUT_SECS
    #[arg(long)]
    login_timeout_secs: Option<u64>,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("meetbot=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).with_writer(std::io::stderr).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {e}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = BotConfig::from_env()?;
    if let Some(url) = &args.graph_url {
        config.graph_base_url = url.clone();
    }
    if let Some(secs) = args.login_timeout_secs {
        config.login_timeout = Duration::from_secs(secs);
    }
    info!(
        "MeetBot starting. user={}, graph={}, tz={}",
        args.user, config.graph_base_url, config.time_zone
    );

    let mut provider = ManualTokenProvider::new(&config.connection_name, &config.sign_in_url);
    if let Some(token) = &args.token {
        provider = provider.with_token(&args.user, token);
    }
    let gate = CredentialGate::new(Arc::new(provider), config.login_timeout);
    let directory = Arc::new(GraphClient::new(&config.graph_base_url)?);
    let service = ConversationService::new(gate, directory, Arc::new(config));

    if let Err(e) = console::run(&service, &args.user).await {
        error!("Console error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
