//! Parley REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, picks a storage backend and LLM provider, then
//! serves the API until interrupted.

mod http;
mod state;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use secrecy::SecretString;
use tracing::info;
use tracing_subscriber::EnvFilter;

use parley_infra::llm::anthropic::AnthropicClient;
use parley_infra::llm::openai::OpenAiClient;
use parley_infra::llm::{ProviderKind, anthropic, openai};
use parley_infra::memory::{MemoryChatResource, MemoryMessageResource, MemoryUserResource};
use parley_infra::sqlite::mapped::{MappedChatResource, MappedMessageResource, MappedUserResource};
use parley_infra::sqlite::pool::{DatabasePool, default_data_dir, default_database_url};
use parley_infra::sqlite::raw::{RawChatResource, RawMessageResource, RawUserResource};

use state::{AppState, ChatStore, MessageStore, UserStore};

/// Storage backend selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    /// SQLite through mapped row structs and built queries.
    SqliteMapped,
    /// SQLite through hand-written parameterized statements.
    SqliteRaw,
    /// Transient in-process store; nothing survives a restart.
    Memory,
}

/// LLM provider selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Provider {
    Anthropic,
    Openai,
}

#[derive(Debug, Parser)]
#[command(name = "parley", about = "Conversational chat API backed by an LLM provider")]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "PARLEY_ADDR", default_value = "127.0.0.1:8080")]
    addr: String,

    /// SQLite database URL; defaults to a file under the data directory.
    #[arg(long, env = "PARLEY_DATABASE_URL")]
    database_url: Option<String>,

    /// API key passed through to the selected provider.
    #[arg(long, env = "PARLEY_API_KEY", hide_env_values = true)]
    api_key: String,

    #[arg(long, value_enum, default_value = "sqlite-mapped")]
    backend: Backend,

    #[arg(long, value_enum, default_value = "anthropic")]
    provider: Provider,

    /// Override the provider's default model.
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let provider = match cli.provider {
        Provider::Anthropic => ProviderKind::Anthropic(AnthropicClient::new(
            cli.model
                .clone()
                .unwrap_or_else(|| anthropic::DEFAULT_MODEL.to_string()),
        )),
        Provider::Openai => ProviderKind::OpenAi(OpenAiClient::new(
            cli.model
                .clone()
                .unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
        )),
    };
    let api_key = SecretString::from(cli.api_key.clone());

    match cli.backend {
        Backend::SqliteMapped => {
            let pool = connect(&cli).await?;
            let state = AppState::new(
                MappedUserResource::new(pool.clone()),
                MappedChatResource::new(pool.clone()),
                MappedMessageResource::new(pool),
                provider,
                api_key,
            );
            serve(&cli.addr, state).await
        }
        Backend::SqliteRaw => {
            let pool = connect(&cli).await?;
            let state = AppState::new(
                RawUserResource::new(pool.clone()),
                RawChatResource::new(pool.clone()),
                RawMessageResource::new(pool),
                provider,
                api_key,
            );
            serve(&cli.addr, state).await
        }
        Backend::Memory => {
            let state = AppState::new(
                MemoryUserResource::new(),
                MemoryChatResource::new(),
                MemoryMessageResource::new(),
                provider,
                api_key,
            );
            serve(&cli.addr, state).await
        }
    }
}

async fn connect(cli: &Cli) -> anyhow::Result<DatabasePool> {
    let url = match cli.database_url.clone() {
        Some(url) => url,
        None => {
            tokio::fs::create_dir_all(default_data_dir()).await?;
            default_database_url()
        }
    };
    DatabasePool::new(&url)
        .await
        .with_context(|| format!("failed to open database at {url}"))
}

async fn serve<U, C, M>(addr: &str, state: AppState<U, C, M>) -> anyhow::Result<()>
where
    U: UserStore,
    C: ChatStore,
    M: MessageStore,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
