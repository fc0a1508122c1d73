//! Storefront assistant server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use shopkeep::agent::{Assistant, SessionSweeper};
use shopkeep::config::AssistantConfig;
use shopkeep::provider::gemini::GeminiModel;
use shopkeep::server::{self, AppState};
use shopkeep::store::ConversationStore;
use shopkeep::tools::{storefront, ToolRegistry};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AssistantConfig::from_env();

    let api_key = std::env::var("GOOGLE_API_KEY")
        .map_err(|_| "GOOGLE_API_KEY not found in environment variables")?;
    let model_name =
        std::env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
    let mut model = GeminiModel::new(model_name.clone(), api_key);
    if let Ok(raw) = std::env::var("TEMPERATURE") {
        if let Ok(temperature) = raw.parse::<f32>() {
            model = model.with_temperature(temperature);
        }
    }

    let mut registry = ToolRegistry::new();
    for tool in storefront::all_tools() {
        registry.register(tool)?;
    }
    let registry = Arc::new(registry);
    let store = Arc::new(ConversationStore::new(config.max_history));

    let assistant = Arc::new(Assistant::new(
        Arc::new(model),
        Arc::clone(&store),
        Arc::clone(&registry),
        config.clone(),
    ));

    SessionSweeper::new(Arc::clone(&store), &config).spawn();

    let addr: SocketAddr = std::env::var("SHOPKEEP_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()?;

    info!(model = %model_name, %addr, "starting storefront assistant");
    server::serve(
        AppState {
            assistant,
            store,
            registry,
        },
        addr,
    )
    .await?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
