use legal_document_analyzer::config::Config;
use legal_document_analyzer::providers::WatsonxProvider;
use legal_document_analyzer::server::run_server;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env first so RUST_LOG from it is honoured
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}. Check your environment or .env file.", e);
            return ExitCode::FAILURE;
        }
    };

    let provider = match WatsonxProvider::new(config.provider.clone()) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build watsonx.ai client");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(model_id = provider.model_id(), "watsonx.ai client ready");

    match run_server(config, Arc::new(provider)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server stopped");
            ExitCode::FAILURE
        }
    }
}
