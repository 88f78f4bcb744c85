use clap::Parser;
use kiro_gateway::auth::{TokenManager, machine_id};
use kiro_gateway::cli::Args;
use kiro_gateway::config::{Config, Credentials};
use kiro_gateway::convert::request::RequestTransformer;
use kiro_gateway::error::GatewayError;
use kiro_gateway::server::{self, AppState};
use kiro_gateway::upstream_client::UpstreamClient;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    kiro_gateway::logging::init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), GatewayError> {
    let config = Config::load(&args.config)?;
    let credentials = Credentials::load(&args.credentials)?;

    let machine_id = machine_id::resolve(
        config.machine_id.as_deref(),
        credentials.profile_arn.as_deref(),
        &credentials.refresh_token,
    );

    let http = reqwest::Client::builder().build()?;
    let token_manager = TokenManager::new(
        http,
        credentials,
        args.credentials.clone(),
        config.region.clone(),
        config.kiro_version.clone(),
        config.machine_id.clone(),
    );

    let upstream = UpstreamClient::new(
        config.region.clone(),
        config.kiro_version.clone(),
        config.node_version.clone(),
        config.system_version.clone(),
    )?;

    let state = Arc::new(AppState {
        token_manager,
        upstream,
        machine_id,
        transformer: RequestTransformer::new(),
    });

    let app = server::router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
