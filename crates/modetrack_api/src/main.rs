use actix_web::{App, HttpServer, web};
use anyhow::Context;
use modetrack::ModeTracker;
use tracing::info;

use crate::config::Config;
use crate::cors::build_cors;
use crate::state::AppState;

mod api;
mod config;
mod cors;
mod models;
mod state;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
		)
		.init();

	let config_path = std::env::args().nth(1).unwrap_or_else(|| String::from("config.toml"));
	let config = Config::load(&config_path).context("Failed to load configuration")?;
	info!(path = %config_path, "✅ Configuration loaded");

	let state = AppState::new(ModeTracker::new(&config.tracker));
	info!(
		modes = config.tracker.trajectories.len(),
		radius = config.tracker.max_search_radius,
		gap_fill = ?config.tracker.gap_fill,
		"✅ Mode tracker initialized"
	);

	let server = config.server.clone();
	info!(host = %server.host, port = server.port, "✅ Starting mode tracking service");

	HttpServer::new(move || {
		App::new()
			.wrap(build_cors(&server.cors_origins))
			.app_data(web::Data::new(state.clone()))
			.app_data(web::PayloadConfig::new(server.payload_limit))
			.configure(api::configure)
	})
	.bind((config.server.host.as_str(), config.server.port))
	.with_context(|| format!("Failed to bind {}:{}", config.server.host, config.server.port))?
	.run()
	.await?;

	Ok(())
}
