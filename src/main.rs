use std::{
	fs::File,
	io::{self, Write},
};

use anyhow::{Context, Result};
use clap::Parser;
use hoop_league::cli::{Cli, Commands};
use hoop_league::config::Config;
use hoop_league::db::Database;
use hoop_league::http::{build_router, AppState};
use hoop_league::report;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	let config = Config::from_cli(&cli);
	init_tracing(config.log_json);

	let db = config
		.open_database()
		.with_context(|| format!("could not open {}", config.database.display()))?;

	match cli.command {
		Commands::Init => {
			info!(database = %db.path().display(), "schema ready");
		}
		Commands::Serve => serve(db, &config).await?,
		Commands::Report { cod_juego, output } => {
			let mut out = match output.as_deref() {
				Some(path) => Box::new(
					File::create(path)
						.with_context(|| format!("could not access {}", path.display()))?,
				) as Box<dyn Write>,
				None => Box::new(io::stdout()) as Box<dyn Write>,
			};

			let cod_juego = hoop_league::data::normalize_code(&cod_juego);
			let conn = db.connect()?;
			let game = report::game_report(&conn, &cod_juego)?;
			out.write_all(report::render(&game).as_bytes())
				.context("could not write report")?;
		}
	}

	Ok(())
}

async fn serve(db: Database, config: &Config) -> Result<()> {
	let app = build_router(AppState::new(db, config.max_page_size));
	let listener = TcpListener::bind(config.bind)
		.await
		.with_context(|| format!("bind failed: {}", config.bind))?;
	info!("hoop-league listening on {}", config.bind);

	axum::serve(listener, app)
		.with_graceful_shutdown(wait_for_shutdown_signal())
		.await
		.context("server failed")?;

	info!("server stopped");
	Ok(())
}

async fn wait_for_shutdown_signal() {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{signal, SignalKind};
		let (Ok(mut sigterm), Ok(mut sigint)) = (
			signal(SignalKind::terminate()),
			signal(SignalKind::interrupt()),
		) else {
			let _ = tokio::signal::ctrl_c().await;
			return;
		};
		tokio::select! {
			_ = sigterm.recv() => {}
			_ = sigint.recv() => {}
		}
	}
	#[cfg(not(unix))]
	{
		let _ = tokio::signal::ctrl_c().await;
	}
}

fn init_tracing(log_json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	if log_json {
		tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
			.init();
	} else {
		tracing_subscriber::registry()
			.with(filter)
			.with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
			.init();
	}
}
