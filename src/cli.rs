use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, long_about = None)]
pub struct Cli {
	/// SQLite database file, created on first use
	#[arg(long, env = "LEAGUE_DATABASE", default_value = "league.db", value_name = "FILE")]
	pub database: PathBuf,

	#[arg(long, env = "LEAGUE_BIND", default_value = "127.0.0.1:3000")]
	pub bind: SocketAddr,

	/// How long a request waits on a locked database
	#[arg(long, env = "LEAGUE_BUSY_TIMEOUT_MS", default_value_t = 5000)]
	pub busy_timeout_ms: u64,

	/// Upper bound for the `limit` query parameter of list endpoints
	#[arg(
		long,
		env = "LEAGUE_MAX_PAGE_SIZE",
		default_value_t = 100,
		value_parser = clap::value_parser!(u32).range(1..)
	)]
	pub max_page_size: u32,

	#[arg(long, env = "LEAGUE_LOG_JSON")]
	pub log_json: bool,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Create the schema and exit
	Init,
	/// Serve the HTTP API
	Serve,
	/// Print the statistics report of a game
	Report {
		#[arg(value_name = "COD_JUEGO")]
		cod_juego: String,

		#[arg(short, long, value_name = "FILE")]
		output: Option<PathBuf>,
	},
}
