use std::{net::SocketAddr, path::PathBuf, time::Duration};

use crate::cli::Cli;
use crate::db::Database;

/// Runtime settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	pub database: PathBuf,
	pub bind: SocketAddr,
	pub busy_timeout: Duration,
	pub max_page_size: u32,
	pub log_json: bool,
}

impl Config {
	pub fn from_cli(cli: &Cli) -> Self {
		Self {
			database: cli.database.clone(),
			bind: cli.bind,
			busy_timeout: Duration::from_millis(cli.busy_timeout_ms),
			max_page_size: cli.max_page_size,
			log_json: cli.log_json,
		}
	}

	pub fn open_database(&self) -> rusqlite::Result<Database> {
		Database::open(&self.database, self.busy_timeout)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cli::Commands;
	use clap::Parser;

	#[test]
	fn flags_override_defaults() {
		let cli = Cli::try_parse_from([
			"hoop-league",
			"--database",
			"other.db",
			"--bind",
			"0.0.0.0:8080",
			"--busy-timeout-ms",
			"250",
			"--max-page-size",
			"20",
			"report",
			"G1",
		])
		.expect("parse");
		let config = Config::from_cli(&cli);

		assert_eq!(config.database, PathBuf::from("other.db"));
		assert_eq!(config.bind.port(), 8080);
		assert_eq!(config.busy_timeout, Duration::from_millis(250));
		assert_eq!(config.max_page_size, 20);
		assert!(matches!(cli.command, Commands::Report { ref cod_juego, .. } if cod_juego == "G1"));
	}

	#[test]
	fn zero_page_size_is_rejected() {
		assert!(Cli::try_parse_from(["hoop-league", "--max-page-size", "0", "serve"]).is_err());
	}
}
