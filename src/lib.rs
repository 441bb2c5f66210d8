//! Basketball league records over SQLite: cities, teams, players, games,
//! statistic definitions and per-game statistic entries, served as a JSON API.

pub mod cli;
pub mod codes;
pub mod config;
pub mod data;
pub mod db;
pub mod error;
pub mod http;
pub mod integrity;
pub mod report;
pub mod store;
