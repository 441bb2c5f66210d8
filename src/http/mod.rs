//! JSON API over the league store.

mod handlers;
mod response;

use std::time::Instant;

use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{info, Instrument};

use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
	pub db: Database,
	pub max_page_size: u32,
}

impl AppState {
	pub fn new(db: Database, max_page_size: u32) -> Self {
		Self { db, max_page_size }
	}
}

pub fn build_router(state: AppState) -> Router {
	Router::new()
		.route("/healthz", get(healthz))
		.route(
			"/api/ciudades",
			get(handlers::list_ciudades).post(handlers::create_ciudad),
		)
		.route(
			"/api/ciudades/:id",
			get(handlers::get_ciudad)
				.put(handlers::update_ciudad)
				.delete(handlers::delete_ciudad),
		)
		.route(
			"/api/equipos",
			get(handlers::list_equipos).post(handlers::create_equipo),
		)
		.route(
			"/api/equipos/:id",
			get(handlers::get_equipo)
				.put(handlers::update_equipo)
				.delete(handlers::delete_equipo),
		)
		.route(
			"/api/jugadores",
			get(handlers::list_jugadores).post(handlers::create_jugador),
		)
		.route(
			"/api/jugadores/:id",
			get(handlers::get_jugador)
				.put(handlers::update_jugador)
				.delete(handlers::delete_jugador),
		)
		.route(
			"/api/juegos",
			get(handlers::list_juegos).post(handlers::create_juego),
		)
		.route(
			"/api/juegos/:id",
			get(handlers::get_juego)
				.put(handlers::update_juego)
				.delete(handlers::delete_juego),
		)
		.route(
			"/api/juegos/:id/estadisticas",
			get(handlers::game_report),
		)
		.route(
			"/api/estadisticas",
			get(handlers::list_estadisticas).post(handlers::create_estadistica),
		)
		.route(
			"/api/estadisticas/:id",
			get(handlers::get_estadistica)
				.put(handlers::update_estadistica)
				.delete(handlers::delete_estadistica),
		)
		.route(
			"/api/estadisticas-juego",
			get(handlers::list_estadisticas_juego).post(handlers::upsert_estadistica_juego),
		)
		.route(
			"/api/estadisticas-juego/:cod_juego/:cod_estadistica/:cod_jugador",
			get(handlers::get_estadistica_juego)
				.put(handlers::update_estadistica_juego)
				.delete(handlers::delete_estadistica_juego),
		)
		.layer(middleware::from_fn(request_tracing))
		.with_state(state)
}

async fn healthz() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}

/// Opens an `http.request` span around each request and logs how it ended.
async fn request_tracing(request: Request<Body>, next: Next) -> Response {
	let method = request.method().to_string();
	let route = request.uri().path().to_string();
	let span = tracing::info_span!("http.request", method = %method, route = %route);

	let started = Instant::now();
	let response = next.run(request).instrument(span.clone()).await;
	span.in_scope(|| {
		info!(
			status = response.status().as_u16(),
			latency_ms = started.elapsed().as_millis() as u64,
			"request completed"
		);
	});
	response
}
