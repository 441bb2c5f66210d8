use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use super::AppState;
use crate::data::{
	normalize_code, CantidadInput, Ciudad, CiudadInput, Equipo, EquipoInput, Estadistica,
	EstadisticaInput, EstadisticaJuego, EstadisticaJuegoInput, Juego, JuegoInput, Jugador,
	JugadorInput, Page, PageQuery, PageRequest,
};
use crate::error::Result;
use crate::report::{self, GameReport};
use crate::store::estadistica_juego::{Key, Upsert};
use crate::store::{ciudad, equipo, estadistica, estadistica_juego, juego, jugador};

type Body<T> = std::result::Result<Json<T>, JsonRejection>;
type PageParams = std::result::Result<Query<PageQuery>, QueryRejection>;

fn page_request(state: &AppState, params: PageParams) -> Result<PageRequest> {
	let Query(query) = params?;
	Ok(PageRequest::new(query, state.max_page_size))
}

fn done(message: &'static str) -> Json<Value> {
	Json(json!({ "message": message }))
}

// Ciudad

pub async fn list_ciudades(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<Ciudad>>> {
	let req = page_request(&state, params)?;
	let page = state.db.run(move |conn| ciudad::list(conn, &req)).await?;
	Ok(Json(page))
}

pub async fn get_ciudad(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Ciudad>> {
	let id = normalize_code(&id);
	let found = state.db.run(move |conn| ciudad::get(conn, &id)).await?;
	Ok(Json(found))
}

pub async fn create_ciudad(
	State(state): State<AppState>,
	body: Body<CiudadInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let created = state.db.run(move |conn| ciudad::create(conn, input)).await?;
	Ok(Json(json!({
		"message": "Ciudad creada exitosamente",
		"CodCiudad": created.cod_ciudad,
	})))
}

pub async fn update_ciudad(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Body<CiudadInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let id = normalize_code(&id);
	state.db.run(move |conn| ciudad::update(conn, &id, input)).await?;
	Ok(done("Ciudad actualizada exitosamente"))
}

pub async fn delete_ciudad(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Value>> {
	let id = normalize_code(&id);
	state.db.run(move |conn| ciudad::delete(conn, &id)).await?;
	Ok(done("Ciudad eliminada exitosamente"))
}

// Equipo

pub async fn list_equipos(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<Equipo>>> {
	let req = page_request(&state, params)?;
	let page = state.db.run(move |conn| equipo::list(conn, &req)).await?;
	Ok(Json(page))
}

pub async fn get_equipo(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Equipo>> {
	let id = normalize_code(&id);
	let found = state.db.run(move |conn| equipo::get(conn, &id)).await?;
	Ok(Json(found))
}

pub async fn create_equipo(
	State(state): State<AppState>,
	body: Body<EquipoInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let created = state.db.run(move |conn| equipo::create(conn, input)).await?;
	Ok(Json(json!({
		"message": "Equipo creado exitosamente",
		"CodEquipo": created.cod_equipo,
	})))
}

pub async fn update_equipo(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Body<EquipoInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let id = normalize_code(&id);
	state.db.run(move |conn| equipo::update(conn, &id, input)).await?;
	Ok(done("Equipo actualizado exitosamente"))
}

pub async fn delete_equipo(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Value>> {
	let id = normalize_code(&id);
	state.db.run(move |conn| equipo::delete(conn, &id)).await?;
	Ok(done("Equipo eliminado exitosamente"))
}

// Jugador

pub async fn list_jugadores(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<Jugador>>> {
	let req = page_request(&state, params)?;
	let page = state.db.run(move |conn| jugador::list(conn, &req)).await?;
	Ok(Json(page))
}

pub async fn get_jugador(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Jugador>> {
	let id = normalize_code(&id);
	let found = state.db.run(move |conn| jugador::get(conn, &id)).await?;
	Ok(Json(found))
}

pub async fn create_jugador(
	State(state): State<AppState>,
	body: Body<JugadorInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let created = state.db.run(move |conn| jugador::create(conn, input)).await?;
	Ok(Json(json!({
		"message": "Jugador creado exitosamente",
		"CodJugador": created.cod_jugador,
	})))
}

pub async fn update_jugador(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Body<JugadorInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let id = normalize_code(&id);
	state.db.run(move |conn| jugador::update(conn, &id, input)).await?;
	Ok(done("Jugador actualizado exitosamente"))
}

pub async fn delete_jugador(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Value>> {
	let id = normalize_code(&id);
	state.db.run(move |conn| jugador::delete(conn, &id)).await?;
	Ok(done("Jugador eliminado exitosamente"))
}

// Juego

pub async fn list_juegos(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<Juego>>> {
	let req = page_request(&state, params)?;
	let page = state.db.run(move |conn| juego::list(conn, &req)).await?;
	Ok(Json(page))
}

pub async fn get_juego(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Juego>> {
	let id = normalize_code(&id);
	let found = state.db.run(move |conn| juego::get(conn, &id)).await?;
	Ok(Json(found))
}

pub async fn create_juego(
	State(state): State<AppState>,
	body: Body<JuegoInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let created = state.db.run(move |conn| juego::create(conn, input)).await?;
	Ok(Json(json!({
		"message": "Juego creado exitosamente",
		"CodJuego": created.cod_juego,
	})))
}

pub async fn update_juego(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Body<JuegoInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let id = normalize_code(&id);
	state.db.run(move |conn| juego::update(conn, &id, input)).await?;
	Ok(done("Juego actualizado exitosamente"))
}

pub async fn delete_juego(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Value>> {
	let id = normalize_code(&id);
	state.db.run(move |conn| juego::delete(conn, &id)).await?;
	Ok(done("Juego eliminado exitosamente"))
}

pub async fn game_report(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<GameReport>> {
	let id = normalize_code(&id);
	let report = state.db.run(move |conn| report::game_report(conn, &id)).await?;
	Ok(Json(report))
}

// Estadistica

pub async fn list_estadisticas(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<Estadistica>>> {
	let req = page_request(&state, params)?;
	let page = state.db.run(move |conn| estadistica::list(conn, &req)).await?;
	Ok(Json(page))
}

pub async fn get_estadistica(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Estadistica>> {
	let id = normalize_code(&id);
	let found = state.db.run(move |conn| estadistica::get(conn, &id)).await?;
	Ok(Json(found))
}

pub async fn create_estadistica(
	State(state): State<AppState>,
	body: Body<EstadisticaInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let created = state
		.db
		.run(move |conn| estadistica::create(conn, input))
		.await?;
	Ok(Json(json!({
		"message": "Estadística creada exitosamente",
		"CodEstadistica": created.cod_estadistica,
	})))
}

pub async fn update_estadistica(
	State(state): State<AppState>,
	Path(id): Path<String>,
	body: Body<EstadisticaInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let id = normalize_code(&id);
	state
		.db
		.run(move |conn| estadistica::update(conn, &id, input))
		.await?;
	Ok(done("Estadística actualizada exitosamente"))
}

pub async fn delete_estadistica(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Value>> {
	let id = normalize_code(&id);
	state.db.run(move |conn| estadistica::delete(conn, &id)).await?;
	Ok(done("Estadística eliminada exitosamente"))
}

// EstadisticaJuego

#[derive(Serialize)]
pub struct UpsertResponse {
	message: &'static str,
	#[serde(flatten)]
	outcome: Upsert,
}

fn entry_key((cod_juego, cod_estadistica, cod_jugador): (String, String, String)) -> Key {
	Key {
		cod_juego: normalize_code(&cod_juego),
		cod_estadistica: normalize_code(&cod_estadistica),
		cod_jugador: normalize_code(&cod_jugador),
	}
}

pub async fn list_estadisticas_juego(
	State(state): State<AppState>,
	params: PageParams,
) -> Result<Json<Page<EstadisticaJuego>>> {
	let req = page_request(&state, params)?;
	let page = state
		.db
		.run(move |conn| estadistica_juego::list(conn, &req))
		.await?;
	Ok(Json(page))
}

pub async fn get_estadistica_juego(
	State(state): State<AppState>,
	Path(path): Path<(String, String, String)>,
) -> Result<Json<EstadisticaJuego>> {
	let key = entry_key(path);
	let found = state
		.db
		.run(move |conn| estadistica_juego::get(conn, &key))
		.await?;
	Ok(Json(found))
}

pub async fn upsert_estadistica_juego(
	State(state): State<AppState>,
	body: Body<EstadisticaJuegoInput>,
) -> Result<Json<UpsertResponse>> {
	let Json(input) = body?;
	let outcome = state
		.db
		.run(move |conn| estadistica_juego::upsert(conn, input))
		.await?;
	let message = match outcome {
		Upsert::Created => "Estadística de juego creada exitosamente",
		Upsert::Updated { .. } => "Estadística de juego actualizada exitosamente",
	};
	Ok(Json(UpsertResponse { message, outcome }))
}

pub async fn update_estadistica_juego(
	State(state): State<AppState>,
	Path(path): Path<(String, String, String)>,
	body: Body<CantidadInput>,
) -> Result<Json<Value>> {
	let Json(input) = body?;
	let key = entry_key(path);
	state
		.db
		.run(move |conn| estadistica_juego::update(conn, &key, input))
		.await?;
	Ok(done("Estadística de juego actualizada exitosamente"))
}

pub async fn delete_estadistica_juego(
	State(state): State<AppState>,
	Path(path): Path<(String, String, String)>,
) -> Result<Json<Value>> {
	let key = entry_key(path);
	state
		.db
		.run(move |conn| estadistica_juego::delete(conn, &key))
		.await?;
	Ok(done("Estadística de juego eliminada exitosamente"))
}

