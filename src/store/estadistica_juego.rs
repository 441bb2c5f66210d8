use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::Serialize;
use tracing::info;

use super::like_pattern;
use crate::data::{
	CantidadInput, Entity, EstadisticaJuego, EstadisticaJuegoInput, Page, PageRequest,
};
use crate::error::{Error, Result};

const SELECT: &str = "SELECT ej.CodJuego, ej.CodEstadistica, ej.CodJugador, ej.Cantidad,
		j.Descripcion, j.Fecha, e.Descripcion,
		ju.Nombre1 || ' ' || ju.Apellido1, ju.Numero, eq.Nombre
	FROM EstadisticaJuego ej
	LEFT JOIN Juego j ON ej.CodJuego = j.CodJuego
	LEFT JOIN Estadistica e ON ej.CodEstadistica = e.CodEstadistica
	LEFT JOIN Jugador ju ON ej.CodJugador = ju.CodJugador
	LEFT JOIN Equipo eq ON ju.CodEquipo = eq.CodEquipo";

const FILTER: &str = "?1 IS NULL
	OR j.Descripcion LIKE ?1 ESCAPE '\\'
	OR ju.Nombre1 LIKE ?1 ESCAPE '\\'
	OR ju.Apellido1 LIKE ?1 ESCAPE '\\'";

const BY_KEY: &str = "ej.CodJuego = ?1 AND ej.CodEstadistica = ?2 AND ej.CodJugador = ?3";

/// Composite key of a statistic entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
	pub cod_juego: String,
	pub cod_estadistica: String,
	pub cod_jugador: String,
}

impl Key {
	fn describe(&self) -> String {
		format!(
			"{}/{}/{}",
			self.cod_juego, self.cod_estadistica, self.cod_jugador
		)
	}
}

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Upsert {
	Created,
	Updated {
		#[serde(rename = "previousValue")]
		previous: i64,
	},
}

fn from_row(row: &Row) -> rusqlite::Result<EstadisticaJuego> {
	Ok(EstadisticaJuego {
		cod_juego: row.get(0)?,
		cod_estadistica: row.get(1)?,
		cod_jugador: row.get(2)?,
		cantidad: row.get(3)?,
		juego_descripcion: row.get(4)?,
		juego_fecha: row.get(5)?,
		estadistica_descripcion: row.get(6)?,
		jugador_nombre: row.get(7)?,
		jugador_numero: row.get(8)?,
		equipo_nombre: row.get(9)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<EstadisticaJuego>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(&format!(
		"{SELECT}
		WHERE {FILTER}
		ORDER BY j.Fecha DESC, ej.CodJuego, ej.CodJugador, ej.CodEstadistica
		LIMIT ?2 OFFSET ?3"
	))?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		&format!(
			"SELECT COUNT(*) FROM EstadisticaJuego ej
			LEFT JOIN Juego j ON ej.CodJuego = j.CodJuego
			LEFT JOIN Jugador ju ON ej.CodJugador = ju.CodJugador
			WHERE {FILTER}"
		),
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, key: &Key) -> Result<EstadisticaJuego> {
	conn.query_row(
		&format!("{SELECT} WHERE {BY_KEY}"),
		params![key.cod_juego, key.cod_estadistica, key.cod_jugador],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::EstadisticaJuego, &key.describe()))
}

/// Records a quantity for (game, statistic, player), overwriting the
/// existing entry for that triple instead of adding a second one.
pub fn upsert(conn: &mut Connection, input: EstadisticaJuegoInput) -> Result<Upsert> {
	let input = input.validate()?;
	let cantidad = input.cantidad.unwrap_or_default();
	let key = Key {
		cod_juego: input.cod_juego,
		cod_estadistica: input.cod_estadistica,
		cod_jugador: input.cod_jugador,
	};

	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	let previous: Option<i64> = tx
		.query_row(
			&format!("SELECT Cantidad FROM EstadisticaJuego ej WHERE {BY_KEY}"),
			params![key.cod_juego, key.cod_estadistica, key.cod_jugador],
			|row| row.get(0),
		)
		.optional()?;
	tx.execute(
		"INSERT INTO EstadisticaJuego (CodJuego, CodEstadistica, CodJugador, Cantidad)
		VALUES (?1, ?2, ?3, ?4)
		ON CONFLICT (CodJuego, CodEstadistica, CodJugador)
		DO UPDATE SET Cantidad = excluded.Cantidad",
		params![key.cod_juego, key.cod_estadistica, key.cod_jugador, cantidad],
	)
	.map_err(|e| Error::on_write(e, Entity::EstadisticaJuego, &key.describe()))?;
	tx.commit()?;

	let outcome = match previous {
		Some(previous) => Upsert::Updated { previous },
		None => Upsert::Created,
	};
	info!(key = %key.describe(), cantidad, outcome = ?outcome, "estadistica juego recorded");
	Ok(outcome)
}

pub fn update(conn: &Connection, key: &Key, input: CantidadInput) -> Result<EstadisticaJuego> {
	let cantidad = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE EstadisticaJuego SET Cantidad = ?4
			WHERE CodJuego = ?1 AND CodEstadistica = ?2 AND CodJugador = ?3",
			params![key.cod_juego, key.cod_estadistica, key.cod_jugador, cantidad],
		)
		.map_err(|e| Error::on_write(e, Entity::EstadisticaJuego, &key.describe()))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::EstadisticaJuego, &key.describe()));
	}

	get(conn, key)
}

pub fn delete(conn: &Connection, key: &Key) -> Result<()> {
	let changed = conn
		.execute(
			"DELETE FROM EstadisticaJuego
			WHERE CodJuego = ?1 AND CodEstadistica = ?2 AND CodJugador = ?3",
			params![key.cod_juego, key.cod_estadistica, key.cod_jugador],
		)
		.map_err(|e| Error::on_delete(e, Entity::EstadisticaJuego, &key.describe()))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::EstadisticaJuego, &key.describe()));
	}

	info!(key = %key.describe(), "estadistica juego deleted");
	Ok(())
}
