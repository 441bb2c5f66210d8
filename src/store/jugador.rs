use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::like_pattern;
use crate::codes::{self, CodeKind};
use crate::data::{Entity, Jugador, JugadorInput, Page, PageRequest};
use crate::error::{Error, Result};
use crate::integrity;

const SELECT: &str = "SELECT j.CodJugador, j.Nombre1, j.Apellido1, j.Nombre2, j.Apellido2,
		j.CiudadNacim, j.FechaNacim, j.Numero, j.CodEquipo, e.Nombre, c.Nombre
	FROM Jugador j
	LEFT JOIN Equipo e ON j.CodEquipo = e.CodEquipo
	LEFT JOIN Ciudad c ON j.CiudadNacim = c.CodCiudad";

const FILTER: &str = "?1 IS NULL
	OR j.Nombre1 LIKE ?1 ESCAPE '\\'
	OR j.Apellido1 LIKE ?1 ESCAPE '\\'
	OR j.Numero LIKE ?1 ESCAPE '\\'";

fn from_row(row: &Row) -> rusqlite::Result<Jugador> {
	Ok(Jugador {
		cod_jugador: row.get(0)?,
		nombre1: row.get(1)?,
		apellido1: row.get(2)?,
		nombre2: row.get(3)?,
		apellido2: row.get(4)?,
		ciudad_nacim: row.get(5)?,
		fecha_nacim: row.get(6)?,
		numero: row.get(7)?,
		cod_equipo: row.get(8)?,
		equipo_nombre: row.get(9)?,
		ciudad_nombre: row.get(10)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<Jugador>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(&format!(
		"{SELECT}
		WHERE {FILTER}
		ORDER BY j.Apellido1, j.Nombre1
		LIMIT ?2 OFFSET ?3"
	))?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		&format!("SELECT COUNT(*) FROM Jugador j WHERE {FILTER}"),
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, cod_jugador: &str) -> Result<Jugador> {
	conn.query_row(
		&format!("{SELECT} WHERE j.CodJugador = ?1"),
		params![cod_jugador],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::Jugador, cod_jugador))
}

/// Inserts a player under the next "Jnn" code.
pub fn create(conn: &mut Connection, input: JugadorInput) -> Result<Jugador> {
	let input = input.validate()?;

	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	let cod_jugador = codes::next_code(&tx, CodeKind::Jugador)?;
	tx.execute(
		"INSERT INTO Jugador (CodJugador, Nombre1, Apellido1, Nombre2, Apellido2,
			CiudadNacim, FechaNacim, Numero, CodEquipo)
		VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
		params![
			cod_jugador,
			input.nombre1,
			input.apellido1,
			input.nombre2,
			input.apellido2,
			input.ciudad_nacim,
			input.fecha_nacim,
			input.numero,
			input.cod_equipo,
		],
	)
	.map_err(|e| Error::on_write(e, Entity::Jugador, &cod_jugador))?;
	let jugador = get(&tx, &cod_jugador)?;
	tx.commit()?;

	info!(
		cod_jugador = %jugador.cod_jugador,
		cod_equipo = %jugador.cod_equipo,
		"jugador created"
	);
	Ok(jugador)
}

pub fn update(conn: &Connection, cod_jugador: &str, input: JugadorInput) -> Result<Jugador> {
	let input = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE Jugador SET
				Nombre1 = ?2,
				Apellido1 = ?3,
				Nombre2 = ?4,
				Apellido2 = ?5,
				CiudadNacim = ?6,
				FechaNacim = ?7,
				Numero = ?8,
				CodEquipo = ?9
			WHERE CodJugador = ?1",
			params![
				cod_jugador,
				input.nombre1,
				input.apellido1,
				input.nombre2,
				input.apellido2,
				input.ciudad_nacim,
				input.fecha_nacim,
				input.numero,
				input.cod_equipo,
			],
		)
		.map_err(|e| Error::on_write(e, Entity::Jugador, cod_jugador))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Jugador, cod_jugador));
	}

	get(conn, cod_jugador)
}

/// Deletes a player unless statistics were recorded for them.
pub fn delete(conn: &mut Connection, cod_jugador: &str) -> Result<()> {
	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	get(&tx, cod_jugador)?;
	integrity::guard_jugador(&tx, cod_jugador)?;

	tx.execute(
		"DELETE FROM Jugador WHERE CodJugador = ?1",
		params![cod_jugador],
	)
	.map_err(|e| Error::on_delete(e, Entity::Jugador, cod_jugador))?;
	tx.commit()?;

	info!(cod_jugador, "jugador deleted");
	Ok(())
}
