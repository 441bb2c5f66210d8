use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::like_pattern;
use crate::data::{required_code, Entity, Juego, JuegoInput, Page, PageRequest};
use crate::error::{Error, Result};

const SELECT: &str = "SELECT j.CodJuego, j.Descripcion, j.Equipo1, j.Equipo2, j.Fecha,
		e1.Nombre, e2.Nombre
	FROM Juego j
	LEFT JOIN Equipo e1 ON j.Equipo1 = e1.CodEquipo
	LEFT JOIN Equipo e2 ON j.Equipo2 = e2.CodEquipo";

const FILTER: &str = "?1 IS NULL
	OR j.Descripcion LIKE ?1 ESCAPE '\\'
	OR j.CodJuego LIKE ?1 ESCAPE '\\'";

fn from_row(row: &Row) -> rusqlite::Result<Juego> {
	Ok(Juego {
		cod_juego: row.get(0)?,
		descripcion: row.get(1)?,
		equipo1: row.get(2)?,
		equipo2: row.get(3)?,
		fecha: row.get(4)?,
		equipo1_nombre: row.get(5)?,
		equipo2_nombre: row.get(6)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<Juego>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(&format!(
		"{SELECT}
		WHERE {FILTER}
		ORDER BY j.Fecha DESC, j.CodJuego
		LIMIT ?2 OFFSET ?3"
	))?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		&format!("SELECT COUNT(*) FROM Juego j WHERE {FILTER}"),
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, cod_juego: &str) -> Result<Juego> {
	conn.query_row(
		&format!("{SELECT} WHERE j.CodJuego = ?1"),
		params![cod_juego],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::Juego, cod_juego))
}

/// Inserts a game under the caller-supplied code.
pub fn create(conn: &Connection, input: JuegoInput) -> Result<Juego> {
	let input = input.validate()?;
	let cod_juego = required_code("CodJuego", &input.cod_juego, 6)?;

	conn.execute(
		"INSERT INTO Juego (CodJuego, Descripcion, Equipo1, Equipo2, Fecha)
		VALUES (?1, ?2, ?3, ?4, ?5)",
		params![
			cod_juego,
			input.descripcion,
			input.equipo1,
			input.equipo2,
			input.fecha,
		],
	)
	.map_err(|e| Error::on_write(e, Entity::Juego, &cod_juego))?;

	info!(
		cod_juego = %cod_juego,
		equipo1 = %input.equipo1,
		equipo2 = %input.equipo2,
		"juego created"
	);
	get(conn, &cod_juego)
}

pub fn update(conn: &Connection, cod_juego: &str, input: JuegoInput) -> Result<Juego> {
	let input = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE Juego SET
				Descripcion = ?2,
				Equipo1 = ?3,
				Equipo2 = ?4,
				Fecha = ?5
			WHERE CodJuego = ?1",
			params![
				cod_juego,
				input.descripcion,
				input.equipo1,
				input.equipo2,
				input.fecha,
			],
		)
		.map_err(|e| Error::on_write(e, Entity::Juego, cod_juego))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Juego, cod_juego));
	}

	get(conn, cod_juego)
}

/// Deletes a game with no pre-check; statistic rows still referencing it
/// make the storage layer refuse.
pub fn delete(conn: &Connection, cod_juego: &str) -> Result<()> {
	let changed = conn
		.execute("DELETE FROM Juego WHERE CodJuego = ?1", params![cod_juego])
		.map_err(|e| Error::on_delete(e, Entity::Juego, cod_juego))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Juego, cod_juego));
	}

	info!(cod_juego, "juego deleted");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::scratch;
	use crate::store::fixtures;
	use chrono::NaiveDate;

	#[test]
	fn duplicate_code_is_rejected() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let err = create(
			&conn,
			JuegoInput {
				cod_juego: league.game.clone(),
				descripcion: "Revancha".to_string(),
				equipo1: league.visitor.clone(),
				equipo2: league.local.clone(),
				fecha: NaiveDate::from_ymd_opt(2024, 4, 1),
			},
		)
		.expect_err("duplicate");
		assert!(matches!(err, Error::Duplicate { .. }));
	}

	#[test]
	fn storage_refuses_a_team_playing_itself() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let err = conn
			.execute(
				"UPDATE Juego SET Equipo2 = Equipo1 WHERE CodJuego = ?1",
				params![league.game],
			)
			.expect_err("check constraint");
		assert_eq!(
			crate::error::constraint_code(&err),
			Some(rusqlite::ffi::SQLITE_CONSTRAINT_CHECK)
		);
	}

	#[test]
	fn update_keeps_the_path_code() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let juego = update(
			&conn,
			&league.game,
			JuegoInput {
				cod_juego: "OTHER".to_string(),
				descripcion: "Final".to_string(),
				equipo1: league.visitor.clone(),
				equipo2: league.local.clone(),
				fecha: NaiveDate::from_ymd_opt(2024, 6, 1),
			},
		)
		.expect("update");

		assert_eq!(juego.cod_juego, league.game);
		assert_eq!(juego.equipo1_nombre.as_deref(), Some("Isotopes"));
	}
}
