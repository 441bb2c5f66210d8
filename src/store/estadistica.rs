use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::like_pattern;
use crate::data::{required_code, Entity, Estadistica, EstadisticaInput, Page, PageRequest};
use crate::error::{Error, Result};

const FILTER: &str = "?1 IS NULL
	OR Descripcion LIKE ?1 ESCAPE '\\'
	OR CodEstadistica LIKE ?1 ESCAPE '\\'";

fn from_row(row: &Row) -> rusqlite::Result<Estadistica> {
	Ok(Estadistica {
		cod_estadistica: row.get(0)?,
		descripcion: row.get(1)?,
		valor: row.get(2)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<Estadistica>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(&format!(
		"SELECT CodEstadistica, Descripcion, Valor FROM Estadistica
		WHERE {FILTER}
		ORDER BY Descripcion, CodEstadistica
		LIMIT ?2 OFFSET ?3"
	))?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		&format!("SELECT COUNT(*) FROM Estadistica WHERE {FILTER}"),
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, cod_estadistica: &str) -> Result<Estadistica> {
	conn.query_row(
		"SELECT CodEstadistica, Descripcion, Valor FROM Estadistica WHERE CodEstadistica = ?1",
		params![cod_estadistica],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::Estadistica, cod_estadistica))
}

pub fn create(conn: &Connection, input: EstadisticaInput) -> Result<Estadistica> {
	let input = input.validate()?;
	let cod_estadistica = required_code("CodEstadistica", &input.cod_estadistica, 5)?;

	conn.execute(
		"INSERT INTO Estadistica (CodEstadistica, Descripcion, Valor) VALUES (?1, ?2, ?3)",
		params![cod_estadistica, input.descripcion, input.valor],
	)
	.map_err(|e| Error::on_write(e, Entity::Estadistica, &cod_estadistica))?;

	info!(cod_estadistica = %cod_estadistica, "estadistica created");
	get(conn, &cod_estadistica)
}

pub fn update(
	conn: &Connection,
	cod_estadistica: &str,
	input: EstadisticaInput,
) -> Result<Estadistica> {
	let input = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE Estadistica SET Descripcion = ?2, Valor = ?3 WHERE CodEstadistica = ?1",
			params![cod_estadistica, input.descripcion, input.valor],
		)
		.map_err(|e| Error::on_write(e, Entity::Estadistica, cod_estadistica))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Estadistica, cod_estadistica));
	}

	get(conn, cod_estadistica)
}

pub fn delete(conn: &Connection, cod_estadistica: &str) -> Result<()> {
	let changed = conn
		.execute(
			"DELETE FROM Estadistica WHERE CodEstadistica = ?1",
			params![cod_estadistica],
		)
		.map_err(|e| Error::on_delete(e, Entity::Estadistica, cod_estadistica))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Estadistica, cod_estadistica));
	}

	info!(cod_estadistica, "estadistica deleted");
	Ok(())
}
