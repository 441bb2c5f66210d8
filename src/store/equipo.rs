use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::like_pattern;
use crate::codes::{self, CodeKind};
use crate::data::{Entity, Equipo, EquipoInput, Page, PageRequest};
use crate::error::{Error, Result};

const SELECT: &str = "SELECT e.CodEquipo, e.Nombre, e.CodCiudad, c.Nombre
	FROM Equipo e
	LEFT JOIN Ciudad c ON e.CodCiudad = c.CodCiudad";

fn from_row(row: &Row) -> rusqlite::Result<Equipo> {
	Ok(Equipo {
		cod_equipo: row.get(0)?,
		nombre: row.get(1)?,
		cod_ciudad: row.get(2)?,
		ciudad_nombre: row.get(3)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<Equipo>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(&format!(
		"{SELECT}
		WHERE ?1 IS NULL OR e.Nombre LIKE ?1 ESCAPE '\\'
		ORDER BY e.Nombre
		LIMIT ?2 OFFSET ?3"
	))?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		"SELECT COUNT(*) FROM Equipo e
		WHERE ?1 IS NULL OR e.Nombre LIKE ?1 ESCAPE '\\'",
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, cod_equipo: &str) -> Result<Equipo> {
	conn.query_row(
		&format!("{SELECT} WHERE e.CodEquipo = ?1"),
		params![cod_equipo],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::Equipo, cod_equipo))
}

/// Inserts a team under the next "Enn" code.
pub fn create(conn: &mut Connection, input: EquipoInput) -> Result<Equipo> {
	let input = input.validate()?;

	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	let cod_equipo = codes::next_code(&tx, CodeKind::Equipo)?;
	tx.execute(
		"INSERT INTO Equipo (CodEquipo, Nombre, CodCiudad) VALUES (?1, ?2, ?3)",
		params![cod_equipo, input.nombre, input.cod_ciudad],
	)
	.map_err(|e| Error::on_write(e, Entity::Equipo, &cod_equipo))?;
	let equipo = get(&tx, &cod_equipo)?;
	tx.commit()?;

	info!(cod_equipo = %equipo.cod_equipo, cod_ciudad = %equipo.cod_ciudad, "equipo created");
	Ok(equipo)
}

pub fn update(conn: &Connection, cod_equipo: &str, input: EquipoInput) -> Result<Equipo> {
	let input = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE Equipo SET Nombre = ?2, CodCiudad = ?3 WHERE CodEquipo = ?1",
			params![cod_equipo, input.nombre, input.cod_ciudad],
		)
		.map_err(|e| Error::on_write(e, Entity::Equipo, cod_equipo))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Equipo, cod_equipo));
	}

	get(conn, cod_equipo)
}

/// Deletes a team with no pre-check; only the storage foreign keys stand in
/// the way of removing a team that players or games still reference.
pub fn delete(conn: &Connection, cod_equipo: &str) -> Result<()> {
	let changed = conn
		.execute("DELETE FROM Equipo WHERE CodEquipo = ?1", params![cod_equipo])
		.map_err(|e| Error::on_delete(e, Entity::Equipo, cod_equipo))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Equipo, cod_equipo));
	}

	info!(cod_equipo, "equipo deleted");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::scratch;
	use crate::store::fixtures;

	#[test]
	fn create_joins_city_name() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let equipo = get(&conn, &league.local).expect("get");

		assert_eq!(equipo.cod_equipo, "E01");
		assert_eq!(equipo.ciudad_nombre.as_deref(), Some("Springfield"));
		assert_eq!(league.visitor, "E02");
	}

	#[test]
	fn unknown_city_is_an_invalid_reference() {
		let (_dir, mut conn) = scratch();
		let err = create(
			&mut conn,
			EquipoInput {
				nombre: "Atoms".to_string(),
				cod_ciudad: "C42".to_string(),
			},
		)
		.expect_err("dangling city");
		assert!(matches!(err, Error::InvalidReference(_)));
	}

	#[test]
	fn referenced_team_delete_surfaces_storage_conflict() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);

		match delete(&conn, &league.local) {
			Err(Error::DependencyConflict { dependencies, .. }) => assert!(dependencies.is_none()),
			other => panic!("expected conflict, got {other:?}"),
		}
	}
}
