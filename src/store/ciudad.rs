use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use tracing::info;

use super::like_pattern;
use crate::codes::{self, CodeKind};
use crate::data::{Ciudad, CiudadInput, Entity, Page, PageRequest};
use crate::error::{Error, Result};
use crate::integrity;

fn from_row(row: &Row) -> rusqlite::Result<Ciudad> {
	Ok(Ciudad {
		cod_ciudad: row.get(0)?,
		nombre: row.get(1)?,
	})
}

pub fn list(conn: &Connection, req: &PageRequest) -> Result<Page<Ciudad>> {
	let pattern = like_pattern(req.search.as_deref());

	let mut stmt = conn.prepare(
		"SELECT CodCiudad, Nombre FROM Ciudad
		WHERE ?1 IS NULL OR Nombre LIKE ?1 ESCAPE '\\'
		ORDER BY Nombre
		LIMIT ?2 OFFSET ?3",
	)?;
	let data = stmt
		.query_map(params![pattern, req.limit, req.offset()], from_row)?
		.collect::<rusqlite::Result<Vec<_>>>()?;

	let total: i64 = conn.query_row(
		"SELECT COUNT(*) FROM Ciudad
		WHERE ?1 IS NULL OR Nombre LIKE ?1 ESCAPE '\\'",
		params![pattern],
		|row| row.get(0),
	)?;

	Ok(Page::new(data, total, req))
}

pub fn get(conn: &Connection, cod_ciudad: &str) -> Result<Ciudad> {
	conn.query_row(
		"SELECT CodCiudad, Nombre FROM Ciudad WHERE CodCiudad = ?1",
		params![cod_ciudad],
		from_row,
	)
	.optional()?
	.ok_or_else(|| Error::not_found(Entity::Ciudad, cod_ciudad))
}

/// Inserts a city under the next "Cnn" code.
pub fn create(conn: &mut Connection, input: CiudadInput) -> Result<Ciudad> {
	let input = input.validate()?;

	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	let cod_ciudad = codes::next_code(&tx, CodeKind::Ciudad)?;
	tx.execute(
		"INSERT INTO Ciudad (CodCiudad, Nombre) VALUES (?1, ?2)",
		params![cod_ciudad, input.nombre],
	)
	.map_err(|e| Error::on_write(e, Entity::Ciudad, &cod_ciudad))?;
	tx.commit()?;

	info!(cod_ciudad = %cod_ciudad, "ciudad created");
	Ok(Ciudad {
		cod_ciudad,
		nombre: input.nombre,
	})
}

pub fn update(conn: &Connection, cod_ciudad: &str, input: CiudadInput) -> Result<Ciudad> {
	let input = input.validate()?;

	let changed = conn
		.execute(
			"UPDATE Ciudad SET Nombre = ?2 WHERE CodCiudad = ?1",
			params![cod_ciudad, input.nombre],
		)
		.map_err(|e| Error::on_write(e, Entity::Ciudad, cod_ciudad))?;
	if changed == 0 {
		return Err(Error::not_found(Entity::Ciudad, cod_ciudad));
	}

	get(conn, cod_ciudad)
}

/// Deletes a city unless a team is based in it or a player was born in it.
pub fn delete(conn: &mut Connection, cod_ciudad: &str) -> Result<()> {
	let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
	get(&tx, cod_ciudad)?;
	integrity::guard_ciudad(&tx, cod_ciudad)?;

	tx.execute("DELETE FROM Ciudad WHERE CodCiudad = ?1", params![cod_ciudad])
		.map_err(|e| Error::on_delete(e, Entity::Ciudad, cod_ciudad))?;
	tx.commit()?;

	info!(cod_ciudad, "ciudad deleted");
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::data::PageQuery;
	use crate::db::{scratch, scratch_database};

	fn springfield() -> CiudadInput {
		CiudadInput {
			nombre: "Springfield".to_string(),
		}
	}

	#[test]
	fn create_generates_sequential_codes() {
		let (_dir, mut conn) = scratch();
		let first = create(&mut conn, springfield()).expect("first");
		let second = create(
			&mut conn,
			CiudadInput {
				nombre: "Shelbyville".to_string(),
			},
		)
		.expect("second");

		assert_eq!(first.cod_ciudad, "C01");
		assert_eq!(second.cod_ciudad, "C02");
	}

	#[test]
	fn search_is_a_parameterized_substring_match() {
		let (_dir, mut conn) = scratch();
		create(&mut conn, springfield()).expect("create");
		create(
			&mut conn,
			CiudadInput {
				nombre: "Capital City".to_string(),
			},
		)
		.expect("create");

		let req = PageRequest::new(
			PageQuery {
				search: Some("field".to_string()),
				..PageQuery::default()
			},
			100,
		);
		let page = list(&conn, &req).expect("list");
		assert_eq!(page.total, 1);
		assert_eq!(page.data[0].nombre, "Springfield");

		let req = PageRequest::new(
			PageQuery {
				search: Some("' OR 1=1 --".to_string()),
				..PageQuery::default()
			},
			100,
		);
		assert_eq!(list(&conn, &req).expect("list").total, 0);
	}

	#[test]
	fn update_and_delete_missing_city_are_not_found() {
		let (_dir, mut conn) = scratch();
		assert!(matches!(
			update(&conn, "C09", springfield()),
			Err(Error::NotFound { .. })
		));
		assert!(matches!(
			delete(&mut conn, "C09"),
			Err(Error::NotFound { .. })
		));
	}

	#[test]
	fn delete_unreferenced_city() {
		let (_dir, mut conn) = scratch();
		let city = create(&mut conn, springfield()).expect("create");
		delete(&mut conn, &city.cod_ciudad).expect("delete");
		assert!(matches!(
			get(&conn, &city.cod_ciudad),
			Err(Error::NotFound { .. })
		));
	}

	#[test]
	fn concurrent_creates_get_distinct_codes() {
		let (_dir, db) = scratch_database();
		let mut codes: Vec<String> = std::thread::scope(|scope| {
			let handles: Vec<_> = (0..8)
				.map(|i| {
					let db = &db;
					scope.spawn(move || {
						let mut conn = db.connect().expect("connect");
						create(
							&mut conn,
							CiudadInput {
								nombre: format!("Ciudad {i}"),
							},
						)
						.expect("create")
						.cod_ciudad
					})
				})
				.collect();
			handles
				.into_iter()
				.map(|h| h.join().expect("join"))
				.collect()
		});

		codes.sort();
		codes.dedup();
		assert_eq!(codes.len(), 8);
		assert_eq!(codes.first().map(String::as_str), Some("C01"));
		assert_eq!(codes.last().map(String::as_str), Some("C08"));
	}

	#[test]
	fn codes_past_ninety_nine_collide() {
		let (_dir, mut conn) = scratch();
		conn.execute(
			"INSERT INTO Ciudad (CodCiudad, Nombre) VALUES ('C99', 'Ogdenville')",
			[],
		)
		.expect("seed");

		let next = create(&mut conn, springfield()).expect("create");
		assert_eq!(next.cod_ciudad, "C100");

		// "C99" still sorts highest, so the same code comes back.
		match create(&mut conn, springfield()) {
			Err(Error::Duplicate { key, .. }) => assert_eq!(key, "C100"),
			other => panic!("expected duplicate, got {other:?}"),
		}
	}
}
