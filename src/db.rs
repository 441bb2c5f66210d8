use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Result};

use crate::error::Error;

/// Handle to the league database. Each request acquires its own short-lived
/// connection; nothing is shared between requests except the file itself.
#[derive(Debug, Clone)]
pub struct Database {
	path: PathBuf,
	busy_timeout: Duration,
}

impl Database {
	/// Opens the database at `path`, creating the schema if it is missing.
	pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
		let db = Self {
			path: path.to_path_buf(),
			busy_timeout,
		};
		let mut conn = db.connect()?;
		create_schema(&mut conn)?;

		Ok(db)
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn connect(&self) -> Result<Connection> {
		let conn = Connection::open(&self.path)?;
		conn.busy_timeout(self.busy_timeout)?;
		conn.execute_batch("PRAGMA foreign_keys = ON;")?;

		Ok(conn)
	}

	/// Runs `f` against a fresh connection on the blocking pool.
	pub async fn run<T, F>(&self, f: F) -> crate::error::Result<T>
	where
		F: FnOnce(&mut Connection) -> crate::error::Result<T> + Send + 'static,
		T: Send + 'static,
	{
		let db = self.clone();
		tokio::task::spawn_blocking(move || {
			let mut conn = db.connect()?;
			f(&mut conn)
		})
		.await
		.map_err(|e| Error::Task(e.to_string()))?
	}
}

pub fn create_schema(conn: &mut Connection) -> Result<()> {
	let tx = conn.transaction()?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS Ciudad (
			CodCiudad TEXT NOT NULL PRIMARY KEY,
			Nombre    TEXT NOT NULL
		);",
		[],
	)?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS Equipo (
			CodEquipo TEXT NOT NULL PRIMARY KEY,
			Nombre    TEXT NOT NULL,
			CodCiudad TEXT NOT NULL REFERENCES Ciudad (CodCiudad)
		);",
		[],
	)?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS Jugador (
			CodJugador  TEXT NOT NULL PRIMARY KEY,
			Nombre1     TEXT NOT NULL,
			Apellido1   TEXT NOT NULL,
			Nombre2     TEXT,
			Apellido2   TEXT,
			CiudadNacim TEXT NOT NULL REFERENCES Ciudad (CodCiudad),
			FechaNacim  TEXT NOT NULL,
			Numero      TEXT NOT NULL,
			CodEquipo   TEXT NOT NULL REFERENCES Equipo (CodEquipo)
		);",
		[],
	)?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS Estadistica (
			CodEstadistica TEXT    NOT NULL PRIMARY KEY,
			Descripcion    TEXT    NOT NULL,
			Valor          INTEGER NOT NULL
								   CHECK (Valor BETWEEN 0 AND 255)
		);",
		[],
	)?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS Juego (
			CodJuego    TEXT NOT NULL PRIMARY KEY,
			Descripcion TEXT NOT NULL,
			Equipo1     TEXT NOT NULL REFERENCES Equipo (CodEquipo),
			Equipo2     TEXT NOT NULL REFERENCES Equipo (CodEquipo),
			Fecha       TEXT NOT NULL,
			CHECK (Equipo1 <> Equipo2)
		);",
		[],
	)?;

	tx.execute(
		"CREATE TABLE IF NOT EXISTS EstadisticaJuego (
			CodJuego       TEXT    NOT NULL REFERENCES Juego (CodJuego),
			CodEstadistica TEXT    NOT NULL REFERENCES Estadistica (CodEstadistica),
			CodJugador     TEXT    NOT NULL REFERENCES Jugador (CodJugador),
			Cantidad       INTEGER NOT NULL
								   CHECK (Cantidad >= 0),
			PRIMARY KEY (CodJuego, CodEstadistica, CodJugador)
		);",
		[],
	)?;

	tx.execute_batch(
		"CREATE INDEX IF NOT EXISTS idx_equipo_ciudad ON Equipo (CodCiudad);
		CREATE INDEX IF NOT EXISTS idx_jugador_ciudad ON Jugador (CiudadNacim);
		CREATE INDEX IF NOT EXISTS idx_jugador_equipo ON Jugador (CodEquipo);
		CREATE INDEX IF NOT EXISTS idx_estadistica_juego_jugador ON EstadisticaJuego (CodJugador);",
	)?;

	tx.commit()
}

#[cfg(test)]
pub(crate) fn scratch_database() -> (tempfile::TempDir, Database) {
	let dir = tempfile::tempdir().expect("tempdir");
	let db = Database::open(&dir.path().join("league.db"), Duration::from_secs(10))
		.expect("open database");
	(dir, db)
}

#[cfg(test)]
pub(crate) fn scratch() -> (tempfile::TempDir, Connection) {
	let (dir, db) = scratch_database();
	let conn = db.connect().expect("connect");
	(dir, conn)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn schema_creation_is_repeatable() {
		let (_dir, mut conn) = scratch();
		create_schema(&mut conn).expect("second create");

		let tables: i64 = conn
			.query_row(
				"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
				[],
				|row| row.get(0),
			)
			.expect("count tables");
		assert_eq!(tables, 6);
	}

	#[test]
	fn foreign_keys_are_enforced() {
		let (_dir, conn) = scratch();
		let err = conn
			.execute(
				"INSERT INTO Equipo (CodEquipo, Nombre, CodCiudad) VALUES ('E01', 'Atoms', 'C99')",
				[],
			)
			.expect_err("dangling city");
		assert_eq!(
			crate::error::constraint_code(&err),
			Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
		);
	}
}
