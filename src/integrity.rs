//! Pre-delete dependency checks for cities and players.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Result};
use serde::Serialize;
use tracing::info;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Dependencies {
	Ciudad(CiudadDependencies),
	Jugador(JugadorDependencies),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CiudadDependencies {
	pub equipos: i64,
	pub jugadores: i64,
}

impl CiudadDependencies {
	pub fn is_empty(&self) -> bool {
		self.equipos == 0 && self.jugadores == 0
	}

	fn message(&self, cod_ciudad: &str) -> String {
		let mut lines = vec![format!(
			"No se puede eliminar la ciudad {cod_ciudad} porque tiene registros asociados:"
		)];
		if self.equipos > 0 {
			lines.push(format!("- {} equipo(s) con sede en esta ciudad", self.equipos));
		}
		if self.jugadores > 0 {
			lines.push(format!("- {} jugador(es) nacidos en esta ciudad", self.jugadores));
		}
		lines.push("Reasigne o elimine esos registros antes de eliminar la ciudad.".to_string());
		lines.join("\n")
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentGame {
	pub cod_juego: String,
	pub descripcion: String,
	pub fecha: NaiveDate,
	pub registros: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JugadorDependencies {
	/// Statistic rows recorded for the player.
	pub estadisticas: i64,
	/// Distinct games among those rows.
	pub juegos: i64,
	pub detalle_juegos: Vec<DependentGame>,
}

impl JugadorDependencies {
	pub fn is_empty(&self) -> bool {
		self.estadisticas == 0
	}

	fn message(&self, cod_jugador: &str) -> String {
		let mut lines = vec![
			format!(
				"No se puede eliminar el jugador {cod_jugador} porque tiene {} estadística(s) registradas en {} juego(s):",
				self.estadisticas, self.juegos
			),
		];
		for game in &self.detalle_juegos {
			lines.push(format!(
				"- {} ({}) {}: {} registro(s)",
				game.descripcion,
				game.cod_juego,
				game.fecha.format("%d/%m/%Y"),
				game.registros
			));
		}
		lines.push("Elimine esas estadísticas antes de eliminar el jugador.".to_string());
		lines.join("\n")
	}
}

pub fn ciudad_dependencies(conn: &Connection, cod_ciudad: &str) -> Result<CiudadDependencies> {
	conn.query_row(
		"SELECT
			(SELECT COUNT(*) FROM Equipo WHERE CodCiudad = ?1),
			(SELECT COUNT(*) FROM Jugador WHERE CiudadNacim = ?1)",
		params![cod_ciudad],
		|row| {
			Ok(CiudadDependencies {
				equipos: row.get(0)?,
				jugadores: row.get(1)?,
			})
		},
	)
}

pub fn jugador_dependencies(conn: &Connection, cod_jugador: &str) -> Result<JugadorDependencies> {
	let mut stmt = conn.prepare(
		"SELECT j.CodJuego, j.Descripcion, j.Fecha, COUNT(*)
		FROM EstadisticaJuego ej
		JOIN Juego j ON j.CodJuego = ej.CodJuego
		WHERE ej.CodJugador = ?1
		GROUP BY j.CodJuego, j.Descripcion, j.Fecha
		ORDER BY j.Fecha DESC, j.CodJuego",
	)?;

	let detalle_juegos = stmt
		.query_map(params![cod_jugador], |row| {
			Ok(DependentGame {
				cod_juego: row.get(0)?,
				descripcion: row.get(1)?,
				fecha: row.get(2)?,
				registros: row.get(3)?,
			})
		})?
		.collect::<Result<Vec<_>>>()?;

	let estadisticas: i64 = conn.query_row(
		"SELECT COUNT(*) FROM EstadisticaJuego WHERE CodJugador = ?1",
		params![cod_jugador],
		|row| row.get(0),
	)?;

	Ok(JugadorDependencies {
		estadisticas,
		juegos: detalle_juegos.len() as i64,
		detalle_juegos,
	})
}

/// Fails with a dependency conflict while any team or player references the city.
pub fn guard_ciudad(conn: &Connection, cod_ciudad: &str) -> crate::error::Result<()> {
	let deps = ciudad_dependencies(conn, cod_ciudad)?;
	if deps.is_empty() {
		return Ok(());
	}

	info!(
		cod_ciudad,
		equipos = deps.equipos,
		jugadores = deps.jugadores,
		"delete blocked by dependents"
	);
	Err(Error::DependencyConflict {
		message: deps.message(cod_ciudad),
		dependencies: Some(Dependencies::Ciudad(deps)),
	})
}

/// Fails with a dependency conflict while any statistic row references the player.
pub fn guard_jugador(conn: &Connection, cod_jugador: &str) -> crate::error::Result<()> {
	let deps = jugador_dependencies(conn, cod_jugador)?;
	if deps.is_empty() {
		return Ok(());
	}

	info!(
		cod_jugador,
		estadisticas = deps.estadisticas,
		juegos = deps.juegos,
		"delete blocked by dependents"
	);
	Err(Error::DependencyConflict {
		message: deps.message(cod_jugador),
		dependencies: Some(Dependencies::Jugador(deps)),
	})
}
