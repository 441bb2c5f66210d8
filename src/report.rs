//! Per-game statistic totals and the winner derived from them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::data::Entity;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerLine {
	pub cod_jugador: String,
	pub jugador: String,
	pub numero: String,
	/// Quantity per statistic code.
	pub estadisticas: BTreeMap<String, i64>,
	pub puntos: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TeamTotals {
	pub estadisticas: BTreeMap<String, i64>,
	pub puntos: i64,
}

/// The four result sets of the aggregation, in their unprocessed shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSets {
	pub equipo_local_stats: Vec<PlayerLine>,
	pub equipo_local_total: Vec<TeamTotals>,
	pub equipo_visitante_stats: Vec<PlayerLine>,
	pub equipo_visitante_total: Vec<TeamTotals>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameInfo {
	pub cod_juego: String,
	pub descripcion: String,
	pub fecha: NaiveDate,
	pub equipo_local: Option<String>,
	pub equipo_visitante: Option<String>,
	pub cod_equipo_local: String,
	pub cod_equipo_visitante: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
	pub nombre: Option<String>,
	pub codigo: String,
	pub jugadores: Vec<PlayerLine>,
	pub totales: TeamTotals,
	pub es_ganador: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameReport {
	pub juego: GameInfo,
	pub equipo_local: TeamReport,
	pub equipo_visitante: TeamReport,
	pub empate: bool,
	pub resultados_originales: ResultSets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	Local,
	Visitante,
}

/// Strictly more points wins; equal totals are a draw.
pub fn winner(local: i64, visitante: i64) -> Option<Side> {
	match local.cmp(&visitante) {
		std::cmp::Ordering::Greater => Some(Side::Local),
		std::cmp::Ordering::Less => Some(Side::Visitante),
		std::cmp::Ordering::Equal => None,
	}
}

/// Rolls a game's statistic rows up into per-player and per-team totals.
/// Players count for the team they currently belong to. An unknown game
/// yields empty sets.
pub fn aggregate(conn: &Connection, cod_juego: &str) -> rusqlite::Result<ResultSets> {
	let teams: Option<(String, String)> = conn
		.query_row(
			"SELECT Equipo1, Equipo2 FROM Juego WHERE CodJuego = ?1",
			params![cod_juego],
			|row| Ok((row.get(0)?, row.get(1)?)),
		)
		.optional()?;

	let Some((local, visitante)) = teams else {
		return Ok(ResultSets::default());
	};

	Ok(ResultSets {
		equipo_local_stats: player_lines(conn, cod_juego, &local)?,
		equipo_local_total: vec![team_total(conn, cod_juego, &local)?],
		equipo_visitante_stats: player_lines(conn, cod_juego, &visitante)?,
		equipo_visitante_total: vec![team_total(conn, cod_juego, &visitante)?],
	})
}

fn player_lines(
	conn: &Connection,
	cod_juego: &str,
	cod_equipo: &str,
) -> rusqlite::Result<Vec<PlayerLine>> {
	let mut stmt = conn.prepare(
		"SELECT ju.CodJugador, ju.Nombre1 || ' ' || ju.Apellido1, ju.Numero,
			e.CodEstadistica, SUM(ej.Cantidad), SUM(ej.Cantidad * e.Valor)
		FROM EstadisticaJuego ej
		JOIN Jugador ju ON ju.CodJugador = ej.CodJugador
		JOIN Estadistica e ON e.CodEstadistica = ej.CodEstadistica
		WHERE ej.CodJuego = ?1 AND ju.CodEquipo = ?2
		GROUP BY ju.CodJugador, e.CodEstadistica
		ORDER BY ju.Apellido1, ju.Nombre1, ju.CodJugador, e.CodEstadistica",
	)?;
	let mut rows = stmt.query(params![cod_juego, cod_equipo])?;

	let mut lines: Vec<PlayerLine> = Vec::new();
	while let Some(row) = rows.next()? {
		let cod_jugador: String = row.get(0)?;
		let cod_estadistica: String = row.get(3)?;
		let cantidad: i64 = row.get(4)?;
		let puntos: i64 = row.get(5)?;

		if lines.last().map_or(true, |line| line.cod_jugador != cod_jugador) {
			lines.push(PlayerLine {
				cod_jugador,
				jugador: row.get(1)?,
				numero: row.get(2)?,
				estadisticas: BTreeMap::new(),
				puntos: 0,
			});
		}
		if let Some(line) = lines.last_mut() {
			*line.estadisticas.entry(cod_estadistica).or_insert(0) += cantidad;
			line.puntos += puntos;
		}
	}

	Ok(lines)
}

fn team_total(
	conn: &Connection,
	cod_juego: &str,
	cod_equipo: &str,
) -> rusqlite::Result<TeamTotals> {
	let mut stmt = conn.prepare(
		"SELECT e.CodEstadistica, SUM(ej.Cantidad), SUM(ej.Cantidad * e.Valor)
		FROM EstadisticaJuego ej
		JOIN Jugador ju ON ju.CodJugador = ej.CodJugador
		JOIN Estadistica e ON e.CodEstadistica = ej.CodEstadistica
		WHERE ej.CodJuego = ?1 AND ju.CodEquipo = ?2
		GROUP BY e.CodEstadistica",
	)?;
	let mut rows = stmt.query(params![cod_juego, cod_equipo])?;

	let mut totals = TeamTotals::default();
	while let Some(row) = rows.next()? {
		let cod_estadistica: String = row.get(0)?;
		let cantidad: i64 = row.get(1)?;
		let puntos: i64 = row.get(2)?;

		*totals.estadisticas.entry(cod_estadistica).or_insert(0) += cantidad;
		totals.puntos += puntos;
	}

	Ok(totals)
}

fn game_info(conn: &Connection, cod_juego: &str) -> rusqlite::Result<Option<GameInfo>> {
	conn.query_row(
		"SELECT j.CodJuego, j.Descripcion, j.Fecha, e1.Nombre, e2.Nombre, j.Equipo1, j.Equipo2
		FROM Juego j
		LEFT JOIN Equipo e1 ON j.Equipo1 = e1.CodEquipo
		LEFT JOIN Equipo e2 ON j.Equipo2 = e2.CodEquipo
		WHERE j.CodJuego = ?1",
		params![cod_juego],
		|row| {
			Ok(GameInfo {
				cod_juego: row.get(0)?,
				descripcion: row.get(1)?,
				fecha: row.get(2)?,
				equipo_local: row.get(3)?,
				equipo_visitante: row.get(4)?,
				cod_equipo_local: row.get(5)?,
				cod_equipo_visitante: row.get(6)?,
			})
		},
	)
	.optional()
}

pub fn game_report(conn: &Connection, cod_juego: &str) -> Result<GameReport> {
	let juego =
		game_info(conn, cod_juego)?.ok_or_else(|| Error::not_found(Entity::Juego, cod_juego))?;
	let sets = aggregate(conn, cod_juego)?;

	let local_total = sets.equipo_local_total.first().cloned().unwrap_or_default();
	let visitante_total = sets
		.equipo_visitante_total
		.first()
		.cloned()
		.unwrap_or_default();
	let ganador = winner(local_total.puntos, visitante_total.puntos);

	Ok(GameReport {
		equipo_local: TeamReport {
			nombre: juego.equipo_local.clone(),
			codigo: juego.cod_equipo_local.clone(),
			jugadores: sets.equipo_local_stats.clone(),
			totales: local_total,
			es_ganador: ganador == Some(Side::Local),
		},
		equipo_visitante: TeamReport {
			nombre: juego.equipo_visitante.clone(),
			codigo: juego.cod_equipo_visitante.clone(),
			jugadores: sets.equipo_visitante_stats.clone(),
			totales: visitante_total,
			es_ganador: ganador == Some(Side::Visitante),
		},
		empate: ganador.is_none(),
		juego,
		resultados_originales: sets,
	})
}

/// Plain-text rendering used by the `report` command.
pub fn render(report: &GameReport) -> String {
	let juego = &report.juego;
	let mut string = format!(
		"# {} ({})\n{}\n",
		juego.descripcion,
		juego.cod_juego,
		juego.fecha.format("%d/%m/%Y")
	);

	for team in [&report.equipo_local, &report.equipo_visitante] {
		let nombre = team.nombre.as_deref().unwrap_or(&team.codigo);
		string.push_str(&format!("\n## {nombre} ({})\n```", team.codigo));

		for line in &team.jugadores {
			let stats = line
				.estadisticas
				.iter()
				.map(|(k, v)| format!("{k} {v}"))
				.collect::<Vec<_>>()
				.join(", ");
			string.push_str(&format!(
				"\n#{:<4} {} — {stats} — {} pts",
				line.numero, line.jugador, line.puntos
			));
		}

		string.push_str(&format!("\nTotal: {} pts\n```\n", team.totales.puntos));
	}

	let resultado = if report.empate {
		"Empate".to_string()
	} else {
		let ganador = if report.equipo_local.es_ganador {
			&report.equipo_local
		} else {
			&report.equipo_visitante
		};
		format!(
			"Ganador: {}",
			ganador.nombre.as_deref().unwrap_or(&ganador.codigo)
		)
	};
	string.push_str(&format!("\n{resultado}\n"));

	string
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::scratch;
	use crate::store::fixtures;

	#[test]
	fn winner_needs_strictly_more_points() {
		assert_eq!(winner(80, 75), Some(Side::Local));
		assert_eq!(winner(70, 75), Some(Side::Visitante));
		assert_eq!(winner(80, 80), None);
	}

	#[test]
	fn local_team_wins_eighty_to_seventy_five() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);

		let report = game_report(&conn, &league.game).expect("report");
		assert_eq!(report.equipo_local.totales.puntos, 80);
		assert_eq!(report.equipo_visitante.totales.puntos, 75);
		assert!(report.equipo_local.es_ganador);
		assert!(!report.equipo_visitante.es_ganador);
		assert!(!report.empate);
		assert_eq!(report.equipo_local.nombre.as_deref(), Some("Atoms"));

		let homer = &report.equipo_local.jugadores[0];
		assert_eq!(homer.jugador, "Homer Simpson");
		assert_eq!(homer.puntos, 35);
		assert_eq!(homer.estadisticas.get(&league.triples), Some(&5));
		assert_eq!(
			report.equipo_local.totales.estadisticas.get(&league.points),
			Some(&25)
		);
		assert_eq!(report.resultados_originales.equipo_local_total.len(), 1);
	}

	#[test]
	fn equal_totals_are_a_draw() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		// Barney goes from 15 doubles (30) to 10 doubles and 5 triples (35).
		fixtures::stat(&mut conn, &league.game, &league.points, &league.visitor_players[1], 10);
		fixtures::stat(&mut conn, &league.game, &league.triples, &league.visitor_players[1], 5);

		let report = game_report(&conn, &league.game).expect("report");
		assert_eq!(report.equipo_visitante.totales.puntos, 80);
		assert!(report.empate);
		assert!(!report.equipo_local.es_ganador);
		assert!(!report.equipo_visitante.es_ganador);
		assert!(render(&report).contains("Empate"));
	}

	#[test]
	fn game_without_statistics_is_a_scoreless_draw() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let second = fixtures::game(&conn, "G2", &league.visitor, &league.local);

		let report = game_report(&conn, &second).expect("report");
		assert!(report.equipo_local.jugadores.is_empty());
		assert_eq!(report.equipo_local.totales.puntos, 0);
		assert!(report.empate);
	}

	#[test]
	fn unknown_game_is_not_found() {
		let (_dir, conn) = scratch();
		assert!(matches!(
			game_report(&conn, "NOPE"),
			Err(Error::NotFound { .. })
		));
		assert_eq!(aggregate(&conn, "NOPE").expect("aggregate"), ResultSets::default());
	}

	#[test]
	fn statistics_sharing_a_description_stay_apart() {
		let (_dir, mut conn) = scratch();
		let league = fixtures::league(&mut conn);
		let libre = fixtures::statistic(&conn, "TL", "Triple", 1);
		fixtures::stat(&mut conn, &league.game, &libre, &league.local_players[0], 4);

		let report = game_report(&conn, &league.game).expect("report");
		let homer = &report.equipo_local.jugadores[0];
		assert_eq!(homer.estadisticas.get(&league.triples), Some(&5));
		assert_eq!(homer.estadisticas.get(&libre), Some(&4));
		assert_eq!(homer.puntos, 39);
		assert_eq!(report.equipo_local.totales.estadisticas.get(&libre), Some(&4));
	}
}
