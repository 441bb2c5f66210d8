//! Row-level operations for each table. Every function takes a borrowed
//! connection so callers decide where it comes from.

pub mod ciudad;
pub mod equipo;
pub mod estadistica;
pub mod estadistica_juego;
pub mod juego;
pub mod jugador;

/// Substring pattern for a `LIKE ?n ESCAPE '\'` filter, or `None` for no filter.
pub(crate) fn like_pattern(search: Option<&str>) -> Option<String> {
	let term = search.map(str::trim).filter(|s| !s.is_empty())?;
	let mut pattern = String::with_capacity(term.len() + 2);
	pattern.push('%');
	for c in term.chars() {
		if matches!(c, '%' | '_' | '\\') {
			pattern.push('\\');
		}
		pattern.push(c);
	}
	pattern.push('%');
	Some(pattern)
}

#[cfg(test)]
pub(crate) mod fixtures {
	use chrono::NaiveDate;
	use rusqlite::Connection;

	use super::*;
	use crate::data::{
		CiudadInput, EquipoInput, EstadisticaInput, EstadisticaJuegoInput, JuegoInput,
		JugadorInput,
	};

	pub struct League {
		pub ciudad: String,
		pub local: String,
		pub visitor: String,
		pub game: String,
		pub points: String,
		pub triples: String,
		pub local_players: Vec<String>,
		pub visitor_players: Vec<String>,
	}

	/// One city, two teams with two players each, and game "G1" where the
	/// local side scores 80 points and the visitor 75.
	pub fn league(conn: &mut Connection) -> League {
		let ciudad = ciudad::create(
			conn,
			CiudadInput {
				nombre: "Springfield".to_string(),
			},
		)
		.expect("ciudad")
		.cod_ciudad;
		let local = team(conn, "Atoms", &ciudad);
		let visitor = team(conn, "Isotopes", &ciudad);
		let local_players = vec![
			player(conn, "Homer", &ciudad, &local),
			player(conn, "Lenny", &ciudad, &local),
		];
		let visitor_players = vec![
			player(conn, "Moe", &ciudad, &visitor),
			player(conn, "Barney", &ciudad, &visitor),
		];
		let points = statistic(conn, "P2", "Canasta doble", 2);
		let triples = statistic(conn, "P3", "Triple", 3);
		let game = game(conn, "G1", &local, &visitor);

		stat(conn, &game, &points, &local_players[0], 10);
		stat(conn, &game, &triples, &local_players[0], 5);
		stat(conn, &game, &points, &local_players[1], 15);
		stat(conn, &game, &triples, &local_players[1], 5);
		stat(conn, &game, &points, &visitor_players[0], 12);
		stat(conn, &game, &triples, &visitor_players[0], 7);
		stat(conn, &game, &points, &visitor_players[1], 15);

		League {
			ciudad,
			local,
			visitor,
			game,
			points,
			triples,
			local_players,
			visitor_players,
		}
	}

	pub fn team(conn: &mut Connection, nombre: &str, ciudad: &str) -> String {
		equipo::create(
			conn,
			EquipoInput {
				nombre: nombre.to_string(),
				cod_ciudad: ciudad.to_string(),
			},
		)
		.expect("equipo")
		.cod_equipo
	}

	pub fn player(conn: &mut Connection, nombre: &str, ciudad: &str, equipo: &str) -> String {
		jugador::create(
			conn,
			JugadorInput {
				nombre1: nombre.to_string(),
				apellido1: "Simpson".to_string(),
				nombre2: None,
				apellido2: None,
				ciudad_nacim: ciudad.to_string(),
				fecha_nacim: NaiveDate::from_ymd_opt(1980, 5, 12),
				numero: "7".to_string(),
				cod_equipo: equipo.to_string(),
			},
		)
		.expect("jugador")
		.cod_jugador
	}

	pub fn statistic(conn: &Connection, code: &str, descripcion: &str, valor: i64) -> String {
		estadistica::create(
			conn,
			EstadisticaInput {
				cod_estadistica: code.to_string(),
				descripcion: descripcion.to_string(),
				valor: Some(valor),
			},
		)
		.expect("estadistica")
		.cod_estadistica
	}

	pub fn game(conn: &Connection, code: &str, local: &str, visitor: &str) -> String {
		juego::create(
			conn,
			JuegoInput {
				cod_juego: code.to_string(),
				descripcion: format!("Juego {code}"),
				equipo1: local.to_string(),
				equipo2: visitor.to_string(),
				fecha: NaiveDate::from_ymd_opt(2024, 3, 15),
			},
		)
		.expect("juego")
		.cod_juego
	}

	pub fn stat(conn: &mut Connection, game: &str, statistic: &str, player: &str, cantidad: i64) {
		estadistica_juego::upsert(
			conn,
			EstadisticaJuegoInput {
				cod_juego: game.to_string(),
				cod_estadistica: statistic.to_string(),
				cod_jugador: player.to_string(),
				cantidad: Some(cantidad),
			},
		)
		.expect("estadistica juego");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn like_pattern_escapes_wildcards() {
		assert_eq!(like_pattern(None), None);
		assert_eq!(like_pattern(Some("  ")), None);
		assert_eq!(like_pattern(Some("ana")).as_deref(), Some("%ana%"));
		assert_eq!(like_pattern(Some("50%_")).as_deref(), Some("%50\\%\\_%"));
	}
}
