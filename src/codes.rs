//! Sequential human-readable keys ("C03", "E07", "J12").

use rusqlite::{Connection, OptionalExtension, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
	Ciudad,
	Equipo,
	Jugador,
}

impl CodeKind {
	#[must_use]
	pub const fn prefix(self) -> char {
		match self {
			Self::Ciudad => 'C',
			Self::Equipo => 'E',
			Self::Jugador => 'J',
		}
	}

	#[must_use]
	pub const fn width(self) -> usize {
		2
	}

	const fn max_query(self) -> &'static str {
		match self {
			Self::Ciudad => "SELECT MAX(CodCiudad) FROM Ciudad",
			Self::Equipo => "SELECT MAX(CodEquipo) FROM Equipo",
			Self::Jugador => "SELECT MAX(CodJugador) FROM Jugador",
		}
	}

	pub fn format(self, number: u32) -> String {
		format!("{}{:0width$}", self.prefix(), number, width = self.width())
	}
}

/// Number following the highest stored code. Anything that is not the
/// prefix followed by digits restarts the sequence at 1.
pub fn next_number(max: Option<&str>, prefix: char) -> u32 {
	max.map(str::trim)
		.and_then(|code| code.strip_prefix(prefix))
		.and_then(|digits| digits.trim().parse::<u32>().ok())
		.map_or(1, |n| n + 1)
}

/// Derives the next code for `kind` from the highest stored one.
///
/// Fixed-width zero padding makes the lexicographic MAX equal the numeric
/// one until the suffix outgrows two digits. Callers must run this in the
/// same write transaction as the insert that uses the code.
pub fn next_code(conn: &Connection, kind: CodeKind) -> Result<String> {
	let max: Option<String> = conn
		.query_row(kind.max_query(), [], |row| row.get(0))
		.optional()?
		.flatten();

	Ok(kind.format(next_number(max.as_deref(), kind.prefix())))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::db::scratch;
	use rusqlite::params;

	#[test]
	fn first_code_starts_at_one() {
		assert_eq!(next_number(None, 'C'), 1);
		assert_eq!(CodeKind::Ciudad.format(1), "C01");
	}

	#[test]
	fn increments_the_highest_suffix() {
		assert_eq!(next_number(Some("E07"), 'E'), 8);
		assert_eq!(next_number(Some("J12  "), 'J'), 13);
		assert_eq!(CodeKind::Jugador.format(13), "J13");
	}

	#[test]
	fn unexpected_format_restarts_numbering() {
		assert_eq!(next_number(Some("X07"), 'E'), 1);
		assert_eq!(next_number(Some("Eab"), 'E'), 1);
		assert_eq!(next_number(Some(""), 'C'), 1);
	}

	#[test]
	fn codes_from_storage_are_strictly_increasing() {
		let (_dir, conn) = scratch();
		let mut seen = Vec::new();
		for i in 0..12 {
			let code = next_code(&conn, CodeKind::Ciudad).expect("next code");
			conn.execute(
				"INSERT INTO Ciudad (CodCiudad, Nombre) VALUES (?1, ?2)",
				params![code, format!("Ciudad {i}")],
			)
			.expect("insert");
			seen.push(code);
		}

		assert_eq!(seen.first().map(String::as_str), Some("C01"));
		assert_eq!(seen.last().map(String::as_str), Some("C12"));
		assert!(seen.windows(2).all(|w| w[0] < w[1]));
	}
}
