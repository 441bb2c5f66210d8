use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
	Ciudad,
	Equipo,
	Jugador,
	Juego,
	Estadistica,
	EstadisticaJuego,
}

impl Entity {
	#[must_use]
	pub const fn label(self) -> &'static str {
		match self {
			Self::Ciudad => "la ciudad",
			Self::Equipo => "el equipo",
			Self::Jugador => "el jugador",
			Self::Juego => "el juego",
			Self::Estadistica => "la estadística",
			Self::EstadisticaJuego => "la estadística de juego",
		}
	}

	#[must_use]
	pub const fn not_found_message(self) -> &'static str {
		match self {
			Self::Ciudad => "Ciudad no encontrada",
			Self::Equipo => "Equipo no encontrado",
			Self::Jugador => "Jugador no encontrado",
			Self::Juego => "Juego no encontrado",
			Self::Estadistica => "Estadística no encontrada",
			Self::EstadisticaJuego => "Estadística de juego no encontrada",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ciudad {
	pub cod_ciudad: String,
	pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Equipo {
	pub cod_equipo: String,
	pub nombre: String,
	pub cod_ciudad: String,
	pub ciudad_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Jugador {
	pub cod_jugador: String,
	pub nombre1: String,
	pub apellido1: String,
	pub nombre2: Option<String>,
	pub apellido2: Option<String>,
	pub ciudad_nacim: String,
	pub fecha_nacim: NaiveDate,
	pub numero: String,
	pub cod_equipo: String,
	pub equipo_nombre: Option<String>,
	pub ciudad_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Juego {
	pub cod_juego: String,
	pub descripcion: String,
	pub equipo1: String,
	pub equipo2: String,
	pub fecha: NaiveDate,
	pub equipo1_nombre: Option<String>,
	pub equipo2_nombre: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Estadistica {
	pub cod_estadistica: String,
	pub descripcion: String,
	pub valor: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstadisticaJuego {
	pub cod_juego: String,
	pub cod_estadistica: String,
	pub cod_jugador: String,
	pub cantidad: i64,
	pub juego_descripcion: Option<String>,
	pub juego_fecha: Option<NaiveDate>,
	pub estadistica_descripcion: Option<String>,
	pub jugador_nombre: Option<String>,
	pub jugador_numero: Option<String>,
	pub equipo_nombre: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CiudadInput {
	pub nombre: String,
}

impl CiudadInput {
	pub fn validate(self) -> Result<Self> {
		Ok(Self {
			nombre: required("Nombre", &self.nombre, 25)?,
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EquipoInput {
	pub nombre: String,
	pub cod_ciudad: String,
}

impl EquipoInput {
	pub fn validate(self) -> Result<Self> {
		Ok(Self {
			nombre: required("Nombre", &self.nombre, 25)?,
			cod_ciudad: required_code("CodCiudad", &self.cod_ciudad, 3)?,
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JugadorInput {
	pub nombre1: String,
	pub apellido1: String,
	pub nombre2: Option<String>,
	pub apellido2: Option<String>,
	pub ciudad_nacim: String,
	pub fecha_nacim: Option<NaiveDate>,
	pub numero: String,
	pub cod_equipo: String,
}

impl JugadorInput {
	pub fn validate(self) -> Result<Self> {
		Ok(Self {
			nombre1: required("Nombre1", &self.nombre1, 15)?,
			apellido1: required("Apellido1", &self.apellido1, 15)?,
			nombre2: optional("Nombre2", self.nombre2.as_deref(), 15)?,
			apellido2: optional("Apellido2", self.apellido2.as_deref(), 15)?,
			ciudad_nacim: required_code("CiudadNacim", &self.ciudad_nacim, 3)?,
			fecha_nacim: Some(required_date("FechaNacim", self.fecha_nacim)?),
			numero: required("Numero", &self.numero, 4)?,
			cod_equipo: required_code("CodEquipo", &self.cod_equipo, 3)?,
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct JuegoInput {
	pub cod_juego: String,
	pub descripcion: String,
	pub equipo1: String,
	pub equipo2: String,
	pub fecha: Option<NaiveDate>,
}

impl JuegoInput {
	/// Checks the descriptive fields; the code itself is only checked on create.
	pub fn validate(self) -> Result<Self> {
		let equipo1 = required_code("Equipo1", &self.equipo1, 3)?;
		let equipo2 = required_code("Equipo2", &self.equipo2, 3)?;
		if equipo1 == equipo2 {
			return Err(Error::Validation(
				"El equipo local y el visitante deben ser distintos".to_string(),
			));
		}

		Ok(Self {
			cod_juego: normalize_code(&self.cod_juego),
			descripcion: required("Descripcion", &self.descripcion, 25)?,
			equipo1,
			equipo2,
			fecha: Some(required_date("Fecha", self.fecha)?),
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EstadisticaInput {
	pub cod_estadistica: String,
	pub descripcion: String,
	pub valor: Option<i64>,
}

impl EstadisticaInput {
	pub fn validate(self) -> Result<Self> {
		let valor = match self.valor {
			Some(v) if (0..=255).contains(&v) => v,
			Some(_) => {
				return Err(Error::Validation(
					"Valor debe estar entre 0 y 255".to_string(),
				))
			}
			None => return Err(Error::Validation("Valor es obligatorio".to_string())),
		};

		Ok(Self {
			cod_estadistica: normalize_code(&self.cod_estadistica),
			descripcion: required("Descripcion", &self.descripcion, 25)?,
			valor: Some(valor),
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EstadisticaJuegoInput {
	pub cod_juego: String,
	pub cod_estadistica: String,
	pub cod_jugador: String,
	pub cantidad: Option<i64>,
}

impl EstadisticaJuegoInput {
	pub fn validate(self) -> Result<Self> {
		Ok(Self {
			cod_juego: required_code("CodJuego", &self.cod_juego, 6)?,
			cod_estadistica: required_code("CodEstadistica", &self.cod_estadistica, 5)?,
			cod_jugador: required_code("CodJugador", &self.cod_jugador, 5)?,
			cantidad: Some(cantidad(self.cantidad)?),
		})
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CantidadInput {
	pub cantidad: Option<i64>,
}

impl CantidadInput {
	pub fn validate(self) -> Result<i64> {
		cantidad(self.cantidad)
	}
}

fn cantidad(value: Option<i64>) -> Result<i64> {
	match value {
		Some(v) if v >= 0 => Ok(v),
		Some(_) => Err(Error::Validation(
			"Cantidad no puede ser negativa".to_string(),
		)),
		None => Err(Error::Validation("Cantidad es obligatoria".to_string())),
	}
}

/// Codes are stored fixed-width and upper-case; callers may send padding.
pub fn normalize_code(code: &str) -> String {
	code.trim().to_uppercase()
}

pub fn required_code(field: &str, value: &str, width: usize) -> Result<String> {
	let code = normalize_code(value);
	if code.is_empty() {
		return Err(Error::Validation(format!("{field} es obligatorio")));
	}
	if code.chars().count() > width {
		return Err(Error::Validation(format!(
			"{field} admite como máximo {width} caracteres"
		)));
	}
	Ok(code)
}

fn required(field: &str, value: &str, max: usize) -> Result<String> {
	let value = value.trim();
	if value.is_empty() {
		return Err(Error::Validation(format!("{field} es obligatorio")));
	}
	if value.chars().count() > max {
		return Err(Error::Validation(format!(
			"{field} admite como máximo {max} caracteres"
		)));
	}
	Ok(value.to_string())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>> {
	match value.map(str::trim) {
		None | Some("") => Ok(None),
		Some(v) => required(field, v, max).map(Some),
	}
}

fn required_date(field: &str, value: Option<NaiveDate>) -> Result<NaiveDate> {
	value.ok_or_else(|| Error::Validation(format!("{field} es obligatoria")))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
	pub search: Option<String>,
	pub page: Option<u32>,
	pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
	pub search: Option<String>,
	pub page: u32,
	pub limit: u32,
}

impl PageRequest {
	pub fn new(query: PageQuery, max_limit: u32) -> Self {
		Self {
			search: query
				.search
				.map(|s| s.trim().to_string())
				.filter(|s| !s.is_empty()),
			page: query.page.unwrap_or(1).max(1),
			limit: query.limit.unwrap_or(10).clamp(1, max_limit.max(1)),
		}
	}

	pub fn offset(&self) -> i64 {
		i64::from(self.page - 1) * i64::from(self.limit)
	}
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
	pub data: Vec<T>,
	pub total: i64,
	pub page: u32,
	pub limit: u32,
	pub total_pages: i64,
}

impl<T> Page<T> {
	pub fn new(data: Vec<T>, total: i64, request: &PageRequest) -> Self {
		let limit = i64::from(request.limit);
		Self {
			data,
			total,
			page: request.page,
			limit: request.limit,
			total_pages: (total + limit - 1) / limit,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn page_request_clamps_inputs() {
		let req = PageRequest::new(
			PageQuery {
				search: Some("   ".to_string()),
				page: Some(0),
				limit: Some(1000),
			},
			100,
		);
		assert_eq!(req.search, None);
		assert_eq!(req.page, 1);
		assert_eq!(req.limit, 100);
		assert_eq!(req.offset(), 0);

		let req = PageRequest::new(
			PageQuery {
				search: None,
				page: Some(3),
				limit: None,
			},
			100,
		);
		assert_eq!(req.offset(), 20);
	}

	#[test]
	fn total_pages_rounds_up() {
		let req = PageRequest::new(PageQuery::default(), 100);
		let page: Page<()> = Page::new(Vec::new(), 21, &req);
		assert_eq!(page.total_pages, 3);
		let page: Page<()> = Page::new(Vec::new(), 0, &req);
		assert_eq!(page.total_pages, 0);
	}

	#[test]
	fn cantidad_must_be_present_and_non_negative() {
		assert!(matches!(cantidad(Some(-1)), Err(Error::Validation(_))));
		assert!(matches!(cantidad(None), Err(Error::Validation(_))));
		assert_eq!(cantidad(Some(0)).expect("zero"), 0);
	}

	#[test]
	fn non_numeric_cantidad_fails_to_decode() {
		let decoded = serde_json::from_str::<CantidadInput>(r#"{"Cantidad": "abc"}"#);
		assert!(decoded.is_err());
	}

	#[test]
	fn juego_rejects_same_team_twice() {
		let input = JuegoInput {
			cod_juego: "G1".to_string(),
			descripcion: "Final".to_string(),
			equipo1: "E01".to_string(),
			equipo2: " e01 ".to_string(),
			fecha: NaiveDate::from_ymd_opt(2024, 5, 1),
		};
		assert!(matches!(input.validate(), Err(Error::Validation(_))));
	}

	#[test]
	fn estadistica_value_must_fit_a_byte() {
		let input = EstadisticaInput {
			cod_estadistica: "T3".to_string(),
			descripcion: "Triple".to_string(),
			valor: Some(256),
		};
		assert!(matches!(input.validate(), Err(Error::Validation(_))));
	}

	#[test]
	fn jugador_blank_optionals_become_none() {
		let input = JugadorInput {
			nombre1: " Bart ".to_string(),
			apellido1: "Simpson".to_string(),
			nombre2: Some("  ".to_string()),
			apellido2: None,
			ciudad_nacim: "c01".to_string(),
			fecha_nacim: NaiveDate::from_ymd_opt(1980, 4, 1),
			numero: "10".to_string(),
			cod_equipo: "E01".to_string(),
		}
		.validate()
		.expect("valid");
		assert_eq!(input.nombre1, "Bart");
		assert_eq!(input.nombre2, None);
		assert_eq!(input.ciudad_nacim, "C01");
	}
}
