use std::fmt;
use std::os::raw::c_int;

use rusqlite::{ffi, ErrorCode};

use crate::data::Entity;
use crate::integrity::Dependencies;

pub type Result<T> = std::result::Result<T, Error>;

/// Tag carried by every delete that was blocked by referencing rows.
pub const FOREIGN_KEY_CONSTRAINT: &str = "FOREIGN_KEY_CONSTRAINT";

#[derive(Debug)]
pub enum Error {
	NotFound {
		entity: Entity,
		key: String,
	},
	Validation(String),
	DependencyConflict {
		message: String,
		dependencies: Option<Dependencies>,
	},
	Duplicate {
		entity: Entity,
		key: String,
	},
	InvalidReference(String),
	Storage(rusqlite::Error),
	Task(String),
}

impl Error {
	pub fn not_found(entity: Entity, key: &str) -> Self {
		Self::NotFound {
			entity,
			key: key.to_string(),
		}
	}

	#[must_use]
	pub const fn error_type(&self) -> Option<&'static str> {
		match self {
			Self::DependencyConflict { .. } => Some(FOREIGN_KEY_CONSTRAINT),
			Self::Duplicate { .. } => Some("DUPLICATE_KEY"),
			Self::InvalidReference(_) => Some("INVALID_REFERENCE"),
			Self::Validation(_) => Some("VALIDATION"),
			Self::NotFound { .. } | Self::Storage(_) | Self::Task(_) => None,
		}
	}

	/// Classifies a failed INSERT or UPDATE by the constraint that rejected it.
	pub fn on_write(err: rusqlite::Error, entity: Entity, key: &str) -> Self {
		match constraint_code(&err) {
			Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Self::InvalidReference(format!(
				"{} {key} hace referencia a un registro inexistente",
				entity.label()
			)),
			Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE) => {
				Self::Duplicate {
					entity,
					key: key.to_string(),
				}
			}
			Some(ffi::SQLITE_CONSTRAINT_CHECK) => {
				Self::Validation(format!("{} {key} no cumple las restricciones", entity.label()))
			}
			_ => Self::Storage(err),
		}
	}

	/// Classifies a failed DELETE; a foreign-key rejection becomes the same
	/// conflict shape the pre-delete guard produces, without a breakdown.
	pub fn on_delete(err: rusqlite::Error, entity: Entity, key: &str) -> Self {
		if constraint_code(&err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
			return Self::DependencyConflict {
				message: format!(
					"No se puede eliminar {} {key} porque otros registros dependen de él.",
					entity.label()
				),
				dependencies: None,
			};
		}
		Self::Storage(err)
	}
}

pub(crate) fn constraint_code(err: &rusqlite::Error) -> Option<c_int> {
	match err {
		rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
			Some(e.extended_code)
		}
		_ => None,
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::NotFound { entity, .. } => f.write_str(entity.not_found_message()),
			Self::Validation(message)
			| Self::InvalidReference(message)
			| Self::DependencyConflict { message, .. } => f.write_str(message),
			Self::Duplicate { entity, key } => write!(f, "{} {key} ya existe", entity.label()),
			Self::Storage(err) => write!(f, "storage error: {err}"),
			Self::Task(message) => write!(f, "blocking task failed: {message}"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Storage(err) => Some(err),
			_ => None,
		}
	}
}

impl From<rusqlite::Error> for Error {
	fn from(value: rusqlite::Error) -> Self {
		Self::Storage(value)
	}
}
