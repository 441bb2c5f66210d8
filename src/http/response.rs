use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::Error;
use crate::integrity::Dependencies;

const INTERNAL_ERROR: &str = "Error interno del servidor";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
	error: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	error_type: Option<&'static str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	dependencies: Option<&'a Dependencies>,
}

fn status_for(err: &Error) -> StatusCode {
	match err {
		Error::NotFound { .. } => StatusCode::NOT_FOUND,
		Error::Validation(_) | Error::InvalidReference(_) => StatusCode::BAD_REQUEST,
		Error::DependencyConflict { .. } | Error::Duplicate { .. } => StatusCode::CONFLICT,
		Error::Storage(_) | Error::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = status_for(&self);
		let text = if status == StatusCode::INTERNAL_SERVER_ERROR {
			error!(error = %self, "request failed");
			INTERNAL_ERROR.to_string()
		} else {
			self.to_string()
		};
		let dependencies = match &self {
			Error::DependencyConflict { dependencies, .. } => dependencies.as_ref(),
			_ => None,
		};

		let body = ErrorBody {
			error: text,
			error_type: self.error_type(),
			dependencies,
		};
		(status, Json(body)).into_response()
	}
}

impl From<JsonRejection> for Error {
	fn from(rejection: JsonRejection) -> Self {
		Self::Validation(format!("Cuerpo de la solicitud inválido: {}", rejection.body_text()))
	}
}

impl From<QueryRejection> for Error {
	fn from(rejection: QueryRejection) -> Self {
		Self::Validation(format!("Parámetros de consulta inválidos: {}", rejection.body_text()))
	}
}
