//! Error type shared by every Agora crate.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::types::ItemId;

pub type AgResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	PermissionDenied,
	DbError,
	/// An order proposal failed structural validation. Nothing was written.
	MalformedProposal(String),
	/// A parent chain loops back on itself. Stored data is inconsistent.
	Cycle(ItemId),
	/// A write would break a tree invariant (content on a parent, foreign menu type, ...)
	InvariantViolation(String),
	ValidationError(String),
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::ValidationError(err.to_string())
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::DbError => write!(f, "database error"),
			Error::MalformedProposal(msg) => write!(f, "malformed order proposal: {}", msg),
			Error::Cycle(id) => write!(f, "cycle in menu tree at item {}", id),
			Error::InvariantViolation(msg) => write!(f, "menu invariant violated: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

#[derive(Serialize)]
struct ErrorBody {
	code: &'static str,
	message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
	error: ErrorBody,
}

impl Error {
	fn status_and_code(&self) -> (StatusCode, &'static str) {
		match self {
			Error::NotFound => (StatusCode::NOT_FOUND, "E-NOTFOUND"),
			Error::PermissionDenied => (StatusCode::FORBIDDEN, "E-PERM"),
			Error::MalformedProposal(_) => (StatusCode::BAD_REQUEST, "E-PROPOSAL"),
			Error::ValidationError(_) => (StatusCode::BAD_REQUEST, "E-VALIDATION"),
			Error::InvariantViolation(_) => (StatusCode::CONFLICT, "E-INVARIANT"),
			Error::Cycle(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E-CYCLE"),
			Error::DbError => (StatusCode::INTERNAL_SERVER_ERROR, "E-DB"),
			Error::Internal(_) | Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "E-INTERNAL"),
		}
	}
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let (status, code) = self.status_and_code();
		let message = if status.is_server_error() {
			tracing::error!(error = %self, "Request failed");
			"internal server error".to_string()
		} else {
			self.to_string()
		};
		(status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_client_errors_keep_their_message() {
		let err = Error::MalformedProposal("duplicate item 3".into());
		assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);
		assert_eq!(err.to_string(), "malformed order proposal: duplicate item 3");
	}

	#[test]
	fn test_cycle_is_a_server_fault() {
		let (status, code) = Error::Cycle(ItemId(7)).status_and_code();
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert_eq!(code, "E-CYCLE");
	}
}

// vim: ts=4
