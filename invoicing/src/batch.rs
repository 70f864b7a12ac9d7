use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::error::InvoiceError;

/// Outcome of one batch invocation, in the structured form the host
/// reports upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl BatchResponse {
    /// Folds per-record results into the batch contract: every record was
    /// attempted; if any failed, the whole batch reports a 500 carrying
    /// the first error, triggering upstream redelivery of the entire
    /// batch. Side effects of records that already succeeded stay
    /// applied, so every per-record operation must be safe to repeat.
    pub fn aggregate(results: Vec<Result<(), InvoiceError>>, success_body: &str) -> Self {
        match results.into_iter().find_map(Result::err) {
            None => Self {
                status_code: 200,
                body: success_body.to_string(),
            },
            Some(error) => Self {
                status_code: 500,
                body: format!("Error processing records: {error}"),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

impl IntoResponse for BatchResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, self.body).into_response()
    }
}
