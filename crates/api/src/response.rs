//! Response envelope
//!
//! Every handler answers with an [`ApiResponse`]: a status code and a JSON
//! body of the form `{"success": true, "data": ...}` or
//! `{"success": false, "error": "..."}`.

use formai_core::{FormError, FormResult};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

/// Status and JSON body returned by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// 200 with `data` in the success envelope
    pub fn ok<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status: 200,
                body: json!({ "success": true, "data": data }),
            },
            Err(e) => Self::error(&FormError::from(e)),
        }
    }

    /// Error envelope with the status for the error's kind
    pub fn error(err: &FormError) -> Self {
        let status = err.kind().status_code();
        if status >= 500 {
            error!("Request failed ({}): {}", status, err);
        } else {
            warn!("Request rejected ({}): {}", status, err);
        }

        Self {
            status,
            body: json!({ "success": false, "error": err.to_string() }),
        }
    }

    pub fn from_result<T: Serialize>(result: FormResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(&data),
            Err(err) => Self::error(&err),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `data` member of a success body
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }

    /// The `error` member of a failure body
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}
