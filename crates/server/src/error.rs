use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cardline_core::errors::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::{error, warn};
use uuid::Uuid;

pub fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub detail: String,
    pub correlation_id: String,
}

/// Handler error rendered as `{"detail", "correlation_id"}`.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn new(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::GatewayTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                event_name = "server.request.failed",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request failed"
            );
        } else {
            warn!(
                event_name = "server.request.rejected",
                correlation_id = %self.0.correlation_id(),
                status = status.as_u16(),
                error = %self.0,
                "request rejected"
            );
        }

        let body = ErrorBody {
            detail: self.0.detail().to_string(),
            correlation_id: self.0.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Trims an optional request field, treating blank as absent.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApplicationError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApplicationError::missing_field(field))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use cardline_core::errors::ApplicationError;

    use super::{required, ApiError};

    #[test]
    fn statuses_follow_interface_error_kind() {
        let cases = [
            (ApplicationError::missing_field("case_id"), StatusCode::BAD_REQUEST),
            (ApplicationError::not_found("merchant", "M-1"), StatusCode::NOT_FOUND),
            (ApplicationError::Timeout { secs: 30 }, StatusCode::GATEWAY_TIMEOUT),
            (ApplicationError::Service("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApplicationError::Configuration("no key".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::new(error, "req").status(), expected);
        }
    }

    #[test]
    fn blank_fields_count_as_missing() {
        assert_eq!(required(Some(" CUST001 "), "customer_id").expect("present"), "CUST001");
        assert!(required(Some("  "), "customer_id").is_err());
        assert!(required(None, "customer_id").is_err());
    }
}
