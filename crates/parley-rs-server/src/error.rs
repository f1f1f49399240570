use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{debug, error};
use parley_rs_core::NegotiationError;
use serde_json::{Map, Value, json};

/// Error surfaced at the HTTP boundary.
#[derive(Debug)]
pub enum ApiError {
    /// Body was not valid JSON for the route.
    InvalidJson(JsonRejection),
    Negotiation(NegotiationError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Negotiation(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Negotiation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        let mut body = Map::new();
        match self {
            ApiError::InvalidJson(_) => {
                body.insert("error".to_string(), json!("Invalid JSON"));
            }
            ApiError::Negotiation(err) => {
                body.insert("error".to_string(), json!(err.to_string()));
                if let Some(kind) = err.kind() {
                    body.insert("type".to_string(), json!(kind));
                }
            }
        }
        Value::Object(body)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidJson(rejection)
    }
}

impl From<NegotiationError> for ApiError {
    fn from(err: NegotiationError) -> Self {
        ApiError::Negotiation(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::InvalidJson(rejection) => {
                debug!("rejected request body (reason={})", rejection.body_text());
            }
            ApiError::Negotiation(err) if status.is_server_error() => {
                error!("negotiation failed (error={})", err);
            }
            ApiError::Negotiation(err) => {
                debug!("invalid request (error={})", err);
            }
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use axum::http::StatusCode;
    use parley_rs_core::NegotiationError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn missing_field_is_bad_request() {
        let err = ApiError::from(NegotiationError::MissingField("userPrompt"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body(), json!({ "error": "'userPrompt' is required." }));
    }

    #[test]
    fn upstream_error_carries_type() {
        let err = ApiError::from(NegotiationError::Upstream {
            kind: "HttpError".to_string(),
            message: "connection reset".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.body(),
            json!({ "error": "Model API error: connection reset", "type": "HttpError" })
        );
    }

    #[test]
    fn empty_response_has_no_type() {
        let err = ApiError::from(NegotiationError::EmptyResponse);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body(), json!({ "error": "Empty response from model" }));
    }
}
