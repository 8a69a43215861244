//! Shared response envelope types for API handlers.
//!
//! Every response carries a top-level `success` flag. Endpoint-specific
//! payloads are flattened next to it with [`SuccessResponse`].

use serde::Serialize;

/// `{ "success": bool, "message": string }` body used for acknowledgements
/// and all error responses.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// `{ "success": true, ...T }` envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessResponse::new(ModelList { models })))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
