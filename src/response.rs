use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

/// Uniform envelope wrapped around every response body, success or failure.
///
/// ```json
/// { "statusCode": 200, "data": { ... }, "message": "Cart fetched successfully", "success": true }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.is_success(),
        }
    }

    /// Render the envelope with its own status code.
    pub fn respond(self) -> HttpResponse {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        HttpResponse::build(status).json(self)
    }
}

impl ApiResponse<()> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, None, message)
    }
}

/// 200 OK with `data` in the envelope.
pub fn ok<T: Serialize>(data: T, message: &str) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, Some(data), message).respond()
}

/// 201 Created with `data` in the envelope.
pub fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    ApiResponse::new(StatusCode::CREATED, Some(data), message).respond()
}
