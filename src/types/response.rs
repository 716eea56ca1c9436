//! Response helpers shared by the JSON handlers.

use axum::{
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::export::ExportFile;

/// Created response helper (common pattern for POST endpoints)
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// No content response helper (common pattern for DELETE endpoints)
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Report sent as a file download
pub struct Attachment(pub ExportFile);

impl IntoResponse for Attachment {
    fn into_response(self) -> Response {
        let file = self.0;
        let disposition = match HeaderValue::from_str(&file.content_disposition()) {
            Ok(value) => value,
            Err(e) => return AppError::internal(e.to_string()).into_response(),
        };

        (
            [
                (CONTENT_TYPE, HeaderValue::from_static(file.format.mime_type())),
                (CONTENT_DISPOSITION, disposition),
            ],
            file.bytes,
        )
            .into_response()
    }
}
