use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, MAX_COMMENT_LENGTH};
use serde_json::json;

/// 把领域错误翻译成带机器可读 code 的 JSON 响应。
/// 校验/查找类错误原样转述，基础设施故障只透出 503。
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DomainError::ContentTooLong => (StatusCode::BAD_REQUEST, "COMMENT_TOO_LONG"),
            DomainError::InvalidReference(_) => (StatusCode::BAD_REQUEST, "INVALID_REFERENCE"),
            DomainError::CommentsDisabled => (StatusCode::FORBIDDEN, "COMMENT_OFF"),
            DomainError::PostNotFound => (StatusCode::NOT_FOUND, "POST_NOT_FOUND"),
            DomainError::CommentNotFound => (StatusCode::NOT_FOUND, "COMMENT_NOT_FOUND"),
            DomainError::ParentNotFound => (StatusCode::NOT_FOUND, "COMMENT_PARENT_NOT_FOUND"),
            DomainError::StorageUnavailable { op, source } => {
                tracing::error!(op = %op, error = %source, "storage failure");
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
        };

        let body = match &self.0 {
            DomainError::ContentTooLong => Json(json!({
                "code": code,
                "message": self.0.to_string(),
                "maxLength": MAX_COMMENT_LENGTH,
            })),
            _ => Json(json!({
                "code": code,
                "message": self.0.to_string(),
            })),
        };

        (status, body).into_response()
    }
}
