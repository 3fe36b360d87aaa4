use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{1}")]
    Server(StatusCode, String),
    // Froms
    #[error("{0}")]
    Exam(#[from] exam_utils::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let status: StatusCode = self.into();

        if status.is_server_error() {
            error!(%status, reason = %message, "request failed");
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<Error> for StatusCode {
    fn from(error: Error) -> Self {
        use exam_utils::error::Error as ExamError;

        match error {
            Error::Server(c, _) => c,
            Error::Exam(e) => match e {
                ExamError::NotFound(_) | ExamError::EmptyResult(_) => StatusCode::NOT_FOUND,
                ExamError::InsufficientQuestions { available: 0, .. } => StatusCode::NOT_FOUND,
                ExamError::InsufficientQuestions { .. } => StatusCode::CONFLICT,
                ExamError::InvalidCount(_)
                | ExamError::InvalidPosition { .. }
                | ExamError::InvalidOption { .. } => StatusCode::BAD_REQUEST,
                ExamError::Finished => StatusCode::CONFLICT,
                ExamError::Generation(_) | ExamError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use exam_utils::error::Error as ExamError;

    use super::*;

    #[test]
    fn exam_errors_map_to_statuses() {
        let status = |e: ExamError| StatusCode::from(Error::from(e));

        assert_eq!(status(ExamError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(ExamError::InvalidCount(0)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ExamError::InsufficientQuestions {
                topic_id: "t".into(),
                requested: 5,
                available: 2,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ExamError::InsufficientQuestions {
                topic_id: "t".into(),
                requested: 5,
                available: 0,
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ExamError::Store("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
