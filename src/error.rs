use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Everything a handler can answer with besides plain success.
///
/// Persistence failures and malformed ids all collapse into a 500 whose body
/// is the raw error text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("user already exists")]
    UserExists,

    #[error("user does not exist")]
    NoSuchUser,

    #[error("user not found")]
    UserNotFound,

    #[error("wrong personal id or password")]
    WrongPassword,

    #[error(transparent)]
    Database(#[from] mongodb::error::Error),

    #[error(transparent)]
    InvalidId(#[from] bson::oid::Error),

    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UserExists | ApiError::NoSuchUser => StatusCode::CONFLICT,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::WrongPassword => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::InvalidId(_) | ApiError::Serialize(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;

    #[test]
    fn business_outcomes_map_to_their_status_codes() {
        assert_eq!(ApiError::UserExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NoSuchUser.status_code(), StatusCode::CONFLICT);
        assert_eq!(ApiError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::WrongPassword.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn malformed_object_ids_become_internal_errors() {
        let err: ApiError = ObjectId::parse_str("not-a-hex-id").unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
