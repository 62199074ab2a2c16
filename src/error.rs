use std::borrow::Cow;
use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use tracing::error;

use crate::database::StoreError;
use crate::envelope::Failure;
use crate::pipeline::Resource;
use crate::validation::Issue;

#[derive(Debug, Derivative)]
#[derivative(PartialEq)]
pub enum Error {
    // 400
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    ValidationFailed {
        issues: Vec<Issue>,
    },
    EmptyUpdate,
    MissingQueryParameter {
        name: &'static str,
    },
    InvalidQueryParameter {
        name: &'static str,
    },
    IncompleteSupportRequest,
    DuplicateTransactionId,

    // 404
    PathNotFound,
    ResourceNotFound {
        resource: Resource,
    },

    // 500
    ExistentialState(String),
    FailedDatabaseCall(StoreError),
    FailedToHashSecret(String),
    FailedToLoadConfig(String),
    FailedToSendMail(String),
    InvalidConfiguration(String),
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidQuery(_) => "E4001002",
            Error::ValidationFailed { .. } => "E4001003",
            Error::EmptyUpdate => "E4001004",
            Error::MissingQueryParameter { .. } => "E4001005",
            Error::IncompleteSupportRequest => "E4001006",
            Error::DuplicateTransactionId => "E4001007",
            Error::InvalidQueryParameter { .. } => "E4001008",
            Error::PathNotFound => "E4041000",
            Error::ResourceNotFound { .. } => "E4041001",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToHashSecret(_) => "E5001002",
            Error::FailedToLoadConfig(_) => "E5001003",
            Error::FailedToSendMail(_) => "E5001004",
            Error::InvalidConfiguration(_) => "E5001005",
            Error::IoError(_) => "E5001006",
        }
    }

    pub fn error_message(&self) -> Cow<'static, str> {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed".into(),
            Error::InvalidPath(_) => "The given path could not be parsed".into(),
            Error::InvalidQuery(_) => "The given query could not be parsed".into(),
            Error::ValidationFailed { .. } => "The given body failed validation".into(),
            Error::EmptyUpdate => "No fields to update".into(),
            Error::MissingQueryParameter { name } => format!("Missing {}", name).into(),
            Error::InvalidQueryParameter { name } => format!("Invalid {}", name).into(),
            Error::IncompleteSupportRequest => "All fields are required".into(),
            Error::DuplicateTransactionId => "Transaction ID must be unique".into(),
            Error::PathNotFound => "The requested path was not found".into(),
            Error::ResourceNotFound { resource } => format!("{} not found", resource).into(),
            Error::FailedToLoadConfig(_) => "Failed to load config".into(),
            Error::FailedToSendMail(_) => "Failed to send email".into(),
            Error::ExistentialState(_)
            | Error::FailedDatabaseCall(_)
            | Error::FailedToHashSecret(_)
            | Error::InvalidConfiguration(_)
            | Error::IoError(_) => "Internal Server Error".into(),
        }
    }

    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Error::ValidationFailed { issues } => Some(issues),
            _ => None,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Error::EmptyUpdate => StatusCode::BAD_REQUEST,
            Error::MissingQueryParameter { .. } => StatusCode::BAD_REQUEST,
            Error::InvalidQueryParameter { .. } => StatusCode::BAD_REQUEST,
            Error::IncompleteSupportRequest => StatusCode::BAD_REQUEST,
            Error::DuplicateTransactionId => StatusCode::BAD_REQUEST,
            Error::PathNotFound => StatusCode::NOT_FOUND,
            Error::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToHashSecret(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToLoadConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSendMail(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidConfiguration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // the cause stays in the server log, the client only gets the message
        if status.is_server_error() {
            error!(error_code = self.error_code(), "request failed: {}", self);
        }

        HttpResponse::build(status).json(&Failure {
            success: false,
            code: self.error_code(),
            message: self.error_message(),
            errors: self.issues(),
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::FailedDatabaseCall(err) => write!(f, "database call failed: {}", err),
            Error::FailedToHashSecret(msg) => write!(f, "failed to hash secret: {}", msg),
            Error::FailedToLoadConfig(msg) => write!(f, "failed to load config: {}", msg),
            Error::FailedToSendMail(msg) => write!(f, "failed to send mail: {}", msg),
            Error::InvalidConfiguration(msg) => write!(f, "invalid configuration: {}", msg),
            Error::ExistentialState(msg) => write!(f, "invalid state: {}", msg),
            Error::IoError(err) => write!(f, "i/o error: {}", err),
            _ => Debug::fmt(self, f),
        }
    }
}

impl From<StoreError> for Error {
    fn from(error: StoreError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use serde_json::Value;

    use super::*;
    use crate::validation::{IssueCode, PathSegment};

    async fn body_of(error: Error) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_web::test]
    async fn not_found_names_the_resource() {
        let (status, body) = body_of(Error::ResourceNotFound {
            resource: Resource::VendorCampaign,
        })
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Vendor Campaign not found");
        assert!(body.get("errors").is_none());
    }

    #[actix_web::test]
    async fn internal_errors_hide_their_cause() {
        let (status, body) = body_of(Error::FailedDatabaseCall(StoreError::Other(
            "connection reset by peer".into(),
        )))
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
        assert!(!body.to_string().contains("connection reset"));
    }

    #[actix_web::test]
    async fn validation_failures_carry_their_issues() {
        let (status, body) = body_of(Error::ValidationFailed {
            issues: vec![Issue {
                path: vec![PathSegment::Key("status".into())],
                code: IssueCode::InvalidEnumValue,
                message: "Invalid enum value".into(),
            }],
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["path"][0], "status");
        assert_eq!(body["errors"][0]["code"], "invalid_enum_value");
    }
}
