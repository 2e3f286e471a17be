use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use strum_macros::AsRefStr;

use super::data::DataParsingError;
use crate::store_client;

pub type WebResult<T> = core::result::Result<T, Error>;

#[derive(Debug, AsRefStr, thiserror::Error)]
pub enum Error {
    #[error("this email is already registered")]
    AlreadyRegistered,
    #[error("record store credentials are not configured")]
    StoreNotConfigured,

    #[error("data parsing error: {0}")]
    DataParsing(#[from] DataParsingError),

    #[error("record store client error: {0}")]
    StoreClient(#[from] store_client::Error),

    #[error("error awaiting a tokio task: {0}")]
    TokioJoin(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("templating error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    pub fn status_code_and_client_error(&self) -> (StatusCode, ClientError) {
        use ClientError::*;

        match self {
            Error::DataParsing(DataParsingError::EmailMissing) => {
                (StatusCode::BAD_REQUEST, EmailRequired)
            }
            Error::DataParsing(data_er) => {
                (StatusCode::BAD_REQUEST, InvalidInput(data_er.to_string()))
            }
            Error::AlreadyRegistered => (StatusCode::BAD_REQUEST, AlreadyRegistered),
            Error::StoreNotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                SubscribeFail("missing record store configuration".to_string()),
            ),
            Error::StoreClient(er) => {
                (StatusCode::INTERNAL_SERVER_ERROR, SubscribeFail(er.to_string()))
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, ServiceError),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::debug!("{:<12} - into_response(Error: {self:?})", "INTO_RESP");

        // Construct a response
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();

        // Insert the Error into response so that it can be retrieved later.
        res.extensions_mut().insert(Arc::new(self));

        res
    }
}

/// What the caller gets to see. The `Display` strings are the response
/// contract, so the exact wording matters.
#[derive(Debug, AsRefStr, derive_more::Display)]
pub enum ClientError {
    #[display("Email is required")]
    EmailRequired,
    #[display("This email is already registered")]
    AlreadyRegistered,
    #[display("Received invalid input: {_0}")]
    InvalidInput(String),
    #[display("Failed to subscribe: {_0}")]
    SubscribeFail(String),
    #[display("Service Error!")]
    ServiceError,
}
