use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::{
    store_client::SignupFields,
    web::{
        data::{DeserSignup, ValidSignup},
        Error, WebResult,
    },
    AppState,
};

/// The intake flow: validate the submission, look the email up in the record
/// store, reject duplicates, insert a new Signup Record with a
/// server-assigned timestamp.
#[tracing::instrument(
    name = "Saving a new signup to the record store",
    skip(app_state, signup),
    fields(signup_email = tracing::field::Empty)
)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    Json(signup): Json<DeserSignup>,
) -> WebResult<(StatusCode, Json<Value>)> {
    // Credentials are checked before the payload so a misconfigured
    // deployment answers 500 even to invalid submissions.
    let store = app_state
        .store_client
        .as_ref()
        .ok_or(Error::StoreNotConfigured)?;

    let signup: ValidSignup =
        tokio::task::spawn_blocking(move || signup.try_into()).await??;
    tracing::Span::current().record("signup_email", signup.email.as_ref());

    // Check-then-insert without a transaction: the store offers no unique
    // constraint at this layer, so a concurrent duplicate can slip through.
    let existing = store.find_by_email(signup.email.as_ref()).await?;
    if !existing.is_empty() {
        return Err(Error::AlreadyRegistered);
    }

    let fields = SignupFields::from_signup(signup, Utc::now());
    let record = store.create_signup(fields).await?;
    info!("{:<12} - created record '{}'", "subscribe", record.id);

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Successfully subscribed" })),
    ))
}
