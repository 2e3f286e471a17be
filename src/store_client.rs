//! Client for the external record store: a hosted tabular API holding one
//! table of Signup Records. Only the two operations the intake flow needs are
//! implemented, a filtered lookup by exact email match and a single-record
//! create.

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::web::data::ValidSignup;

#[derive(Debug)]
pub struct RecordStoreClient {
    http_client: Client,
    table_url: reqwest::Url,
    api_key: SecretString,
}

impl RecordStoreClient {
    pub fn new<S: AsRef<str>>(
        url: S,
        base_id: &str,
        table: &str,
        api_key: SecretString,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let url =
            reqwest::Url::parse(url.as_ref()).map_err(|e| Error::UrlParsing(e.to_string()))?;
        let table_url = url
            .join(&format!("v0/{base_id}/{table}"))
            .map_err(|e| Error::UrlParsing(e.to_string()))?;

        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(RecordStoreClient {
            http_client,
            table_url,
            api_key,
        })
    }

    /// Looks up Signup Records whose email field exactly equals `email`.
    /// At most one record is requested since the store holds at most one row
    /// per email address.
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<StoreRecord>> {
        let formula = format!("{{Email}} = {}", escape_formula_value(email));

        let resp = self
            .http_client
            .get(self.table_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .query(&[("filterByFormula", formula.as_str()), ("maxRecords", "1")])
            .send()
            .await?;
        let resp = ok_or_store_error(resp).await?;

        let page: RecordPage = resp.json().await?;
        Ok(page.records)
    }

    /// Creates one Signup Record and returns it as stored.
    pub async fn create_signup(&self, fields: SignupFields) -> Result<StoreRecord> {
        let body = CreateRecords {
            records: vec![NewRecord { fields }],
        };

        let resp = self
            .http_client
            .post(self.table_url.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let resp = ok_or_store_error(resp).await?;

        let mut page: RecordPage = resp.json().await?;
        page.records.pop().ok_or(Error::EmptyCreateResponse)
    }
}

/// Propagates non-2xx store responses as errors carrying the store's own
/// error body, which ends up embedded in the 500 the caller reports.
async fn ok_or_store_error(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_client_error() || status.is_server_error() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::StoreResponse {
            status: status.as_u16(),
            body,
        });
    }
    Ok(resp)
}

/// Renders a value as a double-quoted formula string literal, with `\` and
/// `"` backslash-escaped so the value cannot terminate the literal or alter
/// the surrounding expression.
fn escape_formula_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

// ###################################
// ->   WIRE STRUCTS
// ###################################
/// One stored row, as the record store returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreRecord {
    pub id: String,
    pub fields: SignupFields,
}

/// The field set of a Signup Record. Optional fields that were not submitted
/// are left out of the stored row entirely.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignupFields {
    pub email: String,
    pub handle: Option<String>,
    pub warpcast_handle: Option<String>,
    pub topic: Option<String>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub signup_date: String,
}

impl SignupFields {
    /// Stamps a validated submission with the server-assigned signup date.
    pub fn from_signup(signup: ValidSignup, signup_date: DateTime<Utc>) -> Self {
        SignupFields {
            email: signup.email.into_inner(),
            handle: signup.handle,
            warpcast_handle: signup.warpcast_handle,
            topic: signup.topic,
            kind: signup.kind,
            signup_date: signup_date.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateRecords {
    records: Vec<NewRecord>,
}

#[derive(Debug, Serialize)]
struct NewRecord {
    fields: SignupFields,
}

#[derive(Debug, Deserialize)]
struct RecordPage {
    records: Vec<StoreRecord>,
}

// ###################################
// ->   ERROR & RESULT
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("url parsing error: {0}")]
    UrlParsing(String),
    #[error("record store responded with status {status}: {body}")]
    StoreResponse { status: u16, body: String },
    #[error("record store returned no record for a create request")]
    EmptyCreateResponse,
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
