//! Inbound signup payloads and their parsing implementations.
//! A submission deserializes into `DeserSignup`, which may be missing or
//! invalid in every field, and is parsed into a `ValidSignup` before anything
//! touches the record store.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use validator::ValidateEmail;

// ###################################
// ->   STRUCTS
// ###################################
/// Deserializable Signup
/// A signup submission as it comes off the wire. The email is an `Option` so
/// a body without one still reaches the handler and gets the contractual 400
/// instead of a deserialization rejection.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DeserSignup {
    pub email: Option<String>,
    pub handle: Option<String>,
    pub warpcast_handle: Option<String>,
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Validated Signup
/// A signup submission with all the fields validated.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub email: ValidEmail,
    pub handle: Option<String>,
    pub warpcast_handle: Option<String>,
    pub topic: Option<String>,
    pub kind: Option<String>,
}

/// Validated email address
#[derive(Debug, Clone)]
pub struct ValidEmail(String);

// ###################################
// ->   IMPLS
// ###################################
impl TryFrom<DeserSignup> for ValidSignup {
    type Error = DataParsingError;

    fn try_from(deser: DeserSignup) -> Result<Self, Self::Error> {
        let email = deser
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or(DataParsingError::EmailMissing)?;

        Ok(ValidSignup {
            email: ValidEmail::parse(email)?,
            handle: parse_optional(deser.handle, "handle")?,
            warpcast_handle: parse_optional(deser.warpcast_handle, "warpcastHandle")?,
            topic: parse_optional(deser.topic, "topic")?,
            kind: parse_optional(deser.kind, "type")?,
        })
    }
}

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if value.graphemes(true).count() > 256 {
            return Err(DataParsingError::EmailTooLong);
        }

        if value.validate_email() {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Optional fields are free text, only capped in length. Blank values count
/// as absent.
fn parse_optional(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, DataParsingError> {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return Ok(None);
    };

    if value.graphemes(true).count() > 256 {
        return Err(DataParsingError::FieldTooLong(field));
    }

    Ok(Some(value))
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, Serialize)]
pub enum DataParsingError {
    EmailMissing,
    EmailInvalid,
    EmailTooLong,

    FieldTooLong(&'static str),
}
// Error Boilerplate
impl core::fmt::Display for DataParsingError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for DataParsingError {}
