//! Caller identity forwarded by the identity provider's gateway.
//!
//! ```text
//! X-Identity-Id: user_2abc...    (required)
//! X-Identity-Email: ada@example.com
//! X-Identity-Name: Ada Lovelace
//! ```

use std::future::{Ready, ready};

use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest, dev::Payload};

use crate::domain::{Error, ExternalIdentity, Identity};

pub const IDENTITY_ID_HEADER: &str = "x-identity-id";
pub const IDENTITY_EMAIL_HEADER: &str = "x-identity-email";
pub const IDENTITY_NAME_HEADER: &str = "x-identity-name";

/// Authenticated caller extracted from gateway headers.
///
/// Extraction fails with `401 unauthorized` when the id header is missing,
/// blank, or not valid text.
#[derive(Debug, Clone)]
pub struct RequestIdentity(Identity);

impl RequestIdentity {
    pub fn identity(&self) -> &Identity {
        &self.0
    }

    pub fn external_id(&self) -> &ExternalIdentity {
        &self.0.external_id
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn identity_from_headers(headers: &HeaderMap) -> Result<Identity, Error> {
    let external_id = header_text(headers, IDENTITY_ID_HEADER)
        .and_then(|raw| ExternalIdentity::new(raw).ok())
        .ok_or_else(|| Error::unauthorized("User not authenticated"))?;
    Ok(Identity {
        external_id,
        email: header_text(headers, IDENTITY_EMAIL_HEADER).map(str::to_owned),
        name: header_text(headers, IDENTITY_NAME_HEADER).map(str::to_owned),
    })
}

impl FromRequest for RequestIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identity_from_headers(req.headers()).map(Self))
    }
}
