use std::borrow::Cow;

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::validation::Issue;

/// Successful response body: `{"success": true, "<key>": payload}`.
#[derive(Debug)]
pub struct Envelope<T> {
    status: StatusCode,
    key: &'static str,
    payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(key: &'static str, payload: T) -> Envelope<T> {
        Envelope {
            status: StatusCode::OK,
            key,
            payload,
        }
    }

    pub fn created(key: &'static str, payload: T) -> Envelope<T> {
        Envelope {
            status: StatusCode::CREATED,
            key,
            payload,
        }
    }
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("success", &true)?;
        map.serialize_entry(self.key, &self.payload)?;
        map.end()
    }
}

impl<T: Serialize> Responder for Envelope<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status).json(&self)
    }
}

/// Failure response body, built by [`crate::error::Error`].
#[derive(Debug, Serialize)]
pub struct Failure<'a> {
    pub success: bool,
    pub code: &'static str,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [Issue]>,
}
