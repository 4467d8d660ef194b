//! Lenient JSON body extractor.
//!
//! Older extension builds sometimes send bodies that are not valid JSON.
//! Those requests are not rejected at the extractor: the body is treated as
//! `{}` and the handler's version/key checks answer them. A field with the
//! wrong type is dropped on its own, so the rest of the body still counts.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::convert::Infallible;
use tracing::{debug, warn};

/// Like `axum::Json`, but never rejects; unusable fields fall back to
/// their defaults. `T` must be `#[serde(default)]` at the container level.
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.unwrap_or_default();
        Ok(Self(parse_or_default(&bytes)))
    }
}

fn parse_or_default<T: DeserializeOwned + Default>(bytes: &[u8]) -> T {
    let fields = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            debug!(kind = json_kind(&other), "JSON body is not an object; treating as empty object");
            return T::default();
        }
        Err(e) => {
            warn!(error = %e, len = bytes.len(), "bad JSON body; treating as empty object");
            return T::default();
        }
    };

    if let Ok(v) = serde_json::from_value(Value::Object(fields.clone())) {
        return v;
    }

    let mut kept = Map::new();
    let mut dropped = Vec::new();
    for (k, v) in fields {
        let single = Value::Object(Map::from_iter([(k.clone(), v.clone())]));
        if serde_json::from_value::<T>(single).is_ok() {
            kept.insert(k, v);
        } else {
            dropped.push(k);
        }
    }
    warn!(?dropped, "JSON body fields with unexpected types were reset to defaults");

    serde_json::from_value(Value::Object(kept)).unwrap_or_else(|e| {
        warn!(error = %e, "JSON body still unusable; treating as empty object");
        T::default()
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
