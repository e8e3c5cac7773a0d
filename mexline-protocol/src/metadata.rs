//! Newsletter metadata projection.
//!
//! Mex responses carry a JSON document in the byte content of their `result`
//! child. The newsletter record sits under `data.<path>`; this module decodes
//! it into a flat [`NewsletterMetadata`].

use crate::error::ProtocolError;
use crate::node::BinaryNode;
use crate::query::XwaPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Relationship between the viewing account and a newsletter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewerMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_subscribed: Option<bool>,

    /// Fields not modelled above, kept as sent.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Normalized newsletter record.
///
/// Every field is optional: the server omits fields freely, and numeric
/// fields that are absent or not numeric are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewsletterMetadata {
    pub id: Option<String>,
    pub state: Option<String>,
    /// Creation time in seconds since the epoch.
    pub creation_time: Option<i64>,
    pub name: Option<String>,
    #[serde(rename = "nameTime")]
    pub name_time: Option<i64>,
    pub description: Option<String>,
    #[serde(rename = "descriptionTime")]
    pub description_time: Option<i64>,
    pub invite: Option<String>,
    pub handle: Option<String>,
    pub picture: Option<String>,
    pub preview: Option<String>,
    pub reaction_codes: Option<String>,
    pub subscribers: Option<u64>,
    pub verification: Option<String>,
    pub viewer_metadata: Option<ViewerMetadata>,
}

impl NewsletterMetadata {
    /// Returns true only if the server reported `is_subscribed: true`.
    pub fn is_subscribed(&self) -> bool {
        self.viewer_metadata
            .as_ref()
            .and_then(|viewer| viewer.is_subscribed)
            == Some(true)
    }

    /// Returns the creation time as a timestamp.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.creation_time.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

impl ViewerMetadata {
    /// Narrows a raw `viewer_metadata` object. Known keys with an
    /// unexpected type are left in `extra`.
    fn from_value(value: &Value) -> Option<Self> {
        let mut fields: HashMap<String, Value> = value
            .as_object()?
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Some(Self {
            mute: take_field(&mut fields, "mute", as_string),
            role: take_field(&mut fields, "role", as_string),
            is_subscribed: take_field(&mut fields, "is_subscribed", Value::as_bool),
            extra: fields,
        })
    }
}

fn take_field<T>(
    fields: &mut HashMap<String, Value>,
    key: &str,
    narrow: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    let value = narrow(fields.get(key)?)?;
    fields.remove(key);
    Some(value)
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Coerces a JSON number or numeric string to an integer.
///
/// Non-integral, non-finite and non-numeric values yield `None`.
fn coerce_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}

/// Projects the newsletter record out of a mex response.
///
/// Reads `data.xwa2_newsletter_create` when `is_create` is set and
/// `data.xwa2_newsletter` otherwise. Fails if the `result` child or its
/// payload is absent, if the payload is not JSON, or if the selected path is
/// missing, `null`, or not an object. Fields inside the record are narrowed
/// one by one; a field of an unexpected type is `None`.
pub fn extract_newsletter_metadata(
    node: &BinaryNode,
    is_create: bool,
) -> Result<NewsletterMetadata, ProtocolError> {
    let record = newsletter_record(node, is_create)?;
    Ok(project(&record))
}

fn newsletter_record(node: &BinaryNode, is_create: bool) -> Result<Value, ProtocolError> {
    let path = if is_create {
        XwaPath::Create
    } else {
        XwaPath::Newsletter
    };

    let text = node
        .get_child("result")
        .ok_or(ProtocolError::MissingResult)?
        .content_str()?
        .ok_or(ProtocolError::MissingResult)?;

    let mut document: Value = serde_json::from_str(text)?;
    let record = document
        .get_mut("data")
        .and_then(|data| data.get_mut(path.as_str()))
        .map(Value::take)
        .filter(|record| !record.is_null())
        .ok_or(ProtocolError::MissingPath(path.as_str()))?;

    // Anything but an object at the path is a malformed payload
    let record: Map<String, Value> = serde_json::from_value(record)?;
    Ok(Value::Object(record))
}

fn project(record: &Value) -> NewsletterMetadata {
    let text = |pointer: &str| record.pointer(pointer).and_then(as_string);
    let int = |pointer: &str| coerce_int(record.pointer(pointer));
    let path = |pointer: &str| text(pointer).filter(|direct_path| !direct_path.is_empty());

    NewsletterMetadata {
        id: text("/id"),
        state: text("/state/type"),
        creation_time: int("/thread_metadata/creation_time"),
        name: text("/thread_metadata/name/text"),
        name_time: int("/thread_metadata/name/update_time"),
        description: text("/thread_metadata/description/text"),
        description_time: int("/thread_metadata/description/update_time"),
        invite: text("/thread_metadata/invite"),
        handle: text("/thread_metadata/handle"),
        picture: path("/thread_metadata/picture/direct_path"),
        preview: path("/thread_metadata/preview/direct_path"),
        reaction_codes: text("/thread_metadata/settings/reaction_codes/value"),
        subscribers: int("/thread_metadata/subscribers_count")
            .and_then(|count| u64::try_from(count).ok()),
        verification: text("/thread_metadata/verification"),
        viewer_metadata: record
            .get("viewer_metadata")
            .and_then(ViewerMetadata::from_value),
    }
}
