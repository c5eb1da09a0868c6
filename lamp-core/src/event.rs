//! Classification of raw invocation payloads.
//!
//! Events arrive untyped: a direct invocation carrying `{text, action?}`, an S3
//! notification carrying `Records`, or anything else. [`classify`] turns the
//! payload into an [`InboundEvent`] so callers match on a closed set of shapes
//! rather than probing fields.

use serde_json::Value;

/// `eventSource` of an S3 object notification record.
pub const S3_EVENT_SOURCE: &str = "aws:s3";

const DEFAULT_ACTION: &str = "uppercase";

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("`text` must be a string, got: {0}")]
    NonStringText(String),
    #[error("`Records` has no first record")]
    NoRecords,
    #[error("storage notification record is missing `{0}`")]
    MissingField(&'static str),
    #[error("object key has a malformed escape sequence: {0:?}")]
    MalformedEscape(String),
    #[error("decoded object key is not valid utf8: {0}")]
    KeyEncoding(#[from] std::str::Utf8Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadNotification {
    pub bucket: String,
    /// Object key after `+` and percent decoding.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text(TextRequest),
    StorageUpload(UploadNotification),
    Unrecognized,
}

impl InboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Text(_) => "text",
            InboundEvent::StorageUpload(_) => "storage_upload",
            InboundEvent::Unrecognized => "unrecognized",
        }
    }
}

/// Decide which handling mode an event belongs to.
///
/// The text predicate wins over the storage predicate when both match.
pub fn classify(event: &Value) -> Result<InboundEvent, EventError> {
    if let Some(text) = event.get("text").filter(|v| is_truthy(v)) {
        let text = text
            .as_str()
            .ok_or_else(|| EventError::NonStringText(text.to_string()))?;
        let action = match event.get("action") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(v) if is_truthy(v) => v.to_string(),
            _ => DEFAULT_ACTION.to_string(),
        };
        return Ok(InboundEvent::Text(TextRequest {
            text: text.to_string(),
            action,
        }));
    }

    if let Some(records) = event.get("Records").filter(|v| is_truthy(v)) {
        // `Records[0]` is indexed the way javascript would index it
        let first = match records {
            Value::Array(items) => items.first(),
            Value::Object(fields) => fields.get("0"),
            Value::String(_) => {
                log::debug!("ignoring string `Records`: {}", records);
                return Ok(InboundEvent::Unrecognized);
            }
            _ => None,
        };
        let record = first.filter(|r| !r.is_null()).ok_or(EventError::NoRecords)?;
        if record.get("eventSource").and_then(Value::as_str) == Some(S3_EVENT_SOURCE) {
            return UploadNotification::from_record(record).map(InboundEvent::StorageUpload);
        }
        log::debug!(
            "ignoring records from event source: {}",
            record.get("eventSource").unwrap_or(&Value::Null)
        );
    }

    Ok(InboundEvent::Unrecognized)
}

impl UploadNotification {
    fn from_record(record: &Value) -> Result<Self, EventError> {
        let bucket = record
            .pointer("/s3/bucket/name")
            .and_then(Value::as_str)
            .ok_or(EventError::MissingField("s3.bucket.name"))?;
        let raw_key = record
            .pointer("/s3/object/key")
            .and_then(Value::as_str)
            .ok_or(EventError::MissingField("s3.object.key"))?;
        Ok(UploadNotification {
            bucket: bucket.to_string(),
            key: decode_object_key(raw_key)?,
        })
    }
}

/// S3 notifications carry form-encoded keys: `+` is a space, everything
/// else is percent encoded. A literal `+` arrives as `%2B`.
///
/// Every `%` must start a two digit hex escape.
pub fn decode_object_key(raw: &str) -> Result<String, EventError> {
    let bytes = raw.as_bytes();
    let malformed = raw.match_indices('%').any(|(i, _)| {
        !bytes
            .get(i + 1..i + 3)
            .map(|hex| hex.iter().all(u8::is_ascii_hexdigit))
            .unwrap_or(false)
    });
    if malformed {
        return Err(EventError::MalformedEscape(raw.to_string()));
    }
    let spaced = raw.replace('+', " ");
    let decoded = percent_encoding::percent_decode_str(&spaced).decode_utf8()?;
    if decoded != raw {
        log::trace!("decoded object key {:?} -> {:?}", raw, decoded);
    }
    Ok(decoded.into_owned())
}

/// Javascript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
