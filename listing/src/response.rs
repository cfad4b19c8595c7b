//! Decoding of remote list bodies.
//!
//! Listing backends don't agree on a shape. Bodies are decoded exactly once, here,
//! into [`ListResponse`]; nothing downstream looks at raw json.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::{ListError, RemoteEntry};

/// One page of a cursor-paginated listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub objects: Vec<RemoteEntry>,
    /// Folder markers, i.e. common prefixes under the delimiter.
    pub delimited_prefixes: Vec<String>,
    pub truncated: bool,
    pub cursor: Option<String>,
}

/// What a single remote list call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ListResponse {
    /// A recognized paginated page.
    StandardPage(ListPage),
    /// Entries without any pagination info. Taken as the last page.
    BareArrayFallback(Vec<RemoteEntry>),
    /// Nothing we know how to read. Ends the listing.
    Unrecognized,
}

/// `{ objects, delimited_prefixes, truncated, cursor }`
#[derive(Debug, Deserialize)]
struct RawPage {
    objects: Vec<Value>,
    #[serde(default)]
    delimited_prefixes: Vec<String>,
    #[serde(default)]
    truncated: bool,
    #[serde(default)]
    cursor: Option<String>,
}

/// Cloudflare v4 api envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    result_info: Option<CursorResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CursorResultInfo {
    #[serde(default)]
    is_truncated: Option<bool>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    delimited: Vec<String>,
}

fn default_success() -> bool {
    true
}

impl ListResponse {
    /// Decodes a json list body.
    ///
    /// Only a Cloudflare envelope with `success: false` is an error, every other
    /// surprise maps to [`ListResponse::Unrecognized`].
    pub fn decode(body: Value) -> Result<Self, ListError> {
        let (is_page, is_envelope) = match &body {
            Value::Object(map) => (
                map.contains_key("objects"),
                map.contains_key("result") || map.contains_key("success"),
            ),
            _ => (false, false),
        };

        if let Value::Array(values) = body {
            Ok(decode_bare_array(values))
        } else if is_page {
            Ok(decode_page_object(body))
        } else if is_envelope {
            decode_envelope(body)
        } else {
            warn!(%body, "unrecognized list response");
            Ok(Self::Unrecognized)
        }
    }
}

fn decode_bare_array(values: Vec<Value>) -> ListResponse {
    match decode_entries(values) {
        Some(entries) => ListResponse::BareArrayFallback(entries),
        None => {
            warn!("array list response did not contain entries");
            ListResponse::Unrecognized
        }
    }
}

/// Decodes entries one by one, skipping those that don't decode.
///
/// `None` when there were entries but not a single one decoded.
fn decode_entries(values: Vec<Value>) -> Option<Vec<RemoteEntry>> {
    let n_values = values.len();
    let entries: Vec<RemoteEntry> = values
        .into_iter()
        .filter_map(|value| {
            serde_json::from_value(value)
                .inspect_err(|err| warn!("skipping malformed list entry: {err}"))
                .ok()
        })
        .collect();

    (n_values == 0 || !entries.is_empty()).then_some(entries)
}

fn decode_page_object(body: Value) -> ListResponse {
    let raw = match serde_json::from_value::<RawPage>(body) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("malformed list page: {err}");
            return ListResponse::Unrecognized;
        }
    };
    let Some(objects) = decode_entries(raw.objects) else {
        warn!("list page did not contain entries");
        return ListResponse::Unrecognized;
    };

    ListResponse::StandardPage(ListPage {
        objects,
        delimited_prefixes: raw.delimited_prefixes,
        truncated: raw.truncated,
        cursor: non_empty(raw.cursor),
    })
}

fn decode_envelope(body: Value) -> Result<ListResponse, ListError> {
    let envelope = match serde_json::from_value::<Envelope>(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("malformed api envelope: {err}");
            return Ok(ListResponse::Unrecognized);
        }
    };
    if !envelope.success {
        let msg = envelope
            .errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("{code}: {}", e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");

        return Err(ListError::Api(msg));
    }

    match (envelope.result, envelope.result_info) {
        (result @ Value::Object(_), _) => Ok(ListResponse::decode(result)?),
        (Value::Array(values), Some(info))
            if info.is_truncated.is_some() || info.cursor.is_some() =>
        {
            match decode_entries(values) {
                Some(objects) => Ok(ListResponse::StandardPage(ListPage {
                    objects,
                    delimited_prefixes: info.delimited,
                    truncated: info.is_truncated.unwrap_or(false),
                    cursor: non_empty(info.cursor),
                })),
                None => {
                    warn!("envelope result did not contain entries");
                    Ok(ListResponse::Unrecognized)
                }
            }
        }
        (Value::Array(values), _) => Ok(decode_bare_array(values)),
        (result, _) => {
            warn!(%result, "unrecognized envelope result");
            Ok(ListResponse::Unrecognized)
        }
    }
}

fn non_empty(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty())
}
