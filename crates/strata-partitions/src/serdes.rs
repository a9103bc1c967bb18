//! Versioned serialization for partition subsets.
//!
//! Subsets persist between scheduler evaluations as a JSON envelope tagged
//! with an integer `version`, or, for backward compatibility, as a bare
//! JSON array of keys meaning a legacy key-set subset with implicit
//! version 0. Deserialization is the join point where version skew and
//! definition drift are detected:
//!
//! - a version with no registered decoder fails with
//!   [`Error::UnsupportedSerializationVersion`], carrying the literal
//!   version value
//! - a payload whose shape does not match the definition fails with
//!   [`Error::DefinitionMismatch`]
//!
//! Decoders are registered in explicit per-variant tables. Adding a new
//! format version means appending a table entry, never mutating existing
//! ones; the two most recent versions stay supported. This layer performs
//! no I/O; callers scope acquisition of the underlying storage handle
//! around these calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use chrono::TimeZone;
use chrono_tz::Tz;
use strata_core::observability::partitions_span;
use strata_core::TimeWindow;

use crate::definition::PartitionsDefinition;
use crate::error::{Error, Result};
use crate::subset::{KeySetPartitionsSubset, PartitionsSubset, TimeWindowPartitionsSubset};

/// Current wire version for key-set subsets.
pub const KEY_SET_SERIALIZATION_VERSION: i64 = 1;

/// Current wire version for window-list subsets.
pub const TIME_WINDOW_SERIALIZATION_VERSION: i64 = 1;

/// The envelope for key-set subsets, version 1.
#[derive(Debug, Serialize, Deserialize)]
struct KeySetEnvelope {
    version: i64,
    subset: Vec<String>,
}

/// One serialized window: epoch-second boundaries plus the IANA timezone
/// id, so timezone identity survives the round trip.
#[derive(Debug, Serialize, Deserialize)]
struct TimeWindowRecord {
    start: i64,
    end: i64,
    timezone: String,
}

/// The envelope for window-list subsets, version 1.
#[derive(Debug, Serialize, Deserialize)]
struct TimeWindowEnvelope {
    version: i64,
    time_windows: Vec<TimeWindowRecord>,
    #[serde(default)]
    num_partitions: Option<usize>,
}

type SubsetDecoder = fn(&Value, &PartitionsDefinition) -> Result<PartitionsSubset>;

/// Registered decoders for key-set payloads. Append-only.
const KEY_SET_DECODERS: &[(i64, SubsetDecoder)] =
    &[(KEY_SET_SERIALIZATION_VERSION, decode_key_set_v1)];

/// Registered decoders for window-list payloads. Append-only.
const TIME_WINDOW_DECODERS: &[(i64, SubsetDecoder)] =
    &[(TIME_WINDOW_SERIALIZATION_VERSION, decode_time_windows_v1)];

/// Serializes a subset to its current-version JSON envelope.
///
/// Window-list subsets always embed a resolved partition count, computed
/// if the cache is empty, so readers never have to re-derive it.
///
/// # Errors
/// Returns [`Error::Serialization`] if JSON encoding fails.
pub fn serialize_subset(subset: &PartitionsSubset) -> Result<String> {
    match subset {
        PartitionsSubset::KeySet(subset) => to_json(&KeySetEnvelope {
            version: KEY_SET_SERIALIZATION_VERSION,
            subset: subset.partition_keys(),
        }),
        PartitionsSubset::TimeWindows(subset) => to_json(&TimeWindowEnvelope {
            version: TIME_WINDOW_SERIALIZATION_VERSION,
            time_windows: subset.included_windows().iter().map(window_record).collect(),
            num_partitions: Some(subset.partitions_count()),
        }),
    }
}

/// Deserializes a subset against the current definition.
///
/// # Errors
/// - [`Error::Serialization`] for malformed payloads
/// - [`Error::UnsupportedSerializationVersion`] for unknown versions
/// - [`Error::DefinitionMismatch`] when the payload shape does not match
///   the definition
/// - [`Error::InvalidPartitionKey`] when a persisted key no longer
///   resolves under the definition
pub fn deserialize_subset(
    serialized: &str,
    definition: &PartitionsDefinition,
) -> Result<PartitionsSubset> {
    let span = partitions_span("deserialize_subset", definition.kind());
    let _guard = span.enter();

    let value: Value = serde_json::from_str(serialized)
        .map_err(|e| Error::serialization(format!("malformed subset payload: {e}")))?;

    match &value {
        Value::Array(elements) => {
            tracing::debug!(
                definition = definition.kind(),
                keys = elements.len(),
                "accepting legacy unversioned subset payload"
            );
            decode_legacy_key_list(elements, definition)
        }
        Value::Object(envelope) => {
            let version = envelope
                .get("version")
                .and_then(Value::as_i64)
                .ok_or_else(|| {
                    Error::serialization("subset envelope is missing an integer 'version' field")
                })?;

            let decoders = match definition {
                PartitionsDefinition::Static(_) | PartitionsDefinition::Multi(_) => {
                    KEY_SET_DECODERS
                }
                PartitionsDefinition::TimeWindow(_) => TIME_WINDOW_DECODERS,
            };
            let decoder = decoders
                .iter()
                .find(|(v, _)| *v == version)
                .map(|(_, decode)| *decode)
                .ok_or(Error::UnsupportedSerializationVersion { version })?;

            decoder(&value, definition)
        }
        _ => Err(Error::serialization(
            "subset payload must be a JSON object or a legacy key array",
        )),
    }
}

/// Decodes the pre-envelope format: a bare array of keys, implicit
/// version 0.
fn decode_legacy_key_list(
    elements: &[Value],
    definition: &PartitionsDefinition,
) -> Result<PartitionsSubset> {
    let keys = elements
        .iter()
        .map(|element| {
            element.as_str().map(str::to_string).ok_or_else(|| {
                Error::serialization("legacy subset payload must contain only strings")
            })
        })
        .collect::<Result<Vec<String>>>()?;

    definition.empty_subset().with_partition_keys(&keys)
}

fn decode_key_set_v1(value: &Value, definition: &PartitionsDefinition) -> Result<PartitionsSubset> {
    if value.get("time_windows").is_some() {
        return Err(Error::definition_mismatch(format!(
            "payload carries time windows but the definition is {}",
            definition.kind()
        )));
    }
    let envelope: KeySetEnvelope = serde_json::from_value(value.clone())
        .map_err(|e| Error::serialization(format!("malformed key-set envelope: {e}")))?;

    KeySetPartitionsSubset::empty(definition.clone())
        .with_partition_keys(&envelope.subset)
        .map(PartitionsSubset::KeySet)
}

fn decode_time_windows_v1(
    value: &Value,
    definition: &PartitionsDefinition,
) -> Result<PartitionsSubset> {
    let PartitionsDefinition::TimeWindow(definition) = definition else {
        return Err(Error::definition_mismatch(format!(
            "window-list payload deserialized against a {} definition",
            definition.kind()
        )));
    };
    if value.get("time_windows").is_none() {
        return Err(Error::definition_mismatch(
            "time-window definition but the payload carries no time windows",
        ));
    }
    let envelope: TimeWindowEnvelope = serde_json::from_value(value.clone())
        .map_err(|e| Error::serialization(format!("malformed window-list envelope: {e}")))?;

    let windows = envelope
        .time_windows
        .iter()
        .map(decode_window_record)
        .collect::<Result<Vec<TimeWindow>>>()?;

    TimeWindowPartitionsSubset::new(definition.clone(), windows, envelope.num_partitions)
        .map(PartitionsSubset::TimeWindows)
}

fn window_record(window: &TimeWindow) -> TimeWindowRecord {
    TimeWindowRecord {
        start: window.start().timestamp(),
        end: window.end().timestamp(),
        timezone: window.start().timezone().name().to_string(),
    }
}

fn decode_window_record(record: &TimeWindowRecord) -> Result<TimeWindow> {
    let timezone: Tz = record
        .timezone
        .parse()
        .map_err(|_| Error::serialization(format!("unknown timezone id '{}'", record.timezone)))?;
    let start = instant_in(timezone, record.start)?;
    let end = instant_in(timezone, record.end)?;
    TimeWindow::new(start, end).map_err(Error::from)
}

fn instant_in(timezone: Tz, epoch_seconds: i64) -> Result<chrono::DateTime<Tz>> {
    timezone
        .timestamp_opt(epoch_seconds, 0)
        .single()
        .ok_or_else(|| {
            Error::serialization(format!(
                "epoch seconds {epoch_seconds} out of range for timezone {timezone}"
            ))
        })
}

fn to_json<T: Serialize>(envelope: &T) -> Result<String> {
    serde_json::to_string(envelope)
        .map_err(|e| Error::serialization(format!("failed to encode subset envelope: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{StaticPartitionsDefinition, TimeWindowPartitionsDefinition};
    use chrono_tz::UTC;

    fn static_def() -> PartitionsDefinition {
        PartitionsDefinition::Static(
            StaticPartitionsDefinition::new(["foo", "bar", "baz", "qux"]).unwrap(),
        )
    }

    fn daily_def() -> PartitionsDefinition {
        PartitionsDefinition::TimeWindow(
            TimeWindowPartitionsDefinition::daily("2023-01-01", None, UTC).unwrap(),
        )
    }

    #[test]
    fn key_set_envelope_shape_is_stable() {
        let subset = static_def()
            .empty_subset()
            .with_partition_keys(["foo", "baz"])
            .unwrap();
        let serialized = serialize_subset(&subset).unwrap();
        assert_eq!(serialized, r#"{"version":1,"subset":["baz","foo"]}"#);
    }

    #[test]
    fn version_envelope_with_spaces_is_accepted() {
        let deserialized =
            deserialize_subset(r#"{"version": 1, "subset": ["foo", "baz"]}"#, &static_def())
                .unwrap();
        assert_eq!(deserialized.partition_keys(), vec!["baz", "foo"]);
    }

    #[test]
    fn missing_version_field_is_a_serialization_error() {
        let err = deserialize_subset(r#"{"subset": ["foo"]}"#, &static_def()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn scalar_payload_is_rejected() {
        let err = deserialize_subset("42", &static_def()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn legacy_list_with_nonstring_elements_is_rejected() {
        let err = deserialize_subset(r#"["foo", 3]"#, &static_def()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn window_payload_against_static_definition_is_a_mismatch() {
        let windows = daily_def()
            .empty_subset()
            .with_partition_keys(["2023-01-02"])
            .unwrap();
        let serialized = serialize_subset(&windows).unwrap();
        let err = deserialize_subset(&serialized, &static_def()).unwrap_err();
        assert!(matches!(err, Error::DefinitionMismatch { .. }));
    }

    #[test]
    fn key_set_payload_against_window_definition_is_a_mismatch() {
        let err = deserialize_subset(r#"{"version": 1, "subset": ["2023-01-02"]}"#, &daily_def())
            .unwrap_err();
        assert!(matches!(err, Error::DefinitionMismatch { .. }));
    }

    #[test]
    fn unknown_timezone_in_payload_is_rejected() {
        let payload = r#"{"version":1,"time_windows":[{"start":0,"end":86400,"timezone":"Mars/Olympus"}],"num_partitions":1}"#;
        let err = deserialize_subset(payload, &daily_def()).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
