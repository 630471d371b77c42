//! Core domain types for conference records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// On-disk datetime encoding, lossless to the second.
///
/// Lexicographic order of this encoding equals chronological order, so the
/// storage layer can compare range bounds directly on the TEXT columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Conference
// ---------------------------------------------------------------------------

/// A single conference as extracted from the remote listings page.
///
/// `remote_id` is the stable identifier assigned by the upstream source and
/// is the unique reconciliation key in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    /// Stable upstream identifier (unique key for reconciliation).
    pub remote_id: i64,
    /// Display title, arbitrary length.
    pub title: String,
    /// Event abstract; empty when the listing carries none.
    pub abstract_text: String,
    /// Display location.
    pub location: String,
    /// Start of the event.
    #[serde(with = "datetime_format")]
    pub start: NaiveDateTime,
    /// End of the event.
    #[serde(with = "datetime_format")]
    pub end: NaiveDateTime,
    /// Canonical link to the event's remote page.
    pub url: String,
}

// ---------------------------------------------------------------------------
// StoredConference
// ---------------------------------------------------------------------------

/// A conference as persisted locally.
///
/// `date_added` is set from the run timestamp on first insertion and never
/// modified afterwards, even when every other field is overwritten by a
/// later re-extraction of the same `remote_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConference {
    /// The extracted record.
    pub conference: Conference,
    /// Instant this record was first observed locally.
    #[serde(with = "datetime_format")]
    pub date_added: NaiveDateTime,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

/// Serialize/deserialize [`NaiveDateTime`] with [`DATETIME_FORMAT`].
pub mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::DATETIME_FORMAT;

    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(DATETIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, DATETIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Encode a datetime with [`DATETIME_FORMAT`] for storage.
pub fn encode_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

/// Decode a datetime stored with [`DATETIME_FORMAT`].
pub fn decode_datetime(s: &str) -> crate::error::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map_err(|e| crate::error::ConftrackError::Storage(format!("invalid datetime {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn sample() -> Conference {
        Conference {
            remote_id: 1633001,
            title: "International Conference on General Relativity".into(),
            abstract_text: "Plenary and parallel sessions.".into(),
            location: "Glasgow, United Kingdom".into(),
            start: NaiveDate::from_ymd_opt(2026, 7, 13).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 7, 17).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            url: "https://example.org/gr24".into(),
        }
    }

    #[test]
    fn conference_serde_roundtrip() {
        let conf = sample();
        let json = serde_json::to_string(&conf).expect("serialize");
        assert!(json.contains("2026-07-13T00:00:00"));
        let parsed: Conference = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, conf);
    }

    #[test]
    fn datetime_encoding_is_lossless_to_the_second() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(13, 59, 58)
            .unwrap();
        let encoded = encode_datetime(dt);
        assert_eq!(encoded, "2024-03-01T13:59:58");
        assert_eq!(decode_datetime(&encoded).unwrap(), dt);
    }

    #[test]
    fn datetime_encoding_orders_lexicographically() {
        let earlier = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 11, 30).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(encode_datetime(earlier) < encode_datetime(later));
    }
}
