use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

const IST_OFFSET_SECONDS: i32 = 5 * 3600 + 30 * 60;

/// Indian Standard Time (UTC+5:30), the practice's canonical timezone.
pub const IST: FixedOffset = match FixedOffset::east_opt(IST_OFFSET_SECONDS) {
    Some(offset) => offset,
    None => panic!("IST offset out of range"),
};

/// Current instant in IST. Call once per request and pass the value down.
pub fn now_ist() -> DateTime<FixedOffset> {
    to_ist(Utc::now())
}

pub fn to_ist(instant: DateTime<Utc>) -> DateTime<FixedOffset> {
    instant.with_timezone(&IST)
}

/// Interprets a wall-clock timestamp with no offset as IST.
pub fn naive_as_ist(naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
    IST.from_local_datetime(&naive).single()
}

/// Parses a stored timestamp. Values carrying an offset are taken as-is;
/// offset-less values are practice wall-clock time, never UTC.
pub fn parse_practice_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }

    // Postgres `timestamptz` text output, e.g. "2025-03-03 10:00:00+05:30"
    if let Ok(with_offset) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(with_offset.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive_as_ist(naive).map(|local| local.with_timezone(&Utc));
        }
    }

    None
}

/// Serde adapter for optional practice timestamps (see [`parse_practice_timestamp`]).
/// Unparseable values deserialize to `None` instead of failing the whole row.
pub mod serde_practice_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_practice_timestamp))
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => serializer.serialize_some(&instant.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_ist_offset() {
        assert_eq!(IST.local_minus_utc(), 19_800);
        let utc = Utc.with_ymd_and_hms(2025, 3, 3, 4, 30, 0).unwrap();
        assert_eq!(to_ist(utc).hour(), 10);
    }

    #[test]
    fn test_offsetless_timestamp_is_ist() {
        let parsed = parse_practice_timestamp("2025-03-03 10:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 3, 3, 4, 30, 0).unwrap());

        let parsed_t = parse_practice_timestamp("2025-03-03T10:00:00").unwrap();
        assert_eq!(parsed, parsed_t);
    }

    #[test]
    fn test_offset_timestamps_keep_their_offset() {
        let utc = parse_practice_timestamp("2025-03-03T04:30:00Z").unwrap();
        let ist = parse_practice_timestamp("2025-03-03T10:00:00+05:30").unwrap();
        let pg = parse_practice_timestamp("2025-03-03 10:00:00+05:30").unwrap();
        assert_eq!(utc, ist);
        assert_eq!(ist, pg);
    }

    #[test]
    fn test_garbage_timestamp() {
        assert!(parse_practice_timestamp("").is_none());
        assert!(parse_practice_timestamp("next tuesday").is_none());
    }
}
