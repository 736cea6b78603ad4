pub mod optimization;
pub mod portfolio;

/// Backend timestamps come either as RFC 3339 or as naive ISO-8601 (implicitly UTC).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(d: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub fn deserialize_opt<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            None => Ok(None),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::TimeZone;

        #[test]
        fn accepts_naive_and_offset_forms() {
            let expected = Utc.with_ymd_and_hms(2026, 3, 2, 14, 30, 0).unwrap();
            assert_eq!(parse("2026-03-02T14:30:00Z"), Some(expected));
            assert_eq!(parse("2026-03-02T16:30:00+02:00"), Some(expected));
            assert_eq!(parse("2026-03-02T14:30:00"), Some(expected));
            assert_eq!(parse("2026-03-02 14:30:00.000"), Some(expected));
            assert_eq!(parse("yesterday"), None);
        }
    }
}
