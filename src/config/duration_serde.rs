//! Serde helpers for human-readable durations in the configuration file

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};
use std::{fmt, time::Duration};

/// Serialize a `Duration` as a humantime string (`"10m"`) and accept either
/// such a string or a plain number of seconds when deserializing
pub mod duration {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration_str = humantime::format_duration(*duration).to_string();
        serializer.serialize_str(&duration_str)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl Visitor<'_> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "a duration as seconds (number) or human-readable string (e.g., '10m', '1h30m')",
                )
            }

            fn visit_u64<E>(self, seconds: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(seconds))
            }

            // TOML integers arrive as i64
            fn visit_i64<E>(self, seconds: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(seconds)
                    .map(Duration::from_secs)
                    .map_err(|_| {
                        de::Error::custom(format!("Duration cannot be negative: {seconds}"))
                    })
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                humantime::parse_duration(value)
                    .map_err(|e| de::Error::custom(format!("Invalid duration '{value}': {e}")))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper {
        #[serde(with = "duration")]
        value: Duration,
    }

    #[test]
    fn test_human_readable_round_trip() {
        let parsed: Wrapper = toml::from_str(r#"value = "1h30m""#).unwrap();
        assert_eq!(parsed.value, Duration::from_secs(5400));

        let rendered = toml::to_string(&parsed).unwrap();
        assert_eq!(rendered.trim(), r#"value = "1h 30m""#);
    }

    #[test]
    fn test_seconds_as_number() {
        let parsed: Wrapper = toml::from_str("value = 600").unwrap();
        assert_eq!(parsed.value, Duration::from_secs(600));
    }

    #[test]
    fn test_invalid_durations() {
        assert!(toml::from_str::<Wrapper>(r#"value = "soon""#).is_err());
        assert!(toml::from_str::<Wrapper>("value = -5").is_err());
    }
}
