//! XMLTV timestamp conversion

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::trace;

const XMLTV_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";
const XMLTV_DATETIME_LEN: usize = 14;

/// Convert an XMLTV timestamp (`20210423071700 +0000`) to an instant.
///
/// Only the leading `YYYYMMDDHHMMSS` part is read and it is taken as UTC; any
/// timezone suffix is ignored. Empty or malformed input yields the Unix epoch
/// instead of an error.
pub fn parse_xmltv_timestamp(raw: &str) -> DateTime<Utc> {
    let raw = raw.trim();
    if raw.is_empty() {
        return DateTime::<Utc>::UNIX_EPOCH;
    }

    let Some(digits) = raw.get(..XMLTV_DATETIME_LEN) else {
        trace!("XMLTV timestamp too short: '{}'", raw);
        return DateTime::<Utc>::UNIX_EPOCH;
    };

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        trace!("XMLTV timestamp is not numeric: '{}'", raw);
        return DateTime::<Utc>::UNIX_EPOCH;
    }

    match NaiveDateTime::parse_from_str(digits, XMLTV_DATETIME_FORMAT) {
        Ok(dt) => dt.and_utc(),
        Err(e) => {
            trace!("Invalid XMLTV timestamp '{}': {}", raw, e);
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("20210423071700", 2021, 4, 23, 7, 17, 0)]
    #[case("20210423071700 +0000", 2021, 4, 23, 7, 17, 0)]
    #[case("20210423071700 +0300", 2021, 4, 23, 7, 17, 0)]
    #[case("19991231235959 -0500", 1999, 12, 31, 23, 59, 59)]
    fn test_parse_xmltv_timestamp(
        #[case] raw: &str,
        #[case] year: i32,
        #[case] month: u32,
        #[case] day: u32,
        #[case] hour: u32,
        #[case] minute: u32,
        #[case] second: u32,
    ) {
        let expected = Utc
            .with_ymd_and_hms(year, month, day, hour, minute, second)
            .unwrap();
        assert_eq!(parse_xmltv_timestamp(raw), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("20210423")]
    #[case("2021-04-23 07:17")]
    #[case("20211323071700")]
    #[case("20210423256100")]
    #[case("2021042307170é")]
    fn test_malformed_timestamps_yield_epoch(#[case] raw: &str) {
        assert_eq!(parse_xmltv_timestamp(raw), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(parse_xmltv_timestamp("").timestamp(), 0);
        assert_eq!(
            parse_xmltv_timestamp("20210423071700").timestamp(),
            1_619_162_220
        );
    }
}
