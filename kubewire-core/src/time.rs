//! Wire timestamps.
//!
//! Both types wrap a [`jiff::Timestamp`] and accept any RFC 3339 input, including
//! non-UTC offsets and arbitrary fractional digits. They differ in stored precision
//! and output form. Every constructor floors to that precision, so a value always
//! survives an encode and decode unchanged.
use std::fmt;

use jiff::Timestamp;

use crate::{
    codec::{Decode, Decoder, Encode, Encoder},
    error::{DecodeError, EncodeError},
    value::Value,
};

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const NANOS_PER_MICRO: i128 = 1_000;

// Round toward the past so pre-epoch instants land on the earlier unit.
// `Timestamp::MIN` is a whole second, so the result is always in range.
fn floor(ts: Timestamp, unit: i128) -> Timestamp {
    let nanos = ts.as_nanosecond();
    Timestamp::from_nanosecond(nanos - nanos.rem_euclid(unit)).unwrap_or(ts)
}

fn parse(value: Value, de: &mut Decoder, unit: i128) -> Result<Timestamp, DecodeError> {
    let text = match value {
        Value::String(text) => text,
        other => return Err(de.type_mismatch("timestamp", &other)),
    };
    text.parse::<Timestamp>()
        .map(|ts| floor(ts, unit))
        .map_err(|err| de.invalid_value(format_args!("invalid RFC 3339 timestamp {text:?}: {err}")))
}

/// A timestamp with whole-second precision, written as `2006-01-02T15:04:05Z`.
///
/// Sub-second input is dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time(Timestamp);

impl Time {
    /// Wrap `ts`, dropping anything below one second
    pub fn new(ts: Timestamp) -> Self {
        Self(floor(ts, NANOS_PER_SECOND))
    }

    /// The current time, truncated to seconds
    pub fn now() -> Self {
        Self::new(Timestamp::now())
    }

    /// The wrapped instant
    pub fn timestamp(&self) -> Timestamp {
        self.0
    }
}

impl From<Timestamp> for Time {
    fn from(ts: Timestamp) -> Self {
        Self::new(ts)
    }
}

impl From<Time> for Timestamp {
    fn from(time: Time) -> Self {
        time.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Z", self.0.strftime("%Y-%m-%dT%H:%M:%S"))
    }
}

impl Decode for Time {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        parse(value, de, NANOS_PER_SECOND).map(Self)
    }
}

impl Encode for Time {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

/// A timestamp with microsecond precision, written as `2006-01-02T15:04:05.000000Z`.
///
/// Used by leases and events where ordering below one second matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MicroTime(Timestamp);

impl MicroTime {
    /// Wrap `ts`, dropping anything below one microsecond
    pub fn new(ts: Timestamp) -> Self {
        Self(floor(ts, NANOS_PER_MICRO))
    }

    /// The current time, truncated to microseconds
    pub fn now() -> Self {
        Self::new(Timestamp::now())
    }

    /// The wrapped instant
    pub fn timestamp(&self) -> Timestamp {
        self.0
    }
}

impl From<Timestamp> for MicroTime {
    fn from(ts: Timestamp) -> Self {
        Self::new(ts)
    }
}

impl From<MicroTime> for Timestamp {
    fn from(time: MicroTime) -> Self {
        time.0
    }
}

impl fmt::Display for MicroTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0.as_nanosecond().rem_euclid(NANOS_PER_SECOND) / NANOS_PER_MICRO;
        write!(f, "{}.{micros:06}Z", self.0.strftime("%Y-%m-%dT%H:%M:%S"))
    }
}

impl Decode for MicroTime {
    fn decode(value: Value, de: &mut Decoder) -> Result<Self, DecodeError> {
        parse(value, de, NANOS_PER_MICRO).map(Self)
    }
}

impl Encode for MicroTime {
    fn encode(&self, _: &mut Encoder) -> Result<Value, EncodeError> {
        Ok(Value::String(self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec::{from_value, to_value},
        value::ValueKind,
    };
    use serde_json::json;

    #[test]
    fn time_drops_fraction() {
        let t: Time = from_value(json!("2024-01-02T03:04:05.987Z")).unwrap();
        assert_eq!(to_value(&t).unwrap(), json!("2024-01-02T03:04:05Z"));
    }

    #[test]
    fn time_normalizes_offsets_to_utc() {
        let t: Time = from_value(json!("2024-01-02T05:04:05+02:00")).unwrap();
        assert_eq!(t.to_string(), "2024-01-02T03:04:05Z");
    }

    #[test]
    fn time_floors_before_epoch() {
        let t: Time = from_value(json!("1969-12-31T23:59:59.5Z")).unwrap();
        assert_eq!(t.timestamp().as_second(), -1);
        assert_eq!(t.to_string(), "1969-12-31T23:59:59Z");
    }

    #[test]
    fn micro_time_keeps_six_digits() {
        let t: MicroTime = from_value(json!("2024-01-02T03:04:05.1234567Z")).unwrap();
        assert_eq!(to_value(&t).unwrap(), json!("2024-01-02T03:04:05.123456Z"));

        let t: MicroTime = from_value(json!("2024-01-02T03:04:05Z")).unwrap();
        assert_eq!(t.to_string(), "2024-01-02T03:04:05.000000Z");
    }

    #[test]
    fn constructed_values_round_trip() {
        let ts = Timestamp::from_nanosecond(1_700_000_000_123_456_789).unwrap();

        let t = Time::from(ts);
        assert_eq!(t.to_string(), "2023-11-14T22:13:20Z");
        assert_eq!(from_value::<Time>(to_value(&t).unwrap()).unwrap(), t);

        let t = MicroTime::new(ts);
        assert_eq!(t.to_string(), "2023-11-14T22:13:20.123456Z");
        assert_eq!(from_value::<MicroTime>(to_value(&t).unwrap()).unwrap(), t);
        assert_eq!(Timestamp::from(t).as_nanosecond(), 1_700_000_000_123_456_000);
    }

    #[test]
    fn now_is_already_truncated() {
        let t = MicroTime::now();
        assert_eq!(t.timestamp().as_nanosecond() % 1_000, 0);
        assert_eq!(Time::now().timestamp().subsec_nanosecond(), 0);
    }

    #[test]
    fn malformed_timestamps() {
        let err = from_value::<Time>(json!("yesterday")).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidValue { .. }));
        let err = from_value::<MicroTime>(json!(1700000000)).unwrap_err();
        assert_eq!(err, DecodeError::TypeMismatch {
            field: "<root>".into(),
            expected: "timestamp",
            actual: ValueKind::Integer,
        });
    }
}
