//! Built-in scalar conversions.
//!
//! | Type | Accepted text | `<tag/>` (no text) |
//! |------|---------------|--------------------|
//! | `bool` | `true`, `false`, `1`, `0` | no value |
//! | integers | decimal integer syntax | no value |
//! | `f32`, `f64` | float syntax | no value |
//! | `char` | first character, `'\0'` for empty text | no value |
//! | `String` | any text | no value |
//! | `Decimal` | decimal or scientific notation | no value |
//! | `NaiveDate` | `2024-01-31` | no value |
//! | `NaiveDateTime` | `2024-01-31T08:30:00.250` | no value |
//! | `DateTime<Utc>` | RFC 3339 | no value |
//!
//! "No value" leaves the field untouched. Malformed text is an error, never a
//! silent default.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::bind::XmlBind;
use crate::error::{ConvertError, SchemaError};
use crate::mapper::Mapper;
use crate::schema::Resolver;

/// Canonical textual format of [`NaiveDate`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical textual format of [`NaiveDateTime`] values.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A value with a built-in textual representation.
pub trait Scalar: Sized + Send + 'static {
    /// Converts element or attribute text; `None` means the element had no text.
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError>;

    /// Renders the value in the form [`from_text`](Scalar::from_text) accepts.
    fn to_text(&self) -> String;
}

macro_rules! impl_scalar_bind {
    ($($ty:ty),* $(,)?) => {
        $(
            impl XmlBind for $ty {
                fn mapper(_resolver: &mut Resolver<'_>) -> Result<Mapper, SchemaError> {
                    Ok(Mapper::scalar::<$ty>())
                }
            }
        )*
    };
}

macro_rules! impl_parsed_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Scalar for $ty {
                fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
                    match text {
                        None => Ok(None),
                        Some(text) => text
                            .trim()
                            .parse::<$ty>()
                            .map(Some)
                            .map_err(|_| ConvertError::invalid(stringify!($ty), text)),
                    }
                }

                fn to_text(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_parsed_scalar!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl_scalar_bind!(
    bool,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    char,
    String,
    Decimal,
    NaiveDate,
    NaiveDateTime,
    DateTime<Utc>,
);

impl Scalar for bool {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        match text.map(str::trim) {
            None => Ok(None),
            Some("true") | Some("1") => Ok(Some(true)),
            Some("false") | Some("0") => Ok(Some(false)),
            Some(other) => Err(ConvertError::invalid("bool", other)),
        }
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl Scalar for char {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        Ok(text.map(|text| text.chars().next().unwrap_or('\0')))
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl Scalar for String {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        Ok(text.map(str::to_string))
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

impl Scalar for Decimal {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        let trimmed = text.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(Some)
            .map_err(|_| ConvertError::invalid("decimal", text))
    }

    fn to_text(&self) -> String {
        self.to_string()
    }
}

impl Scalar for NaiveDate {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| ConvertError::invalid("date", text))
    }

    fn to_text(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }
}

impl Scalar for NaiveDateTime {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        NaiveDateTime::parse_from_str(text.trim(), DATE_TIME_FORMAT)
            .map(Some)
            .map_err(|_| ConvertError::invalid("date-time", text))
    }

    fn to_text(&self) -> String {
        self.format(DATE_TIME_FORMAT).to_string()
    }
}

impl Scalar for DateTime<Utc> {
    fn from_text(text: Option<&str>) -> Result<Option<Self>, ConvertError> {
        let Some(text) = text else {
            return Ok(None);
        };
        DateTime::parse_from_rfc3339(text.trim())
            .map(|value| Some(value.with_timezone(&Utc)))
            .map_err(|_| ConvertError::invalid("timestamp", text))
    }

    fn to_text(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn round_trip<S: Scalar + PartialEq + std::fmt::Debug>(value: S) {
        let text = value.to_text();
        assert_eq!(S::from_text(Some(&text)).unwrap(), Some(value), "{}", text);
    }

    #[test]
    fn test_round_trips() {
        round_trip(true);
        round_trip(false);
        round_trip(-42i8);
        round_trip(i64::MIN);
        round_trip(u64::MAX);
        round_trip(0.1f32);
        round_trip(-1234.5678e-9f64);
        round_trip(f64::MAX);
        round_trip('x');
        round_trip('\u{263A}');
        round_trip("text with spaces".to_string());
        round_trip(dec!(-12.3400));
        round_trip(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        round_trip(
            NaiveDate::from_ymd_opt(2024, 1, 31)
                .unwrap()
                .and_hms_milli_opt(8, 30, 0, 250)
                .unwrap(),
        );
        round_trip(
            NaiveDate::from_ymd_opt(1999, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 59)
                .unwrap(),
        );
        round_trip(Utc.with_ymd_and_hms(2020, 5, 17, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_null_input() {
        assert_eq!(i32::from_text(None).unwrap(), None);
        assert_eq!(bool::from_text(None).unwrap(), None);
        assert_eq!(char::from_text(None).unwrap(), None);
        assert_eq!(String::from_text(None).unwrap(), None);
        assert_eq!(String::from_text(Some("")).unwrap(), Some(String::new()));
        assert_eq!(NaiveDate::from_text(None).unwrap(), None);
    }

    #[test]
    fn test_malformed_text_is_an_error() {
        assert_eq!(
            i32::from_text(Some("12x")),
            Err(ConvertError::invalid("i32", "12x"))
        );
        assert!(u8::from_text(Some("256")).is_err());
        assert!(bool::from_text(Some("yes")).is_err());
        assert!(f64::from_text(Some("1,5")).is_err());
        assert!(NaiveDate::from_text(Some("2024-13-01")).is_err());
        assert!(DateTime::<Utc>::from_text(Some("yesterday")).is_err());
        assert!(Decimal::from_text(Some("ten")).is_err());
    }

    #[test]
    fn test_lenient_forms() {
        assert_eq!(bool::from_text(Some("1")).unwrap(), Some(true));
        assert_eq!(i32::from_text(Some(" 12 ")).unwrap(), Some(12));
        assert_eq!(char::from_text(Some("")).unwrap(), Some('\0'));
        assert_eq!(char::from_text(Some("abc")).unwrap(), Some('a'));
        assert_eq!(Decimal::from_text(Some("1e3")).unwrap(), Some(dec!(1000)));
        assert_eq!(
            DateTime::<Utc>::from_text(Some("2020-05-17T12:00:00+02:00")).unwrap(),
            Some(Utc.with_ymd_and_hms(2020, 5, 17, 10, 0, 0).unwrap())
        );
    }
}
