use crate::consts::{DATAVERSE_TIMESTAMP, ISO_DATE};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use time::format_description::{self, OwnedFormatItem};
use time::{Date, PrimitiveDateTime};

/// Parser for the timestamps Dataverse writes into its exports.
///
/// Build one at start-up and hand out references; the parsed format
/// descriptions are immutable and safe to share between tasks.
#[derive(Clone, Debug)]
pub struct TimestampFormat {
    datetime: OwnedFormatItem,
    date: OwnedFormatItem,
}
impl TimestampFormat {
    pub fn new() -> Result<Self> {
        Ok(Self { datetime: Self::compile(DATAVERSE_TIMESTAMP)?, date: Self::compile(ISO_DATE)? })
    }

    fn compile(description: &'static str) -> Result<OwnedFormatItem> {
        format_description::parse_owned::<2>(description)
            .or_raise(|| ErrorKind::ParseError { field: "timestamp format", value: description.to_string() })
    }

    /// Parses `yyyy-MM-dd HH:mm:ss.SSS`, falling back to a bare `yyyy-MM-dd`
    /// (read as midnight).
    pub fn parse(&self, value: &str) -> Result<PrimitiveDateTime> {
        let value = value.trim();
        PrimitiveDateTime::parse(value, &self.datetime)
            .or_else(|_| Date::parse(value, &self.date).map(Date::midnight))
            .or_raise(|| ErrorKind::ParseError { field: "timestamp", value: value.to_string() })
    }
}
