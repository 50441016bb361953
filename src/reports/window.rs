//! Calendar windows evaluated at the shop's UTC offset.

use std::str::FromStr;

use time::{macros::format_description, Date, Duration, OffsetDateTime, Time, UtcOffset};

use super::dto::ReportQuery;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Month,
    Year,
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(AppError::invalid(
                "period",
                "period must be one of today, month, year",
            )),
        }
    }
}

fn local_midnight(date: Date, offset: UtcOffset) -> OffsetDateTime {
    date.with_time(Time::MIDNIGHT).assume_offset(offset)
}

fn local_date(now: OffsetDateTime, offset: UtcOffset) -> Date {
    now.to_offset(offset).date()
}

pub fn start_of_day(now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    local_midnight(local_date(now, offset), offset)
}

pub fn start_of_month(now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    let today = local_date(now, offset);
    local_midnight(today - Duration::days(i64::from(today.day()) - 1), offset)
}

pub fn start_of_year(now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
    let today = local_date(now, offset);
    local_midnight(today - Duration::days(i64::from(today.ordinal()) - 1), offset)
}

impl Period {
    pub fn start(self, now: OffsetDateTime, offset: UtcOffset) -> OffsetDateTime {
        match self {
            Self::Today => start_of_day(now, offset),
            Self::Month => start_of_month(now, offset),
            Self::Year => start_of_year(now, offset),
        }
    }
}

fn parse_date(field: &'static str, raw: &str) -> AppResult<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid(field, "Expected a date formatted YYYY-MM-DD"))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Half-open window `[from, until)` selected by a report query. The end date
/// is inclusive, so `until` is the following midnight.
pub fn resolve(
    query: &ReportQuery,
    now: OffsetDateTime,
    offset: UtcOffset,
) -> AppResult<(Option<OffsetDateTime>, Option<OffsetDateTime>)> {
    let start = non_blank(&query.start);
    let end = non_blank(&query.end);

    if let Some(period) = non_blank(&query.period) {
        if start.is_some() || end.is_some() {
            return Err(AppError::invalid(
                "period",
                "period cannot be combined with start or end",
            ));
        }
        let period: Period = period.parse()?;
        return Ok((Some(period.start(now, offset)), None));
    }

    let start = start.map(|s| parse_date("start", s)).transpose()?;
    let end = end.map(|e| parse_date("end", e)).transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(AppError::invalid("start", "start must not be after end"));
        }
    }

    let from = start.map(|d| local_midnight(d, offset));
    let until = end
        .map(|d| {
            d.next_day()
                .map(|next| local_midnight(next, offset))
                .ok_or_else(|| AppError::invalid("end", "end date out of range"))
        })
        .transpose()?;
    Ok((from, until))
}
