use std::sync::OnceLock;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::clock::IST;

/// Session window recovered from `booking_invitee_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn invitee_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?ix)
            ^\s*
            (?:[a-z]+,\s*)?                             # weekday, redundant with the date
            (?P<month>[a-z]+)\.?\s+
            (?P<day>\d{1,2}),?\s*
            (?P<year>\d{4})\s+
            at\s+
            (?P<start>\d{1,2}:\d{2})\s*(?P<start_meridiem>am|pm)\s*
            [-–]\s*
            (?P<end>\d{1,2}:\d{2})\s*(?P<end_meridiem>am|pm)
            (?:\s*\(?\s*(?P<tz>[a-z][a-z0-9:/_+\-]*)\s*\)?)?
            \s*$",
        )
        .unwrap_or_else(|e| panic!("invitee time pattern must compile: {e}"))
    })
}

/// Parses `"<Weekday>, <Month> <Day>, <Year> at <hh:mm AM/PM> - <hh:mm AM/PM> <TZ>"`.
///
/// Returns `None` for anything it cannot read with certainty; callers treat
/// that as an unresolved window. A missing zone abbreviation means IST. An
/// end time at or before the start time rolls over to the next day.
pub fn parse_invitee_time(raw: &str) -> Option<InviteeWindow> {
    let captures = invitee_pattern().captures(raw)?;

    let date = NaiveDate::parse_from_str(
        &format!("{} {} {}", &captures["month"], &captures["day"], &captures["year"]),
        "%B %d %Y",
    )
    .ok()?;

    let start = parse_clock(&captures["start"], &captures["start_meridiem"])?;
    let end = parse_clock(&captures["end"], &captures["end_meridiem"])?;

    let offset = match captures.name("tz") {
        Some(tz) => zone_offset(tz.as_str())?,
        None => IST,
    };

    let start_at = offset.from_local_datetime(&date.and_time(start)).single()?;
    let mut end_at = offset.from_local_datetime(&date.and_time(end)).single()?;
    if end_at <= start_at {
        end_at += Duration::days(1);
    }

    Some(InviteeWindow {
        start: start_at.with_timezone(&Utc),
        end: end_at.with_timezone(&Utc),
    })
}

fn parse_clock(hh_mm: &str, meridiem: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(&format!("{} {}", hh_mm, meridiem.to_uppercase()), "%I:%M %p").ok()
}

/// Zone abbreviations the scheduling integration is known to emit, plus
/// explicit `GMT+05:30` / `UTC+5:30` style offsets.
fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let upper = zone.to_uppercase();
    match upper.as_str() {
        "IST" | "ASIA/KOLKATA" | "ASIA/CALCUTTA" => return Some(IST),
        "UTC" | "GMT" | "Z" => return FixedOffset::east_opt(0),
        _ => {}
    }

    let signed = upper
        .strip_prefix("GMT")
        .or_else(|| upper.strip_prefix("UTC"))?;
    let (sign, rest) = match signed.chars().next()? {
        '+' => (1, &signed[1..]),
        '-' => (-1, &signed[1..]),
        _ => return None,
    };
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h.parse::<i32>().ok()?, m.parse::<i32>().ok()?),
        None => (rest.parse::<i32>().ok()?, 0),
    };
    if hours > 14 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
