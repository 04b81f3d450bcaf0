use serde::{Deserialize, Serialize};

/// `booking_status` as written by the scheduling integration, normalized.
///
/// The integration is inconsistent about spelling (`canceled`/`cancelled`)
/// and separators (`no show`/`no_show`/`no-show`); all variants collapse here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawBookingStatus {
    Confirmed,
    Cancelled,
    NoShow,
    Rescheduled,
    Other(String),
    Missing,
}

impl RawBookingStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let normalized = match raw.map(normalize) {
            Some(value) if !value.is_empty() => value,
            _ => return RawBookingStatus::Missing,
        };

        match normalized.as_str() {
            "confirmed" => RawBookingStatus::Confirmed,
            "cancelled" | "canceled" => RawBookingStatus::Cancelled,
            "no_show" | "noshow" => RawBookingStatus::NoShow,
            "rescheduled" => RawBookingStatus::Rescheduled,
            _ => RawBookingStatus::Other(normalized),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RawBookingStatus::Cancelled)
    }

    pub fn is_no_show(&self) -> bool {
        matches!(self, RawBookingStatus::NoShow)
    }

    /// Cancelled and no-show bookings never count as live or pending work.
    pub fn is_terminal(&self) -> bool {
        self.is_cancelled() || self.is_no_show()
    }

    /// Canonical column value, used when writing back to the database.
    pub fn as_db_value(&self) -> Option<&str> {
        match self {
            RawBookingStatus::Confirmed => Some("confirmed"),
            RawBookingStatus::Cancelled => Some("cancelled"),
            RawBookingStatus::NoShow => Some("no_show"),
            RawBookingStatus::Rescheduled => Some("rescheduled"),
            RawBookingStatus::Other(value) => Some(value.as_str()),
            RawBookingStatus::Missing => None,
        }
    }
}

/// `refund_status` column, normalized the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Requested,
    /// Both `completed` and `processed` mean the money went back.
    Processed,
    Other(String),
    Missing,
}

impl RefundStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        let normalized = match raw.map(normalize) {
            Some(value) if !value.is_empty() => value,
            _ => return RefundStatus::Missing,
        };

        match normalized.as_str() {
            "requested" => RefundStatus::Requested,
            "completed" | "processed" => RefundStatus::Processed,
            _ => RefundStatus::Other(normalized),
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_spellings() {
        assert_eq!(RawBookingStatus::parse(Some("cancelled")), RawBookingStatus::Cancelled);
        assert_eq!(RawBookingStatus::parse(Some("canceled")), RawBookingStatus::Cancelled);
        assert_eq!(RawBookingStatus::parse(Some(" Cancelled ")), RawBookingStatus::Cancelled);
    }

    #[test]
    fn test_no_show_separators() {
        for raw in ["no_show", "no show", "No Show", "no-show", "no  show", "noshow"] {
            assert_eq!(RawBookingStatus::parse(Some(raw)), RawBookingStatus::NoShow, "{}", raw);
        }
    }

    #[test]
    fn test_missing_and_other() {
        assert_eq!(RawBookingStatus::parse(None), RawBookingStatus::Missing);
        assert_eq!(RawBookingStatus::parse(Some("   ")), RawBookingStatus::Missing);
        assert_eq!(
            RawBookingStatus::parse(Some("Awaiting Payment")),
            RawBookingStatus::Other("awaiting_payment".to_string())
        );
    }

    #[test]
    fn test_db_values() {
        assert_eq!(RawBookingStatus::parse(Some("no show")).as_db_value(), Some("no_show"));
        assert_eq!(RawBookingStatus::parse(Some("canceled")).as_db_value(), Some("cancelled"));
        assert_eq!(RawBookingStatus::Missing.as_db_value(), None);
    }

    #[test]
    fn test_refund_status() {
        assert_eq!(RefundStatus::parse(Some("Requested")), RefundStatus::Requested);
        assert_eq!(RefundStatus::parse(Some("completed")), RefundStatus::Processed);
        assert_eq!(RefundStatus::parse(Some("processed")), RefundStatus::Processed);
        assert_eq!(RefundStatus::parse(None), RefundStatus::Missing);
    }
}
