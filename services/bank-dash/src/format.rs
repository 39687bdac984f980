// services/bank-dash/src/format.rs
//
// Display formatting and badge lookup tables
//

use svckit::types::{
    parse_wire_date, ComponentType, Eligibility, RequestStatus, StockStatus, UrgencyLevel,
};

/// Colour family of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Primary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
}

impl Badge {
    pub fn new(label: impl Into<String>, tone: Tone) -> Self {
        Self {
            label: label.into(),
            tone,
        }
    }
}

/// `Jan 1, 2024` for any date the backend emits, `N/A` when absent.
/// Unparseable input is shown as received.
pub fn format_date(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => "N/A".to_string(),
        Some(s) => match parse_wire_date(s) {
            Some(date) => date.format("%b %-d, %Y").to_string(),
            None => s.to_string(),
        },
    }
}

pub fn or_na(value: Option<&str>) -> String {
    or_fallback(value, "N/A")
}

pub fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn units(quantity: impl std::fmt::Display) -> String {
    format!("{} units", quantity)
}

pub fn record_id(id: u64) -> String {
    format!("#{}", id)
}

pub fn weight(value: Option<f64>) -> String {
    match value {
        // zero reads as "not measured"
        Some(w) if w != 0.0 => {
            if w.fract() == 0.0 {
                format!("{}", w as i64)
            } else {
                format!("{}", w)
            }
        }
        _ => "N/A".to_string(),
    }
}

pub fn urgency_badge(level: UrgencyLevel) -> Badge {
    match level {
        UrgencyLevel::Critical => Badge::new("Critical", Tone::Danger),
        UrgencyLevel::High => Badge::new("High", Tone::Warning),
        UrgencyLevel::Medium => Badge::new("Medium", Tone::Info),
        UrgencyLevel::Low => Badge::new("Low", Tone::Primary),
        UrgencyLevel::Unknown => Badge::new("Unknown", Tone::Primary),
    }
}

pub fn request_status_badge(status: RequestStatus) -> Badge {
    match status {
        RequestStatus::Pending => Badge::new("Pending", Tone::Warning),
        RequestStatus::Approved => Badge::new("Approved", Tone::Info),
        RequestStatus::Fulfilled => Badge::new("Fulfilled", Tone::Success),
        RequestStatus::Rejected => Badge::new("Rejected", Tone::Danger),
        RequestStatus::Cancelled => Badge::new("Cancelled", Tone::Danger),
        RequestStatus::Unknown => Badge::new("Unknown", Tone::Primary),
    }
}

/// Dashboard variant: an approved request already counts as good news there.
pub fn recent_status_badge(status: RequestStatus) -> Badge {
    match status {
        RequestStatus::Approved => Badge::new("Approved", Tone::Success),
        other => request_status_badge(other),
    }
}

pub fn stock_status_badge(status: Option<StockStatus>) -> Badge {
    match status {
        Some(StockStatus::Low) => Badge::new("Low", Tone::Warning),
        Some(StockStatus::OutOfStock) => Badge::new("Out of Stock", Tone::Danger),
        Some(StockStatus::Available) | Some(StockStatus::Unknown) => {
            Badge::new("Available", Tone::Success)
        }
        None => Badge::new("Available", Tone::Info),
    }
}

pub fn eligibility_badge(status: Eligibility) -> Badge {
    match status {
        Eligibility::Eligible => Badge::new("Eligible", Tone::Success),
        Eligibility::NotEligible | Eligibility::Unknown => Badge::new("Not Eligible", Tone::Danger),
    }
}

pub fn activity_badge(is_active: bool) -> Badge {
    if is_active {
        Badge::new("Active", Tone::Success)
    } else {
        Badge::new("Inactive", Tone::Danger)
    }
}

pub fn component_badge(component: ComponentType) -> Badge {
    Badge::new(component.as_str(), Tone::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2024-01-06")), "Jan 6, 2024");
        assert_eq!(format_date(Some("Tue, 12 Mar 2024 00:00:00 GMT")), "Mar 12, 2024");
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("  ")), "N/A");
        assert_eq!(format_date(Some("soon")), "soon");
    }

    #[test]
    fn test_fallbacks() {
        assert_eq!(or_na(None), "N/A");
        assert_eq!(or_na(Some("")), "N/A");
        assert_eq!(or_na(Some("Pune")), "Pune");
        assert_eq!(or_fallback(None, "None"), "None");
        assert_eq!(weight(None), "N/A");
        assert_eq!(weight(Some(72.0)), "72");
        assert_eq!(weight(Some(64.5)), "64.5");
    }

    #[test]
    fn test_badge_tables() {
        assert_eq!(urgency_badge(UrgencyLevel::Critical).tone, Tone::Danger);
        assert_eq!(urgency_badge(UrgencyLevel::Unknown).label, "Unknown");
        assert_eq!(request_status_badge(RequestStatus::Fulfilled).tone, Tone::Success);
        assert_eq!(request_status_badge(RequestStatus::Unknown), Badge::new("Unknown", Tone::Primary));
        assert_eq!(eligibility_badge(Eligibility::Unknown).label, "Not Eligible");
        assert_eq!(activity_badge(false), Badge::new("Inactive", Tone::Danger));
    }

    #[test]
    fn test_stock_status_absent_is_available() {
        assert_eq!(stock_status_badge(None), Badge::new("Available", Tone::Info));
        assert_eq!(stock_status_badge(Some(StockStatus::Available)).tone, Tone::Success);
        assert_eq!(stock_status_badge(Some(StockStatus::OutOfStock)).label, "Out of Stock");
    }
}
