use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::BankError;

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    /// Canonical display order used by every per-group aggregate.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::AbPos,
        BloodGroup::AbNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        BloodGroup::ALL
            .iter()
            .copied()
            .find(|g| g.as_str() == wanted)
            .ok_or_else(|| BankError::validation(format!("Unknown blood group '{}'", s)))
    }
}

/// Fractionation of a donation. Each component has its own shelf life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    #[serde(rename = "Whole Blood")]
    WholeBlood,
    #[serde(rename = "RBC")]
    Rbc,
    #[serde(rename = "Platelets")]
    Platelets,
    #[serde(rename = "Plasma")]
    Plasma,
}

impl ComponentType {
    pub const ALL: [ComponentType; 4] = [
        ComponentType::WholeBlood,
        ComponentType::Rbc,
        ComponentType::Platelets,
        ComponentType::Plasma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::WholeBlood => "Whole Blood",
            ComponentType::Rbc => "RBC",
            ComponentType::Platelets => "Platelets",
            ComponentType::Plasma => "Plasma",
        }
    }

    /// Days from collection until the component expires.
    pub fn shelf_life_days(&self) -> i64 {
        match self {
            ComponentType::WholeBlood => 35,
            ComponentType::Rbc => 42,
            ComponentType::Platelets => 5,
            ComponentType::Plasma => 365,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BankError::validation(format!("Unknown component type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl UrgencyLevel {
    pub const SELECTABLE: [UrgencyLevel; 4] = [
        UrgencyLevel::Critical,
        UrgencyLevel::High,
        UrgencyLevel::Medium,
        UrgencyLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Critical => "Critical",
            UrgencyLevel::High => "High",
            UrgencyLevel::Medium => "Medium",
            UrgencyLevel::Low => "Low",
            UrgencyLevel::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Fulfilled,
    Rejected,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl RequestStatus {
    pub const SELECTABLE: [RequestStatus; 5] = [
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::Fulfilled,
        RequestStatus::Rejected,
        RequestStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Fulfilled => "Fulfilled",
            RequestStatus::Rejected => "Rejected",
            RequestStatus::Cancelled => "Cancelled",
            RequestStatus::Unknown => "Unknown",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestStatus::SELECTABLE
            .iter()
            .copied()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BankError::validation(format!("Unknown request status '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    Available,
    Low,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(other)]
    Unknown,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Available => "Available",
            StockStatus::Low => "Low",
            StockStatus::OutOfStock => "Out of Stock",
            StockStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    #[serde(rename = "Not Eligible")]
    NotEligible,
    #[serde(other)]
    Unknown,
}

impl Eligibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Eligibility::Eligible => "Eligible",
            Eligibility::NotEligible => "Not Eligible",
            Eligibility::Unknown => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    #[serde(deserialize_with = "lenient_u64")]
    pub donor_id: u64,
    pub name: String,
    pub blood_group: BloodGroup,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_active: bool,
    #[serde(default)]
    pub donor_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(deserialize_with = "lenient_u64")]
    pub donation_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub donor_id: u64,
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub bank_id: u64,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub donation_date: Option<String>,
    pub component_type: ComponentType,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity_units: u32,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub screening_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    #[serde(deserialize_with = "lenient_u64")]
    pub request_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub hospital_id: u64,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub blood_group: BloodGroup,
    pub component_type: ComponentType,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity_units: u32,
    pub urgency_level: UrgencyLevel,
    pub status: RequestStatus,
    #[serde(default)]
    pub request_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub stock_id: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub bank_id: u64,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub blood_group: BloodGroup,
    /// Non-numeric or missing values decode as 0.
    #[serde(default, deserialize_with = "lenient_u32")]
    pub quantity_units: u32,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScreening {
    #[serde(deserialize_with = "lenient_u64")]
    pub health_id: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub donor_id: u64,
    /// Joined client-side from the donor list.
    #[serde(default)]
    pub donor_name: Option<String>,
    #[serde(default)]
    pub screening_date: Option<String>,
    #[serde(default)]
    pub bp: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub weight: Option<f64>,
    #[serde(default)]
    pub disease_detected: Option<String>,
    pub eligibility_status: Eligibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodBank {
    #[serde(deserialize_with = "lenient_u64")]
    pub bank_id: u64,
    pub bank_name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    #[serde(deserialize_with = "lenient_u64")]
    pub hospital_id: u64,
    pub hospital_name: String,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStock {
    pub blood_group: BloodGroup,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_units: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_donors: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_donations: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub pending_requests: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub recent_donations: u64,
    #[serde(default)]
    pub stock_by_group: Vec<GroupStock>,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDonor {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub blood_group: BloodGroup,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorUpdate {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub blood_group: BloodGroup,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDonation {
    pub donor_id: u64,
    pub bank_id: u64,
    pub donation_date: NaiveDate,
    pub component_type: ComponentType,
    pub quantity_units: u32,
    pub expiry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewScreening {
    pub donor_id: u64,
    pub screening_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disease_detected: Option<String>,
    pub eligibility_status: Eligibility,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub hospital_id: u64,
    pub blood_group: BloodGroup,
    pub component_type: ComponentType,
    pub quantity_units: u32,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatusUpdate {
    pub status: RequestStatus,
}

/// Body of a successful create call. Only the id relevant to the endpoint is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub donor_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub donation_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub health_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub request_id: Option<u64>,
}

// ---------------------------------------------------------------------------
// Lenient wire decoding
// ---------------------------------------------------------------------------

/// Reads a JSON value the way a loosely typed backend emits numbers:
/// numbers, numeric strings (SQL decimals), booleans or null.
fn json_number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(json_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64)
        .unwrap_or(0))
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(json_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(json_number(&value)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u64))
}

fn lenient_opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(json_number(&value).filter(|n| n.is_finite()))
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let value = serde_json::Value::deserialize(d)?;
    Ok(match &value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        other => json_number(other).map(|n| n != 0.0).unwrap_or(false),
    })
}

/// Parses the date formats the backend is known to emit: `YYYY-MM-DD`,
/// RFC 3339 timestamps and RFC 2822 / HTTP dates (`Mon, 01 Jan 2024 00:00:00 GMT`).
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(raw) {
        return Some(ts.date_naive());
    }
    // Naive timestamps without offset, e.g. `2024-01-01T08:30:00` or `2024-01-01 08:30:00`
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blood_group_wire_names() {
        for group in BloodGroup::ALL {
            let encoded = serde_json::to_value(group).unwrap();
            assert_eq!(encoded, json!(group.as_str()));
            assert_eq!(group.as_str().parse::<BloodGroup>().unwrap(), group);
        }
        assert!("C+".parse::<BloodGroup>().is_err());
        assert_eq!("ab-".parse::<BloodGroup>().unwrap(), BloodGroup::AbNeg);
    }

    #[test]
    fn test_stock_item_tolerates_loose_numbers() {
        let items: Vec<StockItem> = serde_json::from_value(json!([
            {"stock_id": 1, "bank_id": "2", "bank_name": "City", "location": "X",
             "blood_group": "O+", "quantity_units": "5", "status": null},
            {"stock_id": 2, "bank_id": 2, "bank_name": "City",
             "blood_group": "A-", "quantity_units": null, "status": "Out of Stock"},
            {"stock_id": 3, "bank_id": 2, "bank_name": "City",
             "blood_group": "B+", "quantity_units": "lots", "status": "Recalled"},
        ]))
        .unwrap();

        assert_eq!(items[0].bank_id, 2);
        assert_eq!(items[0].quantity_units, 5);
        assert_eq!(items[0].status, None);
        assert_eq!(items[1].quantity_units, 0);
        assert_eq!(items[1].status, Some(StockStatus::OutOfStock));
        assert_eq!(items[2].quantity_units, 0);
        assert_eq!(items[2].status, Some(StockStatus::Unknown));
    }

    #[test]
    fn test_unknown_request_labels_decode_to_unknown() {
        let req: BloodRequest = serde_json::from_value(json!({
            "request_id": 7, "hospital_id": 1, "hospital_name": "General",
            "blood_group": "AB+", "component_type": "Plasma", "quantity_units": 3,
            "urgency_level": "Extreme", "status": "On Hold", "request_date": "2024-03-01"
        }))
        .unwrap();
        assert_eq!(req.urgency_level, UrgencyLevel::Unknown);
        assert_eq!(req.status, RequestStatus::Unknown);
        assert_eq!(req.location, None);
    }

    #[test]
    fn test_donor_is_active_accepts_mysql_tinyint() {
        let donor: Donor = serde_json::from_value(json!({
            "donor_id": 4, "name": "Asha", "blood_group": "B-", "age": 31,
            "gender": "Female", "phone": "555-0101", "is_active": 1
        }))
        .unwrap();
        assert!(donor.is_active);
        assert_eq!(donor.city, None);
    }

    #[test]
    fn test_payloads_omit_empty_optionals() {
        let payload = NewDonation {
            donor_id: 1,
            bank_id: 2,
            donation_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            component_type: ComponentType::Platelets,
            quantity_units: 1,
            expiry_date: NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(),
            screening_id: None,
        };
        let encoded = serde_json::to_value(&payload).unwrap();
        assert_eq!(encoded["donation_date"], json!("2024-01-01"));
        assert_eq!(encoded["expiry_date"], json!("2024-01-06"));
        assert_eq!(encoded["component_type"], json!("Platelets"));
        assert!(encoded.get("screening_id").is_none());
    }

    #[test]
    fn test_parse_wire_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(parse_wire_date("2024-01-01"), expected);
        assert_eq!(parse_wire_date("2024-01-01T10:00:00Z"), expected);
        assert_eq!(parse_wire_date("Mon, 01 Jan 2024 00:00:00 GMT"), expected);
        assert_eq!(parse_wire_date("2024-01-01 08:30:00"), expected);
        assert_eq!(parse_wire_date(""), None);
        assert_eq!(parse_wire_date("yesterday"), None);
    }
}
