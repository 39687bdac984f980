// services/bank-dash/src/state/requests.rs
//
// Hospital blood requests with status and blood-group filters
//

use svckit::types::{BloodGroup, BloodRequest, RequestStatus};
use svckit::{BankResult, RequestQuery};
use tracing::warn;

use crate::format::{format_date, or_na, record_id, request_status_badge, units, urgency_badge};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

const HEADERS: [&str; 9] = [
    "ID", "Hospital", "Location", "Blood Group", "Component", "Quantity", "Urgency", "Status", "Date",
];

#[derive(Debug, Default)]
pub struct RequestView {
    requests: Vec<BloodRequest>,
    filter: RequestQuery,
    error: Option<String>,
}

impl RequestView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[BloodRequest] {
        &self.requests
    }

    pub fn filter(&self) -> RequestQuery {
        self.filter
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply_requests(&mut self, result: BankResult<Vec<BloodRequest>>, toasts: &mut Toasts) {
        match result {
            Ok(requests) => {
                self.requests = requests;
                self.error = None;
            }
            Err(e) => {
                warn!("Error loading requests: {}", e);
                self.error = Some("Error loading requests".to_string());
                toasts.error("Error loading requests");
            }
        }
    }

    pub fn set_status(&mut self, status: Option<RequestStatus>) -> RequestQuery {
        self.filter.status = status;
        self.filter
    }

    pub fn set_blood_group(&mut self, group: Option<BloodGroup>) -> RequestQuery {
        self.filter.blood_group = group;
        self.filter
    }

    pub fn cycle_status(&mut self) -> RequestQuery {
        let next = super::cycle_option(&RequestStatus::SELECTABLE, self.filter.status);
        self.set_status(next)
    }

    pub fn cycle_blood_group(&mut self) -> RequestQuery {
        let next = super::cycle_option(&BloodGroup::ALL, self.filter.blood_group);
        self.set_blood_group(next)
    }

    pub fn request_at(&self, index: usize) -> Option<&BloodRequest> {
        self.requests.get(index)
    }

    pub fn table(&self) -> TableView {
        render_requests(&self.requests)
    }
}

pub fn render_requests(requests: &[BloodRequest]) -> TableView {
    TableView::from_records(&HEADERS, requests, ("📋", "No requests found"), |r| {
        vec![
            Cell::plain(record_id(r.request_id)),
            Cell::strong(r.hospital_name.clone()),
            Cell::plain(or_na(r.location.as_deref())),
            Cell::Group(r.blood_group),
            Cell::plain(r.component_type.as_str()),
            Cell::strong(units(r.quantity_units)),
            Cell::Badge(urgency_badge(r.urgency_level)),
            Cell::Badge(request_status_badge(r.status)),
            Cell::plain(format_date(r.request_date.as_deref())),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::{ComponentType, UrgencyLevel};

    fn request(id: u64, urgency: UrgencyLevel, status: RequestStatus) -> BloodRequest {
        BloodRequest {
            request_id: id,
            hospital_id: 1,
            hospital_name: "St. Mary".to_string(),
            location: None,
            blood_group: BloodGroup::AbNeg,
            component_type: ComponentType::Plasma,
            quantity_units: 4,
            urgency_level: urgency,
            status,
            request_date: Some("2024-02-10".to_string()),
        }
    }

    #[test]
    fn test_render_requests_badges() {
        let table = render_requests(&[
            request(1, UrgencyLevel::Critical, RequestStatus::Pending),
            request(2, UrgencyLevel::Unknown, RequestStatus::Unknown),
        ]);
        assert_eq!(table.column(2), vec!["N/A", "N/A"]);
        assert_eq!(table.column(6), vec!["Critical", "Unknown"]);
        assert_eq!(table.column(7), vec!["Pending", "Unknown"]);
        assert_eq!(table.column(8), vec!["Feb 10, 2024", "Feb 10, 2024"]);
    }

    #[test]
    fn test_empty_requests_placeholder() {
        let table = render_requests(&[]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.record_count(), 0);
        assert_eq!(table.placeholder_message(), Some("No requests found"));
    }

    #[test]
    fn test_filters_compose() {
        let mut view = RequestView::new();
        view.set_status(Some(RequestStatus::Approved));
        let query = view.set_blood_group(Some(BloodGroup::OPos));
        assert_eq!(query.status, Some(RequestStatus::Approved));
        assert_eq!(query.blood_group, Some(BloodGroup::OPos));

        let query = view.set_status(None);
        assert_eq!(query.status, None);
        assert_eq!(query.blood_group, Some(BloodGroup::OPos));
    }

    #[test]
    fn test_cycle_status_wraps_to_all() {
        let mut view = RequestView::new();
        for expected in RequestStatus::SELECTABLE {
            assert_eq!(view.cycle_status().status, Some(expected));
        }
        assert_eq!(view.cycle_status().status, None);
    }
}
