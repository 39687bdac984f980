// services/bank-dash/src/state/donations.rs
//
// Donation history list
//

use svckit::types::Donation;
use svckit::BankResult;
use tracing::warn;

use crate::format::{component_badge, format_date, or_na, record_id, units};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

const HEADERS: [&str; 7] = ["ID", "Donor", "Blood Bank", "Date", "Component", "Quantity", "Expiry"];

#[derive(Debug, Default)]
pub struct DonationView {
    donations: Vec<Donation>,
    error: Option<String>,
}

impl DonationView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn donations(&self) -> &[Donation] {
        &self.donations
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply_donations(&mut self, result: BankResult<Vec<Donation>>, toasts: &mut Toasts) {
        match result {
            Ok(donations) => {
                self.donations = donations;
                self.error = None;
            }
            Err(e) => {
                warn!("Error loading donations: {}", e);
                self.error = Some("Error loading donations".to_string());
                toasts.error("Error loading donations");
            }
        }
    }

    pub fn table(&self) -> TableView {
        render_donations(&self.donations)
    }
}

pub fn render_donations(donations: &[Donation]) -> TableView {
    TableView::from_records(&HEADERS, donations, ("💉", "No donations recorded"), |d| {
        vec![
            Cell::plain(record_id(d.donation_id)),
            Cell::strong(or_na(d.donor_name.as_deref())),
            Cell::plain(or_na(d.bank_name.as_deref())),
            Cell::plain(format_date(d.donation_date.as_deref())),
            Cell::Badge(component_badge(d.component_type)),
            Cell::strong(units(d.quantity_units)),
            Cell::plain(format_date(d.expiry_date.as_deref())),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::ComponentType;

    #[test]
    fn test_render_donations() {
        let donations = vec![Donation {
            donation_id: 11,
            donor_id: 1,
            donor_name: None,
            bank_id: 2,
            bank_name: Some("Central".to_string()),
            donation_date: Some("2024-01-01".to_string()),
            component_type: ComponentType::Platelets,
            quantity_units: 1,
            expiry_date: None,
            screening_id: None,
        }];
        let table = render_donations(&donations);
        assert_eq!(table.column(0), vec!["#11"]);
        assert_eq!(table.column(1), vec!["N/A"]);
        assert_eq!(table.column(3), vec!["Jan 1, 2024"]);
        assert_eq!(table.column(4), vec!["Platelets"]);
        assert_eq!(table.column(5), vec!["1 units"]);
        assert_eq!(table.column(6), vec!["N/A"]);
    }

    #[test]
    fn test_empty_donations_placeholder() {
        let view = DonationView::new();
        let table = view.table();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.placeholder_message(), Some("No donations recorded"));
    }
}
