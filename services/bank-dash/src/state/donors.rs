// services/bank-dash/src/state/donors.rs
//
// Donor list with client-side search and a server-side blood-group filter
//

use svckit::types::{BloodGroup, Donor};
use svckit::{BankResult, DonorQuery};
use tracing::warn;

use crate::format::{activity_badge, or_na, record_id};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

const HEADERS: [&str; 8] = ["ID", "Name", "Blood Group", "Age", "Gender", "Phone", "City", "Status"];

#[derive(Debug, Default)]
pub struct DonorView {
    donors: Vec<Donor>,
    search: String,
    blood_group: Option<BloodGroup>,
    error: Option<String>,
}

impl DonorView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn donors(&self) -> &[Donor] {
        &self.donors
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn blood_group(&self) -> Option<BloodGroup> {
        self.blood_group
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn query(&self) -> DonorQuery {
        DonorQuery {
            blood_group: self.blood_group,
            ..DonorQuery::default()
        }
    }

    pub fn apply_donors(&mut self, result: BankResult<Vec<Donor>>, toasts: &mut Toasts) {
        match result {
            Ok(donors) => {
                self.donors = donors;
                self.error = None;
            }
            Err(e) => {
                warn!("Error loading donors: {}", e);
                self.error = Some("Error loading donors".to_string());
                toasts.error("Error loading donors");
            }
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search.push(c);
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
    }

    /// Sets the blood-group predicate; `None` reloads the full list.
    pub fn set_blood_group(&mut self, group: Option<BloodGroup>) -> DonorQuery {
        self.blood_group = group;
        self.query()
    }

    pub fn cycle_blood_group(&mut self) -> DonorQuery {
        let next = super::cycle_option(&BloodGroup::ALL, self.blood_group);
        self.set_blood_group(next)
    }

    /// Donors matching the search term: name or email (case-insensitive)
    /// or phone (verbatim substring).
    pub fn visible(&self) -> Vec<&Donor> {
        let term = self.search.trim();
        if term.is_empty() {
            return self.donors.iter().collect();
        }
        let lowered = term.to_lowercase();
        self.donors
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&lowered)
                    || d.email
                        .as_deref()
                        .map_or(false, |e| e.to_lowercase().contains(&lowered))
                    || d.phone.as_deref().map_or(false, |p| p.contains(term))
            })
            .collect()
    }

    pub fn donor_at(&self, index: usize) -> Option<&Donor> {
        self.visible().get(index).copied()
    }

    pub fn table(&self) -> TableView {
        render_donors(&self.visible())
    }
}

pub fn render_donors(donors: &[&Donor]) -> TableView {
    TableView::from_records(&HEADERS, donors, ("👤", "No donors found"), |d| {
        vec![
            Cell::plain(record_id(d.donor_id)),
            Cell::strong(d.name.clone()),
            Cell::Group(d.blood_group),
            Cell::plain(d.age.to_string()),
            Cell::plain(d.gender.clone()),
            Cell::plain(or_na(d.phone.as_deref())),
            Cell::plain(or_na(d.city.as_deref())),
            Cell::Badge(activity_badge(d.is_active)),
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::BankError;

    fn donor(id: u64, name: &str, email: Option<&str>, phone: Option<&str>) -> Donor {
        Donor {
            donor_id: id,
            name: name.to_string(),
            blood_group: BloodGroup::OPos,
            age: 30,
            gender: "Female".to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            address: None,
            city: None,
            is_active: id % 2 == 1,
            donor_type: None,
        }
    }

    fn loaded() -> DonorView {
        let mut view = DonorView::new();
        view.apply_donors(
            Ok(vec![
                donor(1, "Meera Shah", Some("meera@example.org"), Some("98200-11111")),
                donor(2, "Arjun Rao", None, Some("98200-22222")),
                donor(3, "Kavya Iyer", Some("KAVYA@clinic.in"), None),
            ]),
            &mut Toasts::default(),
        );
        view
    }

    #[test]
    fn test_search_matches_name_email_phone() {
        let mut view = loaded();
        view.set_search("ARJUN");
        assert_eq!(view.visible().len(), 1);

        view.set_search("kavya@");
        assert_eq!(view.visible()[0].donor_id, 3);

        view.set_search("22222");
        assert_eq!(view.visible()[0].donor_id, 2);

        view.set_search("");
        assert_eq!(view.visible().len(), 3);

        view.set_search("nobody");
        let table = view.table();
        assert_eq!(table.placeholder_message(), Some("No donors found"));
    }

    #[test]
    fn test_fallbacks_and_badges() {
        let view = loaded();
        let table = view.table();
        assert_eq!(table.column(5), vec!["98200-11111", "98200-22222", "N/A"]);
        assert_eq!(table.column(6), vec!["N/A", "N/A", "N/A"]);
        assert_eq!(table.column(7), vec!["Active", "Inactive", "Active"]);
    }

    #[test]
    fn test_blood_group_filter_query() {
        let mut view = loaded();
        let query = view.set_blood_group(Some(BloodGroup::BNeg));
        assert_eq!(query.blood_group, Some(BloodGroup::BNeg));
        assert_eq!(query.is_active, None);
        assert_eq!(view.set_blood_group(None), DonorQuery::default());
    }

    #[test]
    fn test_failed_load_keeps_previous_list() {
        let mut view = loaded();
        let mut toasts = Toasts::default();
        view.apply_donors(Err(BankError::Network("down".to_string())), &mut toasts);
        assert_eq!(view.donors().len(), 3);
        assert_eq!(view.error(), Some("Error loading donors"));
        assert_eq!(toasts.len(), 1);
    }

    #[test]
    fn test_donor_at_follows_search() {
        let mut view = loaded();
        view.set_search("kavya");
        assert_eq!(view.donor_at(0).map(|d| d.donor_id), Some(3));
        assert!(view.donor_at(1).is_none());
    }
}
