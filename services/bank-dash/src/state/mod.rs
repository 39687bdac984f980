// services/bank-dash/src/state/mod.rs
//
// Per-page view state. Each page owns its cache; nothing here is global.
//

pub mod dashboard;
pub mod donations;
pub mod donors;
pub mod requests;
pub mod screenings;
pub mod stock;

use std::fmt;
use std::str::FromStr;

use svckit::types::{BloodBank, Donor, Hospital};
use svckit::{BankError, BankResult};
use tracing::warn;

pub use dashboard::DashboardView;
pub use donations::DonationView;
pub use donors::DonorView;
pub use requests::RequestView;
pub use screenings::{ScreeningBatch, ScreeningView};
pub use stock::{SortOrder, StockColumn, StockView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Dashboard,
    Donors,
    Donations,
    Requests,
    Stock,
    Screenings,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::Dashboard,
        Page::Donors,
        Page::Donations,
        Page::Requests,
        Page::Stock,
        Page::Screenings,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Donors => "Donors",
            Page::Donations => "Donations",
            Page::Requests => "Requests",
            Page::Stock => "Stock",
            Page::Screenings => "Health Screening",
        }
    }

    pub fn index(&self) -> usize {
        Page::ALL.iter().position(|p| p == self).unwrap_or(0)
    }

    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    pub fn previous(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

impl FromStr for Page {
    type Err = BankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "donors" => Ok(Page::Donors),
            "donations" => Ok(Page::Donations),
            "requests" => Ok(Page::Requests),
            "stock" => Ok(Page::Stock),
            "screenings" | "health" | "health_screening" => Ok(Page::Screenings),
            other => Err(BankError::Config(format!("unknown page: {}", other))),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Steps a dropdown-style selection: "All" → first → ... → last → "All".
pub(crate) fn cycle_option<T: Copy + PartialEq>(options: &[T], current: Option<T>) -> Option<T> {
    match current {
        None => options.first().copied(),
        Some(value) => match options.iter().position(|o| *o == value) {
            Some(i) => options.get(i + 1).copied(),
            None => options.first().copied(),
        },
    }
}

/// Dropdown sources shared by the forms and the stock filter.
#[derive(Debug, Default, Clone)]
pub struct Lookups {
    pub banks: Vec<BloodBank>,
    pub hospitals: Vec<Hospital>,
    pub active_donors: Vec<Donor>,
}

impl Lookups {
    // Lookup failures leave the dropdown empty; the page still loads.

    pub fn apply_banks(&mut self, result: BankResult<Vec<BloodBank>>) {
        match result {
            Ok(banks) => self.banks = banks,
            Err(e) => warn!("Error loading blood banks: {}", e),
        }
    }

    pub fn apply_hospitals(&mut self, result: BankResult<Vec<Hospital>>) {
        match result {
            Ok(hospitals) => self.hospitals = hospitals,
            Err(e) => warn!("Error loading hospitals: {}", e),
        }
    }

    pub fn apply_active_donors(&mut self, result: BankResult<Vec<Donor>>) {
        match result {
            Ok(donors) => self.active_donors = donors,
            Err(e) => warn!("Error loading donors for selection: {}", e),
        }
    }

    pub fn bank_name(&self, bank_id: u64) -> Option<&str> {
        self.banks
            .iter()
            .find(|b| b.bank_id == bank_id)
            .map(|b| b.bank_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_option() {
        let opts = [1u8, 2, 3];
        assert_eq!(cycle_option(&opts, None), Some(1));
        assert_eq!(cycle_option(&opts, Some(1)), Some(2));
        assert_eq!(cycle_option(&opts, Some(3)), None);
        assert_eq!(cycle_option(&opts, Some(9)), Some(1));
        assert_eq!(cycle_option::<u8>(&[], None), None);
    }

    #[test]
    fn test_page_navigation() {
        assert_eq!(Page::Dashboard.next(), Page::Donors);
        assert_eq!(Page::Dashboard.previous(), Page::Screenings);
        assert_eq!(Page::Screenings.next(), Page::Dashboard);
        assert_eq!("Stock".parse::<Page>().unwrap(), Page::Stock);
        assert!("billing".parse::<Page>().is_err());
    }

    #[test]
    fn test_lookup_failure_keeps_previous() {
        let mut lookups = Lookups::default();
        lookups.apply_banks(Ok(vec![BloodBank {
            bank_id: 4,
            bank_name: "Central".to_string(),
            location: None,
        }]));
        lookups.apply_banks(Err(BankError::Network("down".to_string())));
        assert_eq!(lookups.bank_name(4), Some("Central"));
        assert_eq!(lookups.bank_name(5), None);
    }
}
