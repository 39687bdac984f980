// services/bank-dash/src/state/dashboard.rs
//
// Landing page: headline counters, per-group stock cards and the most
// recent requests.
//

use svckit::types::{BloodGroup, BloodRequest, DashboardSummary};
use svckit::BankResult;
use tracing::warn;

use crate::format::{format_date, recent_status_badge, record_id, units, urgency_badge};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

const RECENT_HEADERS: [&str; 8] = [
    "ID", "Hospital", "Blood Group", "Component", "Quantity", "Urgency", "Status", "Date",
];

/// Dashboard thresholds are coarser than the stock page's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardLevel {
    LowStock,
    Normal,
    GoodStock,
}

impl DashboardLevel {
    pub fn classify(units: u64) -> Self {
        match units {
            0..=9 => DashboardLevel::LowStock,
            10..=29 => DashboardLevel::Normal,
            _ => DashboardLevel::GoodStock,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardLevel::LowStock => "⚠️ Low Stock",
            DashboardLevel::Normal => "✓ Normal",
            DashboardLevel::GoodStock => "✓ Good Stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardCard {
    pub blood_group: BloodGroup,
    pub units: u64,
    pub level: DashboardLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatTiles {
    pub total_donors: u64,
    pub total_donations: u64,
    pub pending_requests: u64,
    pub recent_donations: u64,
}

/// One card per canonical group; groups missing from the summary read 0.
pub fn stock_cards(summary: &DashboardSummary) -> Vec<DashboardCard> {
    BloodGroup::ALL
        .iter()
        .map(|group| {
            let units = summary
                .stock_by_group
                .iter()
                .find(|s| s.blood_group == *group)
                .map_or(0, |s| s.total_units);
            DashboardCard {
                blood_group: *group,
                units,
                level: DashboardLevel::classify(units),
            }
        })
        .collect()
}

#[derive(Debug)]
pub struct DashboardView {
    summary: DashboardSummary,
    recent: Result<Vec<BloodRequest>, String>,
    recent_limit: usize,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(5)
    }
}

impl DashboardView {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            summary: DashboardSummary::default(),
            recent: Ok(Vec::new()),
            recent_limit,
        }
    }

    pub fn apply_summary(&mut self, result: BankResult<DashboardSummary>, toasts: &mut Toasts) {
        match result {
            Ok(summary) => self.summary = summary,
            Err(e) => {
                warn!("Error loading dashboard: {}", e);
                toasts.error("Error loading dashboard data");
            }
        }
    }

    /// A failed request lookup renders in the table, not as a toast.
    pub fn apply_recent(&mut self, result: BankResult<Vec<BloodRequest>>) {
        self.recent = match result {
            Ok(mut requests) => {
                requests.truncate(self.recent_limit);
                Ok(requests)
            }
            Err(e) => {
                warn!("Error loading recent requests: {}", e);
                Err("Error loading requests".to_string())
            }
        };
    }

    pub fn tiles(&self) -> StatTiles {
        StatTiles {
            total_donors: self.summary.total_donors,
            total_donations: self.summary.total_donations,
            pending_requests: self.summary.pending_requests,
            recent_donations: self.summary.recent_donations,
        }
    }

    pub fn cards(&self) -> Vec<DashboardCard> {
        stock_cards(&self.summary)
    }

    pub fn recent_table(&self) -> TableView {
        match &self.recent {
            Ok(requests) => render_recent(requests),
            Err(message) => TableView::placeholder(&RECENT_HEADERS, "", message),
        }
    }
}

pub fn render_recent(requests: &[BloodRequest]) -> TableView {
    TableView::from_records(&RECENT_HEADERS, requests, ("", "No requests found"), |r| {
        vec![
            Cell::plain(record_id(r.request_id)),
            Cell::plain(r.hospital_name.clone()),
            Cell::Group(r.blood_group),
            Cell::plain(r.component_type.as_str()),
            Cell::plain(units(r.quantity_units)),
            Cell::Badge(urgency_badge(r.urgency_level)),
            Cell::Badge(recent_status_badge(r.status)),
            Cell::plain(format_date(r.request_date.as_deref())),
        ]
    })
}
