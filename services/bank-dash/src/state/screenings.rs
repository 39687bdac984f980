// services/bank-dash/src/state/screenings.rs
//
// Health screening history joined across all donors
//

use std::collections::HashMap;

use futures::future::join_all;
use svckit::types::{parse_wire_date, HealthScreening};
use svckit::{BankApi, BankResult, DonorQuery};
use tracing::{debug, warn};

use crate::format::{eligibility_badge, format_date, or_fallback, or_na, record_id, weight};
use crate::table::{Cell, TableView};
use crate::toast::Toasts;

const HEADERS: [&str; 7] = ["ID", "Donor", "Date", "BP", "Weight", "Disease", "Eligibility"];

/// Result of one full screening reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreeningBatch {
    pub screenings: Vec<HealthScreening>,
    /// Donors whose screening lookup failed and were treated as empty.
    pub failed_donors: usize,
}

/// Loads every donor, fetches their screenings concurrently and joins the
/// results newest first. Only the donor listing itself can fail the batch.
pub async fn fetch_all(api: &dyn BankApi) -> BankResult<ScreeningBatch> {
    let donors = api.list_donors(&DonorQuery::default()).await?;
    let names: HashMap<u64, String> = donors
        .iter()
        .map(|d| (d.donor_id, d.name.clone()))
        .collect();

    let lookups = donors.iter().map(|d| api.list_screenings(d.donor_id));
    let results = join_all(lookups).await;

    let mut failed_donors = 0;
    let mut screenings = Vec::new();
    for (donor, result) in donors.iter().zip(results) {
        match result {
            Ok(records) => screenings.extend(records),
            Err(e) => {
                debug!("Screenings for donor {} unavailable: {}", donor.donor_id, e);
                failed_donors += 1;
            }
        }
    }

    for screening in &mut screenings {
        screening.donor_name = Some(
            names
                .get(&screening.donor_id)
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
        );
    }
    sort_newest_first(&mut screenings);

    Ok(ScreeningBatch {
        screenings,
        failed_donors,
    })
}

/// Stable; undated records sink to the bottom.
pub fn sort_newest_first(screenings: &mut [HealthScreening]) {
    screenings.sort_by(|a, b| {
        let a = a.screening_date.as_deref().and_then(parse_wire_date);
        let b = b.screening_date.as_deref().and_then(parse_wire_date);
        b.cmp(&a)
    });
}

#[derive(Debug, Default)]
pub struct ScreeningView {
    screenings: Vec<HealthScreening>,
    error: Option<String>,
}

impl ScreeningView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screenings(&self) -> &[HealthScreening] {
        &self.screenings
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn apply_batch(&mut self, result: BankResult<ScreeningBatch>, toasts: &mut Toasts) {
        match result {
            Ok(batch) => {
                if batch.failed_donors > 0 {
                    warn!("{} donor screening lookups failed", batch.failed_donors);
                    toasts.info(format!(
                        "Screening records unavailable for {} donor(s)",
                        batch.failed_donors
                    ));
                }
                self.screenings = batch.screenings;
                self.error = None;
            }
            Err(e) => {
                warn!("Error loading screening records: {}", e);
                self.error = Some("Error loading screening records".to_string());
                toasts.error("Error loading screening records");
            }
        }
    }

    pub fn table(&self) -> TableView {
        render_screenings(&self.screenings)
    }
}

pub fn render_screenings(screenings: &[HealthScreening]) -> TableView {
    TableView::from_records(
        &HEADERS,
        screenings,
        ("🏥", "No health screening records found"),
        |s| {
            vec![
                Cell::strong(record_id(s.health_id)),
                Cell::strong(or_fallback(s.donor_name.as_deref(), "Unknown")),
                Cell::plain(format_date(s.screening_date.as_deref())),
                Cell::plain(or_na(s.bp.as_deref())),
                Cell::plain(weight(s.weight)),
                Cell::plain(or_fallback(s.disease_detected.as_deref(), "None")),
                Cell::Badge(eligibility_badge(s.eligibility_status)),
            ]
        },
    )
}
