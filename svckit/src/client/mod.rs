// svckit/src/client/mod.rs
//
// Backend client seam. Views talk to `BankApi`; the HTTP implementation
// speaks to the REST backend, the in-memory one backs demo mode and tests.
//

mod http;
mod memory;

use async_trait::async_trait;

use crate::errors::BankResult;
use crate::types::{
    BloodBank, BloodGroup, BloodRequest, Created, DashboardSummary, Donation, Donor,
    DonorUpdate, HealthScreening, Hospital, NewDonation, NewDonor, NewRequest, NewScreening,
    RequestStatus, RequestStatusUpdate, StockItem,
};

pub use http::HttpBankApi;
pub use memory::{MemoryBankApi, MemoryStore};

/// Predicates for `GET /donors`. `None` means "no predicate".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DonorQuery {
    pub is_active: Option<bool>,
    pub blood_group: Option<BloodGroup>,
}

impl DonorQuery {
    pub fn active() -> Self {
        Self {
            is_active: Some(true),
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(active) = self.is_active {
            params.push(("is_active", active.to_string()));
        }
        if let Some(group) = self.blood_group {
            params.push(("blood_group", group.to_string()));
        }
        params
    }
}

/// Predicates for `GET /requests`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RequestQuery {
    pub status: Option<RequestStatus>,
    pub blood_group: Option<BloodGroup>,
}

impl RequestQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(group) = self.blood_group {
            params.push(("blood_group", group.to_string()));
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.blood_group.is_none()
    }
}

/// Predicates for `GET /stock`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StockQuery {
    pub blood_group: Option<BloodGroup>,
    pub bank_id: Option<u64>,
}

impl StockQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(group) = self.blood_group {
            params.push(("blood_group", group.to_string()));
        }
        if let Some(bank_id) = self.bank_id {
            params.push(("bank_id", bank_id.to_string()));
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.blood_group.is_none() && self.bank_id.is_none()
    }
}

/// Every backend endpoint the console consumes.
#[async_trait]
pub trait BankApi: Send + Sync {
    async fn dashboard(&self) -> BankResult<DashboardSummary>;

    async fn list_donors(&self, query: &DonorQuery) -> BankResult<Vec<Donor>>;
    async fn get_donor(&self, donor_id: u64) -> BankResult<Donor>;
    async fn register_donor(&self, donor: &NewDonor) -> BankResult<Created>;
    async fn update_donor(&self, donor_id: u64, update: &DonorUpdate) -> BankResult<()>;

    async fn list_donations(&self) -> BankResult<Vec<Donation>>;
    async fn record_donation(&self, donation: &NewDonation) -> BankResult<Created>;

    async fn list_screenings(&self, donor_id: u64) -> BankResult<Vec<HealthScreening>>;
    async fn record_screening(&self, screening: &NewScreening) -> BankResult<Created>;

    async fn list_requests(&self, query: &RequestQuery) -> BankResult<Vec<BloodRequest>>;
    async fn create_request(&self, request: &NewRequest) -> BankResult<Created>;
    async fn update_request_status(
        &self,
        request_id: u64,
        update: &RequestStatusUpdate,
    ) -> BankResult<()>;

    async fn list_stock(&self, query: &StockQuery) -> BankResult<Vec<StockItem>>;

    async fn list_blood_banks(&self) -> BankResult<Vec<BloodBank>>;
    async fn list_hospitals(&self) -> BankResult<Vec<Hospital>>;

    fn name(&self) -> &str;
}
