// services/bank-dash/src/loader.rs
//
// Spawns backend calls off the UI thread and posts their results back
// as events. Responses are applied in arrival order.
//

use std::future::Future;
use std::sync::Arc;

use svckit::types::{
    BloodBank, BloodRequest, Created, DashboardSummary, Donation, Donor, Hospital, StockItem,
};
use svckit::{BankApi, BankResult, DonorQuery, RequestQuery, StockQuery};
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::forms::Submission;
use crate::state::screenings::{self, ScreeningBatch};
use crate::state::Page;

#[derive(Debug)]
pub enum AppEvent {
    Dashboard(BankResult<DashboardSummary>),
    RecentRequests(BankResult<Vec<BloodRequest>>),
    Donors(BankResult<Vec<Donor>>),
    Donations(BankResult<Vec<Donation>>),
    Requests(BankResult<Vec<BloodRequest>>),
    Stock(BankResult<Vec<StockItem>>),
    Screenings(BankResult<ScreeningBatch>),
    Banks(BankResult<Vec<BloodBank>>),
    Hospitals(BankResult<Vec<Hospital>>),
    ActiveDonors(BankResult<Vec<Donor>>),
    DonorDetails(BankResult<Donor>),
    Submitted {
        form_id: u64,
        submission: Submission,
        result: BankResult<Created>,
    },
    Poll(Page),
}

#[derive(Clone)]
pub struct Loader {
    api: Arc<dyn BankApi>,
    tx: UnboundedSender<AppEvent>,
    handle: Handle,
}

impl Loader {
    pub fn new(api: Arc<dyn BankApi>, tx: UnboundedSender<AppEvent>, handle: Handle) -> Self {
        Self { api, tx, handle }
    }

    pub fn backend_name(&self) -> &str {
        self.api.name()
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(Arc<dyn BankApi>) -> Fut,
        Fut: Future<Output = AppEvent> + Send + 'static,
    {
        let fut = job(self.api.clone());
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            let event = fut.await;
            if tx.send(event).is_err() {
                debug!("UI closed before a response arrived");
            }
        });
    }

    pub fn load_dashboard(&self) {
        self.spawn(move |api| async move { AppEvent::Dashboard(api.dashboard().await) });
        self.spawn(move |api| async move {
            AppEvent::RecentRequests(api.list_requests(&RequestQuery::default()).await)
        });
    }

    pub fn load_donors(&self, query: DonorQuery) {
        self.spawn(move |api| async move { AppEvent::Donors(api.list_donors(&query).await) });
    }

    pub fn load_donations(&self) {
        self.spawn(move |api| async move { AppEvent::Donations(api.list_donations().await) });
    }

    pub fn load_requests(&self, query: RequestQuery) {
        self.spawn(move |api| async move { AppEvent::Requests(api.list_requests(&query).await) });
    }

    pub fn load_stock(&self, query: StockQuery) {
        self.spawn(move |api| async move { AppEvent::Stock(api.list_stock(&query).await) });
    }

    pub fn load_screenings(&self) {
        self.spawn(move |api| async move {
            AppEvent::Screenings(screenings::fetch_all(api.as_ref()).await)
        });
    }

    pub fn load_banks(&self) {
        self.spawn(move |api| async move { AppEvent::Banks(api.list_blood_banks().await) });
    }

    pub fn load_hospitals(&self) {
        self.spawn(move |api| async move { AppEvent::Hospitals(api.list_hospitals().await) });
    }

    pub fn load_active_donors(&self) {
        self.spawn(move |api| async move {
            AppEvent::ActiveDonors(api.list_donors(&DonorQuery::active()).await)
        });
    }

    pub fn load_donor_details(&self, donor_id: u64) {
        self.spawn(move |api| async move { AppEvent::DonorDetails(api.get_donor(donor_id).await) });
    }

    /// `form_id` identifies the form instance that produced `submission`.
    pub fn submit(&self, form_id: u64, submission: Submission) {
        self.spawn(move |api| async move {
            let result = submission.send(api.as_ref()).await;
            AppEvent::Submitted {
                form_id,
                submission,
                result,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svckit::types::BloodGroup;
    use svckit::{MemoryBankApi, MemoryStore};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_loader_posts_results() {
        let api: Arc<dyn BankApi> = Arc::new(MemoryBankApi::new(MemoryStore::default()));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let loader = Loader::new(api, tx, Handle::current());

        loader.load_stock(StockQuery {
            blood_group: Some(BloodGroup::APos),
            bank_id: None,
        });
        match rx.recv().await {
            Some(AppEvent::Stock(Ok(items))) => assert!(items.is_empty()),
            other => panic!("unexpected event: {:?}", other),
        }

        loader.load_donor_details(99);
        match rx.recv().await {
            Some(AppEvent::DonorDetails(Err(e))) => assert!(!e.is_network()),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
