// svckit/src/client/memory.rs
//
// In-memory backend. Mirrors the REST backend's filtering, ordering and
// validation closely enough to drive demo mode and view tests.
//

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use tokio::sync::RwLock;
use tracing::debug;

use super::{BankApi, DonorQuery, RequestQuery, StockQuery};
use crate::errors::{BankError, BankResult};
use crate::types::{
    parse_wire_date, BloodBank, BloodGroup, BloodRequest, Created, DashboardSummary, Donation,
    Donor, DonorUpdate, GroupStock, HealthScreening, Hospital, NewDonation, NewDonor, NewRequest,
    NewScreening, RequestStatus, RequestStatusUpdate, StockItem, UrgencyLevel,
};

/// Backing tables of the in-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub donors: Vec<Donor>,
    pub donations: Vec<Donation>,
    pub screenings: Vec<HealthScreening>,
    pub requests: Vec<BloodRequest>,
    pub stock: Vec<StockItem>,
    pub banks: Vec<BloodBank>,
    pub hospitals: Vec<Hospital>,
}

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    screening_failures: HashSet<u64>,
}

pub struct MemoryBankApi {
    store: RwLock<MemoryStore>,
    faults: RwLock<Faults>,
}

impl MemoryBankApi {
    pub fn new(store: MemoryStore) -> Self {
        Self {
            store: RwLock::new(store),
            faults: RwLock::new(Faults::default()),
        }
    }

    /// Every call fails with a transport error while offline.
    pub async fn set_offline(&self, offline: bool) {
        self.faults.write().await.offline = offline;
    }

    /// `GET /donor_health/{donor_id}` fails for this donor.
    pub async fn fail_screenings_for(&self, donor_id: u64) {
        self.faults.write().await.screening_failures.insert(donor_id);
    }

    async fn check_online(&self) -> BankResult<()> {
        if self.faults.read().await.offline {
            return Err(BankError::Network("backend unreachable".to_string()));
        }
        Ok(())
    }

    fn not_found(what: &str) -> BankError {
        BankError::Backend {
            status: 404,
            message: Some(format!("{} not found", what)),
        }
    }

    fn bad_request(msg: impl Into<String>) -> BankError {
        BankError::Backend {
            status: 400,
            message: Some(msg.into()),
        }
    }

    fn next_id(ids: impl Iterator<Item = u64>) -> u64 {
        ids.max().unwrap_or(0) + 1
    }
}

fn urgency_rank(level: UrgencyLevel) -> u8 {
    match level {
        UrgencyLevel::Critical => 4,
        UrgencyLevel::High => 3,
        UrgencyLevel::Medium => 2,
        UrgencyLevel::Low => 1,
        UrgencyLevel::Unknown => 0,
    }
}

fn date_key(raw: Option<&str>) -> NaiveDate {
    raw.and_then(parse_wire_date).unwrap_or(NaiveDate::MIN)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[async_trait]
impl BankApi for MemoryBankApi {
    async fn dashboard(&self) -> BankResult<DashboardSummary> {
        self.check_online().await?;
        let store = self.store.read().await;
        let week_ago = today() - Duration::days(7);

        let stock_by_group = BloodGroup::ALL
            .iter()
            .filter_map(|group| {
                let rows: Vec<_> = store.stock.iter().filter(|s| s.blood_group == *group).collect();
                if rows.is_empty() {
                    return None;
                }
                Some(GroupStock {
                    blood_group: *group,
                    total_units: rows.iter().map(|s| s.quantity_units as u64).sum(),
                })
            })
            .collect();

        Ok(DashboardSummary {
            total_donors: store.donors.iter().filter(|d| d.is_active).count() as u64,
            total_donations: store.donations.len() as u64,
            pending_requests: store
                .requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count() as u64,
            recent_donations: store
                .donations
                .iter()
                .filter(|d| date_key(d.donation_date.as_deref()) >= week_ago)
                .count() as u64,
            stock_by_group,
        })
    }

    async fn list_donors(&self, query: &DonorQuery) -> BankResult<Vec<Donor>> {
        self.check_online().await?;
        let store = self.store.read().await;
        Ok(store
            .donors
            .iter()
            .filter(|d| query.blood_group.map_or(true, |g| d.blood_group == g))
            .filter(|d| query.is_active.map_or(true, |a| d.is_active == a))
            .cloned()
            .collect())
    }

    async fn get_donor(&self, donor_id: u64) -> BankResult<Donor> {
        self.check_online().await?;
        let store = self.store.read().await;
        store
            .donors
            .iter()
            .find(|d| d.donor_id == donor_id)
            .cloned()
            .ok_or_else(|| Self::not_found("Donor"))
    }

    async fn register_donor(&self, donor: &NewDonor) -> BankResult<Created> {
        self.check_online().await?;
        for (field, value) in [("name", &donor.name), ("gender", &donor.gender), ("contact", &donor.contact)] {
            if value.trim().is_empty() {
                return Err(Self::bad_request(format!("Missing required field: {}", field)));
            }
        }
        if donor.age == 0 {
            return Err(Self::bad_request("Missing required field: age"));
        }

        let mut store = self.store.write().await;
        let donor_id = Self::next_id(store.donors.iter().map(|d| d.donor_id));
        store.donors.push(Donor {
            donor_id,
            name: donor.name.clone(),
            blood_group: donor.blood_group,
            age: donor.age,
            gender: donor.gender.clone(),
            phone: Some(donor.contact.clone()),
            email: donor.email.clone(),
            address: donor.address.clone(),
            city: donor.city.clone(),
            is_active: true,
            donor_type: None,
        });
        debug!("memory backend registered donor {}", donor_id);

        Ok(Created {
            message: Some("Donor registered successfully".to_string()),
            donor_id: Some(donor_id),
            ..Created::default()
        })
    }

    async fn update_donor(&self, donor_id: u64, update: &DonorUpdate) -> BankResult<()> {
        self.check_online().await?;
        let mut store = self.store.write().await;
        let donor = store
            .donors
            .iter_mut()
            .find(|d| d.donor_id == donor_id)
            .ok_or_else(|| Self::not_found("Donor"))?;

        donor.name = update.name.clone();
        donor.age = update.age;
        donor.gender = update.gender.clone();
        donor.blood_group = update.blood_group;
        donor.phone = Some(update.contact.clone());
        if update.email.is_some() {
            donor.email = update.email.clone();
        }
        if update.city.is_some() {
            donor.city = update.city.clone();
        }
        Ok(())
    }

    async fn list_donations(&self) -> BankResult<Vec<Donation>> {
        self.check_online().await?;
        let store = self.store.read().await;
        let mut donations = store.donations.clone();
        donations.sort_by(|a, b| {
            date_key(b.donation_date.as_deref()).cmp(&date_key(a.donation_date.as_deref()))
        });
        Ok(donations)
    }

    async fn record_donation(&self, donation: &NewDonation) -> BankResult<Created> {
        self.check_online().await?;
        let mut store = self.store.write().await;
        let donor_name = store
            .donors
            .iter()
            .find(|d| d.donor_id == donation.donor_id)
            .map(|d| d.name.clone())
            .ok_or_else(|| Self::bad_request("Unknown donor"))?;
        let bank_name = store
            .banks
            .iter()
            .find(|b| b.bank_id == donation.bank_id)
            .map(|b| b.bank_name.clone())
            .ok_or_else(|| Self::bad_request("Unknown blood bank"))?;

        let donation_id = Self::next_id(store.donations.iter().map(|d| d.donation_id));
        store.donations.push(Donation {
            donation_id,
            donor_id: donation.donor_id,
            donor_name: Some(donor_name),
            bank_id: donation.bank_id,
            bank_name: Some(bank_name),
            donation_date: Some(donation.donation_date.to_string()),
            component_type: donation.component_type,
            quantity_units: donation.quantity_units,
            expiry_date: Some(donation.expiry_date.to_string()),
            screening_id: donation.screening_id,
        });

        Ok(Created {
            message: Some("Donation recorded".to_string()),
            donation_id: Some(donation_id),
            ..Created::default()
        })
    }

    async fn list_screenings(&self, donor_id: u64) -> BankResult<Vec<HealthScreening>> {
        self.check_online().await?;
        if self.faults.read().await.screening_failures.contains(&donor_id) {
            return Err(BankError::Backend {
                status: 500,
                message: Some("screening lookup failed".to_string()),
            });
        }
        let store = self.store.read().await;
        let mut records: Vec<_> = store
            .screenings
            .iter()
            .filter(|s| s.donor_id == donor_id)
            .map(|s| HealthScreening {
                donor_name: None,
                ..s.clone()
            })
            .collect();
        records.sort_by(|a, b| {
            date_key(b.screening_date.as_deref()).cmp(&date_key(a.screening_date.as_deref()))
        });
        Ok(records)
    }

    async fn record_screening(&self, screening: &NewScreening) -> BankResult<Created> {
        self.check_online().await?;
        let mut store = self.store.write().await;
        if !store.donors.iter().any(|d| d.donor_id == screening.donor_id) {
            return Err(Self::bad_request("Unknown donor"));
        }
        let health_id = Self::next_id(store.screenings.iter().map(|s| s.health_id));
        store.screenings.push(HealthScreening {
            health_id,
            donor_id: screening.donor_id,
            donor_name: None,
            screening_date: Some(screening.screening_date.to_string()),
            bp: screening.bp.clone(),
            weight: screening.weight,
            disease_detected: screening.disease_detected.clone(),
            eligibility_status: screening.eligibility_status,
        });

        Ok(Created {
            message: Some("Donor health recorded".to_string()),
            health_id: Some(health_id),
            ..Created::default()
        })
    }

    async fn list_requests(&self, query: &RequestQuery) -> BankResult<Vec<BloodRequest>> {
        self.check_online().await?;
        let store = self.store.read().await;
        let mut requests: Vec<_> = store
            .requests
            .iter()
            .filter(|r| query.status.map_or(true, |s| r.status == s))
            .filter(|r| query.blood_group.map_or(true, |g| r.blood_group == g))
            .cloned()
            .collect();
        // Most urgent first, then oldest first
        requests.sort_by(|a, b| {
            urgency_rank(b.urgency_level)
                .cmp(&urgency_rank(a.urgency_level))
                .then_with(|| {
                    date_key(a.request_date.as_deref()).cmp(&date_key(b.request_date.as_deref()))
                })
        });
        Ok(requests)
    }

    async fn create_request(&self, request: &NewRequest) -> BankResult<Created> {
        self.check_online().await?;
        let mut store = self.store.write().await;
        let hospital = store
            .hospitals
            .iter()
            .find(|h| h.hospital_id == request.hospital_id)
            .cloned()
            .ok_or_else(|| Self::bad_request("Unknown hospital"))?;

        let request_id = Self::next_id(store.requests.iter().map(|r| r.request_id));
        store.requests.push(BloodRequest {
            request_id,
            hospital_id: hospital.hospital_id,
            hospital_name: hospital.hospital_name,
            location: hospital.location,
            blood_group: request.blood_group,
            component_type: request.component_type,
            quantity_units: request.quantity_units,
            urgency_level: request.urgency_level,
            status: RequestStatus::Pending,
            request_date: Some(today().to_string()),
        });

        Ok(Created {
            message: Some("Blood request created".to_string()),
            request_id: Some(request_id),
            ..Created::default()
        })
    }

    async fn update_request_status(
        &self,
        request_id: u64,
        update: &RequestStatusUpdate,
    ) -> BankResult<()> {
        self.check_online().await?;
        if update.status == RequestStatus::Unknown {
            return Err(Self::bad_request("Status is required"));
        }
        let mut store = self.store.write().await;
        let request = store
            .requests
            .iter_mut()
            .find(|r| r.request_id == request_id)
            .ok_or_else(|| Self::not_found("Request"))?;
        request.status = update.status;
        Ok(())
    }

    async fn list_stock(&self, query: &StockQuery) -> BankResult<Vec<StockItem>> {
        self.check_online().await?;
        let store = self.store.read().await;
        Ok(store
            .stock
            .iter()
            .filter(|s| query.blood_group.map_or(true, |g| s.blood_group == g))
            .filter(|s| query.bank_id.map_or(true, |b| s.bank_id == b))
            .cloned()
            .collect())
    }

    async fn list_blood_banks(&self) -> BankResult<Vec<BloodBank>> {
        self.check_online().await?;
        Ok(self.store.read().await.banks.clone())
    }

    async fn list_hospitals(&self) -> BankResult<Vec<Hospital>> {
        self.check_online().await?;
        Ok(self.store.read().await.hospitals.clone())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ComponentType, StockStatus};

    fn stock(id: u64, bank_id: u64, group: BloodGroup, units: u32) -> StockItem {
        StockItem {
            stock_id: id,
            bank_id,
            bank_name: format!("Bank {}", bank_id),
            location: None,
            blood_group: group,
            quantity_units: units,
            status: Some(StockStatus::Available),
        }
    }

    fn request(id: u64, urgency: UrgencyLevel, date: &str) -> BloodRequest {
        BloodRequest {
            request_id: id,
            hospital_id: 1,
            hospital_name: "General".to_string(),
            location: None,
            blood_group: BloodGroup::OPos,
            component_type: ComponentType::Rbc,
            quantity_units: 2,
            urgency_level: urgency,
            status: RequestStatus::Pending,
            request_date: Some(date.to_string()),
        }
    }

    #[tokio::test]
    async fn test_stock_filters() {
        let api = MemoryBankApi::new(MemoryStore {
            stock: vec![
                stock(1, 1, BloodGroup::OPos, 10),
                stock(2, 2, BloodGroup::OPos, 4),
                stock(3, 2, BloodGroup::ANeg, 7),
            ],
            ..MemoryStore::default()
        });

        let all = api.list_stock(&StockQuery::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let bank_two = api
            .list_stock(&StockQuery { blood_group: None, bank_id: Some(2) })
            .await
            .unwrap();
        assert_eq!(bank_two.iter().map(|s| s.stock_id).collect::<Vec<_>>(), vec![2, 3]);

        let both = api
            .list_stock(&StockQuery { blood_group: Some(BloodGroup::OPos), bank_id: Some(2) })
            .await
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].stock_id, 2);
    }

    #[tokio::test]
    async fn test_requests_ordered_by_urgency_then_age() {
        let api = MemoryBankApi::new(MemoryStore {
            requests: vec![
                request(1, UrgencyLevel::Low, "2024-01-01"),
                request(2, UrgencyLevel::Critical, "2024-01-05"),
                request(3, UrgencyLevel::Critical, "2024-01-02"),
            ],
            ..MemoryStore::default()
        });
        let ids: Vec<_> = api
            .list_requests(&RequestQuery::default())
            .await
            .unwrap()
            .iter()
            .map(|r| r.request_id)
            .collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_register_requires_contact() {
        let api = MemoryBankApi::new(MemoryStore::default());
        let donor = NewDonor {
            name: "Lena".to_string(),
            age: 28,
            gender: "Female".to_string(),
            blood_group: BloodGroup::ONeg,
            contact: " ".to_string(),
            email: None,
            address: None,
            city: None,
        };
        let err = api.register_donor(&donor).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "Missing required field: contact");
    }

    #[tokio::test]
    async fn test_offline_and_screening_faults() {
        let api = MemoryBankApi::new(MemoryStore::default());
        api.fail_screenings_for(5).await;
        assert!(api.list_screenings(5).await.is_err());
        assert!(api.list_screenings(6).await.unwrap().is_empty());

        api.set_offline(true).await;
        assert!(api.list_hospitals().await.unwrap_err().is_network());
        api.set_offline(false).await;
        assert!(api.list_hospitals().await.is_ok());
    }
}
