// services/bank-dash/src/mock.rs
//
// Sample data for demo mode (no backend required)

use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;

use svckit::types::{
    BloodBank, BloodGroup, BloodRequest, ComponentType, Donation, Donor, Eligibility,
    HealthScreening, Hospital, RequestStatus, StockItem, StockStatus, UrgencyLevel,
};
use svckit::MemoryStore;

use crate::forms::expiry_for;

const BANKS: [(&str, &str); 3] = [
    ("City Central Blood Bank", "Mumbai"),
    ("Red Cross Blood Centre", "Pune"),
    ("Lifeline Blood Services", "Nagpur"),
];

const HOSPITALS: [(&str, &str); 4] = [
    ("St. Mary's Hospital", "Mumbai"),
    ("Sahyadri General", "Pune"),
    ("Apollo Care", "Nagpur"),
    ("Ruby Hall Clinic", "Pune"),
];

const FIRST_NAMES: [&str; 12] = [
    "Aarav", "Meera", "Rohan", "Priya", "Kabir", "Ananya", "Vikram", "Isha", "Arjun", "Kavya",
    "Neel", "Sana",
];

const LAST_NAMES: [&str; 8] = [
    "Sharma", "Patel", "Iyer", "Khan", "Deshmukh", "Rao", "Fernandes", "Kulkarni",
];

const CITIES: [&str; 4] = ["Mumbai", "Pune", "Nagpur", "Nashik"];

const DONOR_COUNT: u64 = 24;

fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn stock_status(units: u32) -> StockStatus {
    match units {
        0 => StockStatus::OutOfStock,
        1..=9 => StockStatus::Low,
        _ => StockStatus::Available,
    }
}

pub fn demo_store() -> MemoryStore {
    demo_store_with(&mut rand::thread_rng(), Local::now().date_naive())
}

pub fn demo_store_with<R: Rng>(rng: &mut R, today: NaiveDate) -> MemoryStore {
    let banks: Vec<BloodBank> = BANKS
        .iter()
        .zip(1u64..)
        .map(|((name, city), id)| BloodBank {
            bank_id: id,
            bank_name: name.to_string(),
            location: Some(city.to_string()),
        })
        .collect();

    let hospitals: Vec<Hospital> = HOSPITALS
        .iter()
        .zip(1u64..)
        .map(|((name, city), id)| Hospital {
            hospital_id: id,
            hospital_name: name.to_string(),
            location: Some(city.to_string()),
        })
        .collect();

    let donors: Vec<Donor> = (1..=DONOR_COUNT)
        .map(|id| {
            let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];
            Donor {
                donor_id: id,
                name: format!("{} {}", first, last),
                blood_group: BloodGroup::ALL[rng.gen_range(0..BloodGroup::ALL.len())],
                age: rng.gen_range(18..=60),
                gender: if rng.gen_bool(0.5) { "Male" } else { "Female" }.to_string(),
                phone: Some(format!("98{:08}", rng.gen_range(0..100_000_000u32))),
                email: rng
                    .gen_bool(0.7)
                    .then(|| format!("{}.{}@example.org", first, last).to_lowercase()),
                address: None,
                city: rng.gen_bool(0.85).then(|| CITIES[rng.gen_range(0..CITIES.len())].to_string()),
                is_active: !rng.gen_ratio(1, 6),
                donor_type: Some("Voluntary".to_string()),
            }
        })
        .collect();

    let mut screenings = Vec::new();
    for donor in &donors {
        if !rng.gen_bool(0.6) {
            continue;
        }
        let eligible = !rng.gen_ratio(1, 5);
        screenings.push(HealthScreening {
            health_id: screenings.len() as u64 + 1,
            donor_id: donor.donor_id,
            donor_name: None,
            screening_date: Some(date_string(today - Duration::days(rng.gen_range(0..90)))),
            bp: Some(format!("{}/{}", rng.gen_range(105..140), rng.gen_range(65..90))),
            weight: Some(rng.gen_range(50..95) as f64),
            disease_detected: (!eligible).then(|| "Anaemia".to_string()),
            eligibility_status: if eligible {
                Eligibility::Eligible
            } else {
                Eligibility::NotEligible
            },
        });
    }

    let donations: Vec<Donation> = (1..=30u64)
        .filter_map(|id| {
            let donor = donors.choose(&mut *rng)?;
            let bank = banks.choose(&mut *rng)?;
            let component = ComponentType::ALL[rng.gen_range(0..ComponentType::ALL.len())];
            let donated = today - Duration::days(rng.gen_range(0..60));
            Some(Donation {
                donation_id: id,
                donor_id: donor.donor_id,
                donor_name: Some(donor.name.clone()),
                bank_id: bank.bank_id,
                bank_name: Some(bank.bank_name.clone()),
                donation_date: Some(date_string(donated)),
                component_type: component,
                quantity_units: rng.gen_range(1..=3),
                expiry_date: Some(date_string(expiry_for(donated, Some(component)))),
                screening_id: None,
            })
        })
        .collect();

    let requests: Vec<BloodRequest> = (1..=12u64)
        .filter_map(|id| {
            let hospital = hospitals.choose(&mut *rng)?;
            Some(BloodRequest {
                request_id: id,
                hospital_id: hospital.hospital_id,
                hospital_name: hospital.hospital_name.clone(),
                location: hospital.location.clone(),
                blood_group: BloodGroup::ALL[rng.gen_range(0..BloodGroup::ALL.len())],
                component_type: ComponentType::ALL[rng.gen_range(0..ComponentType::ALL.len())],
                quantity_units: rng.gen_range(1..=8),
                urgency_level: UrgencyLevel::SELECTABLE
                    [rng.gen_range(0..UrgencyLevel::SELECTABLE.len())],
                status: RequestStatus::SELECTABLE[rng.gen_range(0..RequestStatus::SELECTABLE.len())],
                request_date: Some(date_string(today - Duration::days(rng.gen_range(0..30)))),
            })
        })
        .collect();

    let mut stock = Vec::new();
    for bank in &banks {
        for group in BloodGroup::ALL {
            let units = if rng.gen_ratio(1, 10) { 0 } else { rng.gen_range(1..45) };
            stock.push(StockItem {
                stock_id: stock.len() as u64 + 1,
                bank_id: bank.bank_id,
                bank_name: bank.bank_name.clone(),
                location: bank.location.clone(),
                blood_group: group,
                quantity_units: units,
                // some rows come back without a status, as older records do
                status: (!rng.gen_ratio(1, 8)).then(|| stock_status(units)),
            });
        }
    }

    MemoryStore {
        donors,
        donations,
        screenings,
        requests,
        stock,
        banks,
        hospitals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_demo_store_is_consistent() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let store = demo_store_with(&mut StdRng::seed_from_u64(7), today);

        assert_eq!(store.donors.len(), DONOR_COUNT as usize);
        assert_eq!(store.stock.len(), BANKS.len() * BloodGroup::ALL.len());
        assert_eq!(store.donations.len(), 30);

        for donation in &store.donations {
            assert!(store.donors.iter().any(|d| d.donor_id == donation.donor_id));
            assert!(store.banks.iter().any(|b| b.bank_id == donation.bank_id));
        }
        for screening in &store.screenings {
            assert!(store.donors.iter().any(|d| d.donor_id == screening.donor_id));
        }

        let mut ids: Vec<u64> = store.stock.iter().map(|s| s.stock_id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), store.stock.len());
    }

    #[test]
    fn test_stock_status_bands() {
        assert_eq!(stock_status(0), StockStatus::OutOfStock);
        assert_eq!(stock_status(9), StockStatus::Low);
        assert_eq!(stock_status(10), StockStatus::Available);
    }
}
