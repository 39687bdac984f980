// svckit/src/lib.rs
//
// Shared kit for the blood bank console: domain records, errors,
// backend configuration and the REST client.
//

pub mod client;
pub mod config;
pub mod errors;
pub mod types;

pub use client::{BankApi, DonorQuery, HttpBankApi, MemoryBankApi, MemoryStore, RequestQuery, StockQuery};
pub use errors::{BankError, BankResult};
