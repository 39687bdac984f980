// svckit/src/client/http.rs
//
// reqwest-backed implementation of `BankApi`
//

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{BankApi, DonorQuery, RequestQuery, StockQuery};
use crate::config::ApiConfig;
use crate::errors::{BankError, BankResult};
use crate::types::{
    BloodBank, BloodRequest, Created, DashboardSummary, Donation, Donor, DonorUpdate,
    HealthScreening, Hospital, NewDonation, NewDonor, NewRequest, NewScreening,
    RequestStatusUpdate, StockItem,
};

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct HttpBankApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBankApi {
    pub fn new(config: &ApiConfig) -> BankResult<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| BankError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> BankResult<T> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| BankError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> BankResult<T> {
        let url = self.url(path);
        debug!("{} {}", method, url);

        // `.json()` sets `Content-Type: application/json`
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| BankError::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> BankResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BankError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            warn!("Backend returned HTTP {}: {}", status, message.as_deref().unwrap_or("-"));
            return Err(BankError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl BankApi for HttpBankApi {
    async fn dashboard(&self) -> BankResult<DashboardSummary> {
        self.get_json("/dashboard", &[]).await
    }

    async fn list_donors(&self, query: &DonorQuery) -> BankResult<Vec<Donor>> {
        self.get_json("/donors", &query.to_params()).await
    }

    async fn get_donor(&self, donor_id: u64) -> BankResult<Donor> {
        self.get_json(&format!("/donors/{}", donor_id), &[]).await
    }

    async fn register_donor(&self, donor: &NewDonor) -> BankResult<Created> {
        self.send_json(reqwest::Method::POST, "/register_donor", donor).await
    }

    async fn update_donor(&self, donor_id: u64, update: &DonorUpdate) -> BankResult<()> {
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PUT, &format!("/donors/{}", donor_id), update)
            .await?;
        Ok(())
    }

    async fn list_donations(&self) -> BankResult<Vec<Donation>> {
        self.get_json("/donations", &[]).await
    }

    async fn record_donation(&self, donation: &NewDonation) -> BankResult<Created> {
        self.send_json(reqwest::Method::POST, "/donations", donation).await
    }

    async fn list_screenings(&self, donor_id: u64) -> BankResult<Vec<HealthScreening>> {
        self.get_json(&format!("/donor_health/{}", donor_id), &[]).await
    }

    async fn record_screening(&self, screening: &NewScreening) -> BankResult<Created> {
        self.send_json(reqwest::Method::POST, "/donor_health", screening).await
    }

    async fn list_requests(&self, query: &RequestQuery) -> BankResult<Vec<BloodRequest>> {
        self.get_json("/requests", &query.to_params()).await
    }

    async fn create_request(&self, request: &NewRequest) -> BankResult<Created> {
        self.send_json(reqwest::Method::POST, "/requests", request).await
    }

    async fn update_request_status(
        &self,
        request_id: u64,
        update: &RequestStatusUpdate,
    ) -> BankResult<()> {
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PUT, &format!("/requests/{}", request_id), update)
            .await?;
        Ok(())
    }

    async fn list_stock(&self, query: &StockQuery) -> BankResult<Vec<StockItem>> {
        self.get_json("/stock", &query.to_params()).await
    }

    async fn list_blood_banks(&self) -> BankResult<Vec<BloodBank>> {
        self.get_json("/blood_banks", &[]).await
    }

    async fn list_hospitals(&self) -> BankResult<Vec<Hospital>> {
        self.get_json("/hospitals", &[]).await
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BloodGroup, RequestStatus, StockStatus};
    use axum::{
        extract::{Path, Query},
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, post, put},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn handle_stock(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let all = vec![
            json!({"stock_id": 1, "bank_id": 2, "bank_name": "City", "location": "X",
                   "blood_group": "O+", "quantity_units": 5, "status": null}),
            json!({"stock_id": 2, "bank_id": 3, "bank_name": "North", "location": "Y",
                   "blood_group": "A-", "quantity_units": "12", "status": "Low"}),
        ];
        let filtered: Vec<_> = all
            .into_iter()
            .filter(|s| params.get("blood_group").map_or(true, |g| s["blood_group"] == json!(g)))
            .filter(|s| params.get("bank_id").map_or(true, |b| s["bank_id"].to_string() == *b))
            .collect();
        Json(filtered)
    }

    async fn handle_register(
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> impl IntoResponse {
        let is_json = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map_or(false, |v| v.starts_with("application/json"));
        if !is_json {
            return (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({"error": "json only"})));
        }
        if body.get("contact").is_none() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Missing required field: contact"})),
            );
        }
        (StatusCode::CREATED, Json(json!({"message": "Donor registered", "donor_id": 42})))
    }

    async fn handle_update_request(
        Path(id): Path<u64>,
        Json(body): Json<serde_json::Value>,
    ) -> impl IntoResponse {
        if id != 9 {
            return (StatusCode::NOT_FOUND, Json(json!({"error": "Request not found"})));
        }
        assert_eq!(body, json!({"status": "Approved"}));
        (StatusCode::OK, Json(json!({"message": "Request updated successfully"})))
    }

    async fn handle_crash() -> impl IntoResponse {
        (StatusCode::INTERNAL_SERVER_ERROR, "<html>boom</html>")
    }

    async fn spawn_backend() -> String {
        let app = Router::new()
            .route("/stock", get(handle_stock))
            .route("/register_donor", post(handle_register))
            .route("/requests/:id", put(handle_update_request))
            .route("/dashboard", get(handle_crash));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> HttpBankApi {
        HttpBankApi::new(&ApiConfig {
            base_url,
            request_timeout_ms: 2_000,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_stock_with_and_without_filter() {
        let api = client_for(spawn_backend().await);

        let all = api.list_stock(&StockQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].quantity_units, 12);
        assert_eq!(all[1].status, Some(StockStatus::Low));

        let filtered = api
            .list_stock(&StockQuery {
                blood_group: Some(BloodGroup::OPos),
                bank_id: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].stock_id, 1);
    }

    #[tokio::test]
    async fn test_backend_error_message_is_preserved() {
        let api = client_for(spawn_backend().await);
        let donor = crate::types::NewDonor {
            name: "Ravi".to_string(),
            age: 30,
            gender: "Male".to_string(),
            blood_group: BloodGroup::BPos,
            contact: "555-0100".to_string(),
            email: None,
            address: None,
            city: None,
        };

        let created = api.register_donor(&donor).await.unwrap();
        assert_eq!(created.donor_id, Some(42));

        let err = api
            .update_request_status(1, &RequestStatusUpdate { status: RequestStatus::Approved })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            BankError::Backend {
                status: 404,
                message: Some("Request not found".to_string())
            }
        );

        api.update_request_status(9, &RequestStatusUpdate { status: RequestStatus::Approved })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_json_error_body_has_no_message() {
        let api = client_for(spawn_backend().await);
        let err = api.dashboard().await.unwrap_err();
        assert_eq!(err, BankError::Backend { status: 500, message: None });
        assert_eq!(err.user_message("Error loading dashboard data"), "Error loading dashboard data");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = client_for(format!("http://{}", addr));
        let err = api.list_blood_banks().await.unwrap_err();
        assert!(err.is_network());
    }
}
