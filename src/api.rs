use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{event, Level};

use crate::{
    config::ApiConfig,
    domain::{Lot, Reservation},
    dtos::{ApiErrorBody, DeleteReservationRequest, MessageResponse, Response, UpdateReservationRequest},
    errors::ApiError,
};

pub static LOTS_ENDPOINT: &str = "/api/lotti";
pub static RESERVATIONS_ENDPOINT: &str = "/api/prenotazioni";
pub static UPDATE_RESERVATION_ENDPOINT: &str = "/api/prenotazione/modifica";
pub static DELETE_RESERVATION_ENDPOINT: &str = "/api/prenotazione/elimina";

/// Sort order of `/api/lotti`, by delivery date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotOrder {
    Asc,
    Desc,
}

impl LotOrder {
    pub fn as_query(&self) -> &'static str {
        match self {
            LotOrder::Asc => "asc",
            LotOrder::Desc => "desc",
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn list_lots(&self, order: LotOrder) -> Result<Vec<Lot>, ApiError>;
    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError>;
    async fn update_reservation(&self, id: u32, quantity: u32) -> Result<MessageResponse, ApiError>;
    async fn delete_reservation(&self, id: u32) -> Result<MessageResponse, ApiError>;
}

#[derive(Clone)]
pub struct ReqwestApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReqwestApiClient {
    pub fn new(config: &ApiConfig) -> Result<ReqwestApiClient, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie).map_err(|_| ApiError::InvalidSessionCookie)?;
            headers.insert(COOKIE, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(ReqwestApiClient {
            http,
            base_url: config.base_url.clone(),
        })
    }

    async fn get_json<R: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<R, ApiError> {
        event!(Level::DEBUG, "GET {}", endpoint);
        let request = self.http.get(format!("{}{}", self.base_url, endpoint)).query(query);
        self.execute(endpoint, request).await
    }

    async fn post_json<B: Serialize, R: Response + DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<R, ApiError> {
        event!(Level::DEBUG, "POST {}", endpoint);
        let request = self.http.post(format!("{}{}", self.base_url, endpoint)).json(body);
        self.execute(endpoint, request).await
    }

    async fn execute<R: DeserializeOwned>(&self, endpoint: &str, request: reqwest::RequestBuilder) -> Result<R, ApiError> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return Err(ApiError::Transport {
                    endpoint: endpoint.to_string(),
                    source: e,
                })
            }
        };

        let status = response.status();
        if !status.is_success() {
            // The backend explains rejections as {"error": "..."}; anything else is reported as-is.
            let message = match response.text().await {
                Ok(body) => match serde_json::from_str::<ApiErrorBody>(&body) {
                    Ok(error_body) => error_body.error,
                    Err(_) => body,
                },
                Err(_) => String::new(),
            };
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<R>().await {
            Ok(body) => Ok(body),
            Err(e) => Err(ApiError::Decode {
                endpoint: endpoint.to_string(),
                source: e,
            }),
        }
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn list_lots(&self, order: LotOrder) -> Result<Vec<Lot>, ApiError> {
        self.get_json(LOTS_ENDPOINT, &[("order", order.as_query())]).await
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, ApiError> {
        self.get_json(RESERVATIONS_ENDPOINT, &[]).await
    }

    async fn update_reservation(&self, id: u32, quantity: u32) -> Result<MessageResponse, ApiError> {
        self.post_json(UPDATE_RESERVATION_ENDPOINT, &UpdateReservationRequest { id, quantity })
            .await
    }

    async fn delete_reservation(&self, id: u32) -> Result<MessageResponse, ApiError> {
        self.post_json(DELETE_RESERVATION_ENDPOINT, &DeleteReservationRequest { id })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc, time::Duration};

    use axum::{
        extract::{Json, Query, State},
        http::{HeaderMap as AxumHeaderMap, StatusCode},
        routing::{get, post},
        Router,
    };
    use serde_json::{json, Value};
    use tokio::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorded {
        lot_orders: Vec<String>,
        cookies: Vec<String>,
        update_bodies: Vec<Value>,
        delete_bodies: Vec<Value>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    fn lot_json(id: u32) -> Value {
        json!({
            "id": id,
            "data_consegna": "2024-06-27",
            "get_date": "Thursday 27/06/2024",
            "qta_lotto": 10,
            "get_qta_disponibile": 4,
            "qta_unita_misura": "kg",
            "prezzo_unitario": 3.2,
            "get_prezzo_str": "3.2 €/kg",
            "sospeso": false,
            "rel_prodotto": {"id": 1, "nome_prodotto": "Farina", "immagine": "farina.jpg",
                             "rel_produttore": {"id": 1, "nome_produttore": "Mulino"}}
        })
    }

    async fn lots(State(recorded): State<Shared>, headers: AxumHeaderMap, Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let mut recorded = recorded.lock().await;
        recorded.lot_orders.push(params.get("order").cloned().unwrap_or_default());
        if let Some(cookie) = headers.get("cookie") {
            recorded.cookies.push(cookie.to_str().unwrap().to_string());
        }
        Json(json!([lot_json(2), lot_json(1)]))
    }

    async fn reservations() -> Json<Value> {
        Json(json!([{
            "id": 5,
            "qta": 3,
            "rel_lotto": {
                "id": 2,
                "data_consegna": "2024-06-27",
                "qta_unita_misura": "kg",
                "prezzo_unitario": 2.5,
                "rel_prodotto": {"id": 1, "nome_prodotto": "Farina", "immagine": null}
            }
        }]))
    }

    async fn update(State(recorded): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let quantity = body["quantita"].as_u64().unwrap_or(0);
        recorded.lock().await.update_bodies.push(body);
        if quantity > 10 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Quantità non valida. Massimo disponibile: 10"})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({"success": true, "message": "Quantità aggiornata con successo"})),
        )
    }

    async fn delete(State(recorded): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        recorded.lock().await.delete_bodies.push(body);
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Prenotazione non trovata"})),
        )
    }

    async fn spawn_backend() -> (String, Shared) {
        let recorded: Shared = Arc::new(Mutex::new(Recorded::default()));
        let router = Router::new()
            .route("/api/lotti", get(lots))
            .route("/api/prenotazioni", get(reservations))
            .route("/api/prenotazione/modifica", post(update))
            .route("/api/prenotazione/elimina", post(delete))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{}", address), recorded)
    }

    fn client_for(base_url: String, session_cookie: Option<&str>) -> ReqwestApiClient {
        ReqwestApiClient::new(&ApiConfig {
            base_url,
            session_cookie: session_cookie.map(String::from),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn list_lots_sends_order_and_session_cookie() {
        let (base_url, recorded) = spawn_backend().await;
        let client = client_for(base_url, Some("session=abc"));

        let lots = client.list_lots(LotOrder::Desc).await.unwrap();

        assert_eq!(lots.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2, 1]);
        let recorded = recorded.lock().await;
        assert_eq!(recorded.lot_orders, vec!["desc"]);
        assert_eq!(recorded.cookies, vec!["session=abc"]);
    }

    #[tokio::test]
    async fn list_reservations_decodes_nested_lot() {
        let (base_url, _) = spawn_backend().await;
        let client = client_for(base_url, None);

        let reservations = client.list_reservations().await.unwrap();

        assert_eq!(reservations.len(), 1);
        assert_eq!(reservations[0].quantity, 3);
        assert_eq!(reservations[0].lot.unit_price, 2.5);
    }

    #[tokio::test]
    async fn update_posts_id_and_quantita() {
        let (base_url, recorded) = spawn_backend().await;
        let client = client_for(base_url, None);

        let response = client.update_reservation(5, 4).await.unwrap();

        assert_eq!(response.message, "Quantità aggiornata con successo");
        assert_eq!(recorded.lock().await.update_bodies, vec![json!({"id": 5, "quantita": 4})]);
    }

    #[tokio::test]
    async fn rejected_update_carries_backend_message() {
        let (base_url, _) = spawn_backend().await;
        let client = client_for(base_url, None);

        let error = client.update_reservation(5, 11).await.unwrap_err();

        match error {
            ApiError::Status { endpoint, status, message } => {
                assert_eq!(endpoint, UPDATE_RESERVATION_ENDPOINT);
                assert_eq!(status, 400);
                assert_eq!(message, "Quantità non valida. Massimo disponibile: 10");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn delete_posts_id_and_maps_not_found() {
        let (base_url, recorded) = spawn_backend().await;
        let client = client_for(base_url, None);

        let error = client.delete_reservation(8).await.unwrap_err();

        assert!(matches!(error, ApiError::Status { status: 404, .. }));
        assert_eq!(recorded.lock().await.delete_bodies, vec![json!({"id": 8})]);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(format!("http://{}", address), None);

        let error = client.list_reservations().await.unwrap_err();

        assert!(matches!(error, ApiError::Transport { .. }));
    }

    #[test]
    fn invalid_session_cookie_is_rejected() {
        let result = ReqwestApiClient::new(&ApiConfig {
            base_url: String::from("http://localhost"),
            session_cookie: Some(String::from("bad\ncookie")),
            timeout: Duration::from_secs(1),
        });

        assert!(matches!(result, Err(ApiError::InvalidSessionCookie)));
    }
}
