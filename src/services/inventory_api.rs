//! Клиент backend REST API инвентаря.
//!
//! [`InventoryApi`] - контракт коллаборатора, которым пользуется таблица.
//! [`HttpInventoryApi`] - реализация поверх reqwest, все запросы проходят
//! через [`CircuitBreaker`].

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info, warn};

use super::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::{CircuitBreakerConfig, InventoryApiConfig};
use crate::error::ApiError;
use crate::models::{FieldChanges, RowId, RowPage, RowQuery};

pub trait InventoryApi: Send + Sync {
    fn fetch_rows(&self, query: &RowQuery) -> impl Future<Output = Result<RowPage, ApiError>> + Send;

    fn clone_rows(&self, ids: &[RowId]) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn delete_rows(&self, ids: &[RowId]) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn publish_live(&self, ids: &[RowId]) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn publish_cloned(&self, ids: &[RowId]) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Один и тот же набор изменений применяется ко всем `ids`.
    fn save_edit(
        &self,
        changes: &FieldChanges,
        ids: &[RowId],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

// --- Модели запросов к API ---

#[derive(Debug, Serialize)]
struct IdsRequest<'a> {
    ids: &'a [RowId],
}

#[derive(Debug, Serialize)]
struct BulkEditRequest<'a> {
    ids: &'a [RowId],
    changes: &'a FieldChanges,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug)]
pub struct HttpInventoryApi {
    base_url: String,
    token: Option<String>,
    http_client: reqwest::Client,
    circuit_breaker: CircuitBreaker,
}

impl HttpInventoryApi {
    pub fn from_config(
        config: &InventoryApiConfig,
        breaker: &CircuitBreakerConfig,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http_client,
            circuit_breaker: CircuitBreaker::from_config(breaker),
        })
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Отправляет запрос через Circuit Breaker и проверяет статус ответа.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let Some(permit) = self.circuit_breaker.acquire() else {
            warn!("Circuit breaker is OPEN - blocking inventory API request");
            return Err(ApiError::CircuitOpen);
        };

        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                permit.success();
                Ok(response)
            }
            Ok(response) => {
                // 4xx - сервис жив, ошибка в запросе; 5xx считаем сбоем.
                if response.status().is_server_error() {
                    permit.failure();
                } else {
                    permit.success();
                }
                Err(status_error(response).await)
            }
            Err(e) => {
                error!("Inventory API request failed: {:?}", e);
                permit.failure();
                Err(ApiError::Transport(e))
            }
        }
    }

    async fn post_ids(&self, path: &str, ids: &[RowId]) -> Result<(), ApiError> {
        let request = self.http_client.post(self.url(path)).json(&IdsRequest { ids });
        self.send(request).await?;
        Ok(())
    }
}

async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or(body);
    ApiError::Status { status, message }
}

impl InventoryApi for HttpInventoryApi {
    async fn fetch_rows(&self, query: &RowQuery) -> Result<RowPage, ApiError> {
        let request = self.http_client.get(self.url("/inventory")).query(query);
        let page = self.send(request).await?.json::<RowPage>().await?;
        info!(page = query.page, rows = page.rows.len(), "inventory page fetched");
        Ok(page)
    }

    async fn clone_rows(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.post_ids("/inventory/clone", ids).await
    }

    async fn delete_rows(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.post_ids("/inventory/delete", ids).await
    }

    async fn publish_live(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.post_ids("/inventory/publish", ids).await
    }

    async fn publish_cloned(&self, ids: &[RowId]) -> Result<(), ApiError> {
        self.post_ids("/inventory/publish-cloned", ids).await
    }

    async fn save_edit(&self, changes: &FieldChanges, ids: &[RowId]) -> Result<(), ApiError> {
        let request = self
            .http_client
            .patch(self.url("/inventory/bulk-edit"))
            .json(&BulkEditRequest { ids, changes });
        self.send(request).await?;
        Ok(())
    }
}
