use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use coinrate_common::{CurrencyCode, CurrencyId, CurrencyKind, NewCurrency};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, ApiResult};
use crate::service::RateService;

/// Body of create and update requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrencyPayload {
    name: Option<String>,
    code: Option<String>,
    /// 1 for crypto, 2 for fiat.
    #[serde(rename = "type")]
    kind: Option<i32>,
    is_available: Option<bool>,
}

fn required(field: &str, value: Option<String>) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

impl CurrencyPayload {
    fn validate(self) -> ApiResult<NewCurrency> {
        let name = required("name", self.name)?;
        let code = required("code", self.code)?;
        let kind = self
            .kind
            .ok_or_else(|| ApiError::BadRequest("type is required".to_string()))?;
        let kind = CurrencyKind::try_from(kind)?;
        let available = self
            .is_available
            .ok_or_else(|| ApiError::BadRequest("isAvailable is required".to_string()))?;

        Ok(NewCurrency {
            name,
            code: CurrencyCode::new(code),
            kind,
            available,
        })
    }
}

fn parse_body(body: Result<Json<CurrencyPayload>, JsonRejection>) -> ApiResult<NewCurrency> {
    let Json(payload) =
        body.map_err(|_| ApiError::BadRequest("invalid json body format".to_string()))?;
    payload.validate()
}

fn parse_id(id: &str) -> ApiResult<CurrencyId> {
    CurrencyId::parse(id).map_err(|_| ApiError::BadRequest("invalid id format".to_string()))
}

async fn create_currency(
    State(service): State<Arc<RateService>>,
    body: Result<Json<CurrencyPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let currency = parse_body(body)?;
    let created = service.registry().create_currency(currency).await?;
    info!(id = %created.id, code = %created.code, "Currency created");
    Ok(StatusCode::CREATED)
}

async fn update_currency(
    Path(id): Path<String>,
    State(service): State<Arc<RateService>>,
    body: Result<Json<CurrencyPayload>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    let currency = parse_body(body)?.into_currency(id);
    service.registry().update_currency(currency).await?;
    info!(id = %id, "Currency updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_currency(
    Path(id): Path<String>,
    State(service): State<Arc<RateService>>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    service.registry().delete_currency(id).await?;
    info!(id = %id, "Currency deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ConvertParams {
    from: Option<String>,
    to: Option<String>,
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct ConvertResponse {
    course: f64,
}

async fn convert(
    State(service): State<Arc<RateService>>,
    params: Result<Query<ConvertParams>, QueryRejection>,
) -> ApiResult<Json<ConvertResponse>> {
    let Query(params) =
        params.map_err(|_| ApiError::BadRequest("invalid query params".to_string()))?;

    let from = CurrencyCode::new(required("from", params.from)?);
    let to = CurrencyCode::new(required("to", params.to)?);
    let amount: Decimal = required("amount", params.amount)?
        .parse()
        .map_err(|_| ApiError::BadRequest("amount must be a number".to_string()))?;
    if amount <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "amount must be greater than 0".to_string(),
        ));
    }

    let converted = service.evaluator().convert(&from, &to, amount)?;
    let course = converted.to_f64().ok_or(ApiError::Internal)?;

    Ok(Json(ConvertResponse { course }))
}

pub fn router() -> Router<Arc<RateService>> {
    Router::new()
        .route("/currencies", post(create_currency))
        .route("/currencies/convert", get(convert))
        .route("/currencies/:id", put(update_currency).delete(delete_currency))
}
