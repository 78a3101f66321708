use axum::{extract::State, http::StatusCode, Json};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;
use uuid::Uuid;

use super::error::{ApiError, LedgerContext};
use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::AppState;
use crate::analytics::{
    parse_date, Dashboard, DateRange, ProductProfitability, ProfitStats, StoreStats,
    TimeRangeStats, DEFAULT_RANKING_LIMIT,
};
use crate::links::product_link;
use crate::storage::LedgerStorage;
use crate::{NewProduct, Product, ProductFilter, ProductPatch, ProductWithStore, Store};

#[derive(Debug, Deserialize)]
pub struct CreateStore {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    row: ProductWithStore,
    link: Option<String>,
}

impl From<ProductWithStore> for ProductView {
    fn from(row: ProductWithStore) -> Self {
        let link = product_link(&row);
        Self { row, link }
    }
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

pub async fn list_stores<S: LedgerStorage>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Store>>, ApiError> {
    let stores = state
        .ledger
        .list_stores()
        .await
        .context("Failed to fetch stores")?;
    Ok(Json(stores))
}

pub async fn create_store<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiJson(body): ApiJson<CreateStore>,
) -> Result<(StatusCode, Json<Store>), ApiError> {
    let name = body
        .name
        .ok_or_else(|| ApiError::BadRequest("Store name required".to_string()))?;
    let store = state
        .ledger
        .create_store(&name)
        .await
        .context("Failed to create store")?;
    Ok((StatusCode::CREATED, Json(store)))
}

pub async fn delete_store<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state
        .ledger
        .delete_store(id)
        .await
        .context("Failed to delete store")?;
    Ok(success())
}

pub async fn list_products<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let rows = state
        .ledger
        .list_products(&filter)
        .await
        .context("Failed to fetch products")?;
    Ok(Json(rows.into_iter().map(ProductView::from).collect()))
}

pub async fn create_product<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiJson(body): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state
        .ledger
        .create_product(body)
        .await
        .context("Failed to create product")?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ProductView>, ApiError> {
    let row = state
        .ledger
        .get_product(id)
        .await
        .context("Failed to fetch product")?;
    Ok(Json(row.into()))
}

pub async fn update_product<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .ledger
        .update_product(id, patch)
        .await
        .context("Failed to update product")?;
    Ok(Json(product))
}

pub async fn delete_product<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state
        .ledger
        .delete_product(id)
        .await
        .context("Failed to delete product")?;
    Ok(success())
}

pub async fn overall_stats<S: LedgerStorage>(
    State(state): State<AppState<S>>,
) -> Result<Json<ProfitStats>, ApiError> {
    let stats = state
        .ledger
        .overall_stats()
        .await
        .context("Failed to fetch stats")?;
    Ok(Json(stats))
}

/// Both bounds are required and inclusive.
#[instrument(skip(state))]
pub async fn range_stats<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<RangeQuery>,
) -> Result<Json<TimeRangeStats>, ApiError> {
    let bound = |raw: Option<&str>| raw.and_then(parse_date);
    let (Some(start), Some(end)) = (bound(query.start.as_deref()), bound(query.end.as_deref()))
    else {
        return Err(ApiError::BadRequest(
            "Start and end dates required".to_string(),
        ));
    };

    let stats = state
        .ledger
        .time_range_stats(DateRange::new(start, end))
        .await
        .context("Failed to fetch range stats")?;
    Ok(Json(stats))
}

pub async fn most_profitable<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    ApiQuery(query): ApiQuery<LimitQuery>,
) -> Result<Json<Vec<ProductProfitability>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_RANKING_LIMIT);
    let ranking = state
        .ledger
        .most_profitable(limit)
        .await
        .context("Failed to fetch profitable products")?;
    Ok(Json(ranking))
}

pub async fn store_stats<S: LedgerStorage>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<StoreStats>>, ApiError> {
    let stores = state
        .ledger
        .store_stats()
        .await
        .context("Failed to fetch store stats")?;
    Ok(Json(stores))
}

/// Periods are anchored on the server's local date.
pub async fn dashboard<S: LedgerStorage>(
    State(state): State<AppState<S>>,
) -> Result<Json<Dashboard>, ApiError> {
    let today = Local::now().date_naive();
    let dashboard = state
        .ledger
        .dashboard(today, DEFAULT_RANKING_LIMIT)
        .await
        .context("Failed to fetch dashboard")?;
    Ok(Json(dashboard))
}
