//! Order history and confirmation routes.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use dentica_core::{CoreError, Order};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub limit: Option<u32>,
}

/// `GET /api/orders`: most recent first.
pub async fn list_orders(
    State(state): State<AppState>,
    query: Result<Query<OrdersQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Order>>> {
    let Query(query) = query?;
    let catalog_config = &state.config.catalog;
    let limit = query
        .limit
        .unwrap_or(catalog_config.default_limit)
        .clamp(1, catalog_config.max_limit);

    Ok(Json(state.db.orders().list(limit).await?))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    match state.db.orders().get(&id).await? {
        Some(order) => Ok(Json(order)),
        None => Err(CoreError::OrderNotFound(id).into()),
    }
}
