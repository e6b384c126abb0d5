//! # Catalog Routes
//!
//! Read surface for the listing/detail pages plus the admin write contract.
//!
//! ## Lookup
//! ```text
//! GET /api/test-series?slug=neet-mds-grand
//!        │
//!        ▼
//! EntityKind::from_collection("test-series") ── unknown ──► 404, link "/"
//!        │
//!        ▼
//! catalog().get(TestSeries, Slug("neet-mds-grand"))
//!        │
//!        ├── missing or unpublished ──► 404, link "/test-series"
//!        ▼
//! 200 CatalogEntity
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use dentica_core::validation::validate_search_query;
use dentica_core::{
    CatalogDraft, CatalogEntity, CatalogFilter, CoreError, EntityKind, EntityLookup,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string of `GET /api/{collection}`.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub slug: Option<String>,
    pub category: Option<String>,
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// Query string of `PUT /api/{collection}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuery {
    pub original_slug: Option<String>,
    pub id: Option<String>,
}

/// `GET /api/{collection}`: a listing, or one entity when `?slug=` is given.
pub async fn list_or_get(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    query: Result<Query<CatalogQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let kind = EntityKind::from_collection(&collection)?;
    let Query(query) = query?;

    if let Some(slug) = query.slug {
        let entity = find_published(&state, kind, EntityLookup::Slug(slug)).await?;
        return Ok(Json(entity).into_response());
    }

    let catalog_config = &state.config.catalog;
    let limit = query
        .limit
        .unwrap_or(catalog_config.default_limit)
        .clamp(1, catalog_config.max_limit);

    let search = match query.q.as_deref() {
        Some(q) => Some(validate_search_query(q)?),
        None => None,
    };

    let filter = CatalogFilter {
        category: query.category,
        search,
        limit: Some(limit),
    };

    let entities = state.db.catalog().list(kind, &filter).await?;
    Ok(Json(entities).into_response())
}

/// `GET /api/{collection}/{id}`
pub async fn get_by_id(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<CatalogEntity>> {
    let kind = EntityKind::from_collection(&collection)?;
    let entity = find_published(&state, kind, EntityLookup::Id(id)).await?;
    Ok(Json(entity))
}

/// `POST /api/{collection}`: creates an entity from a draft.
pub async fn create(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    payload: Result<Json<CatalogDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CatalogEntity>)> {
    let kind = EntityKind::from_collection(&collection)?;
    let Json(draft) = payload?;
    draft.validate()?;

    let entity = draft.into_entity(kind, Uuid::new_v4().to_string(), Utc::now());
    state.db.catalog().insert(&entity).await?;

    info!(%kind, id = %entity.id, slug = %entity.slug, "Catalog entity created");
    Ok((StatusCode::CREATED, Json(entity)))
}

/// `PUT /api/{collection}?originalSlug=…` (or `?id=…`): replaces an entity's
/// fields, keeping its id and creation time.
pub async fn update(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    query: Result<Query<UpdateQuery>, QueryRejection>,
    payload: Result<Json<CatalogDraft>, JsonRejection>,
) -> ApiResult<Json<CatalogEntity>> {
    let kind = EntityKind::from_collection(&collection)?;
    let Query(query) = query?;

    let lookup = match (query.id, query.original_slug) {
        (Some(id), _) => EntityLookup::Id(id),
        (None, Some(slug)) => EntityLookup::Slug(slug),
        (None, None) => return Err(ApiError::validation("originalSlug or id is required")),
    };

    let Json(draft) = payload?;
    draft.validate()?;

    let existing = state
        .db
        .catalog()
        .get(kind, &lookup)
        .await?
        .ok_or_else(|| not_found(kind, &lookup))?;

    let updated = draft.apply_to(&existing, Utc::now());
    state.db.catalog().update(&updated).await?;

    info!(%kind, id = %updated.id, slug = %updated.slug, "Catalog entity updated");
    Ok(Json(updated))
}

/// Fetches an entity the storefront may show; hidden entities read as missing.
pub(crate) async fn find_published(
    state: &AppState,
    kind: EntityKind,
    lookup: EntityLookup,
) -> ApiResult<CatalogEntity> {
    match state.db.catalog().get(kind, &lookup).await? {
        Some(entity) if entity.is_published => Ok(entity),
        _ => {
            debug!(%kind, key = lookup.key(), "Catalog entity not available");
            Err(not_found(kind, &lookup).into())
        }
    }
}

fn not_found(kind: EntityKind, lookup: &EntityLookup) -> CoreError {
    CoreError::EntityNotFound {
        kind,
        key: lookup.key().to_string(),
    }
}
