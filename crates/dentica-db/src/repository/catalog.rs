//! # Catalog Repository
//!
//! Database operations for courses, exams, test series, notes and videos.
//! All five kinds share the `catalog_entities` table; `kind` partitions them.
//!
//! ## Listing Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /api/courses?category=endodontics&q=rotary&limit=20               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogFilter { category, search, limit }                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE kind = 'course'                                                 │
//! │    AND is_published = 1                                                │
//! │    AND lower(category) = lower(?)         ← exact, case-insensitive    │
//! │    AND instr(lower(title), lower(?)) > 0  ← substring search           │
//! │  ORDER BY created_at DESC, title                                       │
//! │  LIMIT effective_limit()                  ← 1..=200, default 50        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use dentica_core::{CatalogEntity, CatalogFilter, EntityKind, EntityLookup, Money};

const SELECT_COLUMNS: &str = r#"
    SELECT
        id, kind, slug, title, description, price_paise,
        thumbnail, thumbnails, category, details, is_published,
        created_at, updated_at
    FROM catalog_entities
"#;

/// One row of `catalog_entities`.
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    kind: EntityKind,
    slug: String,
    title: String,
    description: Option<String>,
    price_paise: i64,
    thumbnail: Option<String>,
    thumbnails: String,
    category: Option<String>,
    details: String,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CatalogRow> for CatalogEntity {
    type Error = DbError;

    fn try_from(row: CatalogRow) -> DbResult<Self> {
        let thumbnails: Vec<String> = serde_json::from_str(&row.thumbnails)
            .map_err(|e| DbError::serialization("thumbnails", e))?;
        let details: serde_json::Value =
            serde_json::from_str(&row.details).map_err(|e| DbError::serialization("details", e))?;

        Ok(CatalogEntity {
            id: row.id,
            kind: row.kind,
            slug: row.slug,
            title: row.title,
            description: row.description,
            price: Money::from_paise(row.price_paise),
            thumbnail: row.thumbnail,
            thumbnails,
            category: row.category,
            details,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for catalog database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = CatalogRepository::new(pool);
///
/// let notes = repo.list(EntityKind::Note, &CatalogFilter::default()).await?;
/// let course = repo.get(EntityKind::Course, &EntityLookup::Slug("endo-basics".into())).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Lists published entities of one kind.
    ///
    /// ## Filters
    /// * `category` - exact match, case-insensitive
    /// * `search` - case-insensitive title substring; blank means no filter
    /// * `limit` - clamped by [`CatalogFilter::effective_limit`]
    pub async fn list(&self, kind: EntityKind, filter: &CatalogFilter) -> DbResult<Vec<CatalogEntity>> {
        let category = non_blank(filter.category.as_deref());
        let search = non_blank(filter.search.as_deref());
        let limit = filter.effective_limit();

        debug!(%kind, ?category, ?search, limit, "Listing catalog");

        let sql = format!(
            r#"{SELECT_COLUMNS}
            WHERE kind = ?1
              AND is_published = 1
              AND (?2 IS NULL OR lower(category) = lower(?2))
              AND (?3 IS NULL OR instr(lower(title), lower(?3)) > 0)
            ORDER BY created_at DESC, title
            LIMIT ?4
            "#
        );

        let rows: Vec<CatalogRow> = sqlx::query_as(&sql)
            .bind(kind)
            .bind(category)
            .bind(search)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Catalog listing returned");
        rows.into_iter().map(CatalogEntity::try_from).collect()
    }

    /// Gets one entity of a kind by id or slug, published or not.
    ///
    /// ## Returns
    /// * `Ok(Some(entity))` - Found
    /// * `Ok(None)` - No entity of that kind has this id/slug
    pub async fn get(&self, kind: EntityKind, lookup: &EntityLookup) -> DbResult<Option<CatalogEntity>> {
        let (column, key) = match lookup {
            EntityLookup::Id(id) => ("id", id.as_str()),
            EntityLookup::Slug(slug) => ("slug", slug.as_str()),
        };

        debug!(%kind, column, key, "Fetching catalog entity");

        let sql = format!("{SELECT_COLUMNS} WHERE kind = ?1 AND {column} = ?2");

        let row: Option<CatalogRow> = sqlx::query_as(&sql)
            .bind(kind)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogEntity::try_from).transpose()
    }

    /// Inserts a new entity.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - the kind already has this slug
    pub async fn insert(&self, entity: &CatalogEntity) -> DbResult<()> {
        debug!(kind = %entity.kind, slug = %entity.slug, "Inserting catalog entity");

        let (thumbnails, details) = encode_json_columns(entity)?;

        sqlx::query(
            r#"
            INSERT INTO catalog_entities (
                id, kind, slug, title, description, price_paise,
                thumbnail, thumbnails, category, details, is_published,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&entity.id)
        .bind(entity.kind)
        .bind(&entity.slug)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(entity.price.paise())
        .bind(&entity.thumbnail)
        .bind(thumbnails)
        .bind(&entity.category)
        .bind(details)
        .bind(entity.is_published)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &entity.slug))?;

        Ok(())
    }

    /// Overwrites an existing entity, matched by id.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no entity with this id
    /// * `Err(DbError::UniqueViolation)` - the new slug is taken
    pub async fn update(&self, entity: &CatalogEntity) -> DbResult<()> {
        debug!(id = %entity.id, slug = %entity.slug, "Updating catalog entity");

        let (thumbnails, details) = encode_json_columns(entity)?;

        let result = sqlx::query(
            r#"
            UPDATE catalog_entities SET
                slug = ?2,
                title = ?3,
                description = ?4,
                price_paise = ?5,
                thumbnail = ?6,
                thumbnails = ?7,
                category = ?8,
                details = ?9,
                is_published = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&entity.id)
        .bind(&entity.slug)
        .bind(&entity.title)
        .bind(&entity.description)
        .bind(entity.price.paise())
        .bind(&entity.thumbnail)
        .bind(thumbnails)
        .bind(&entity.category)
        .bind(details)
        .bind(entity.is_published)
        .bind(entity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| slug_conflict(e, &entity.slug))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(entity.kind.as_str(), &entity.id));
        }

        Ok(())
    }

    /// Number of entities of a kind, published or not.
    pub async fn count(&self, kind: EntityKind) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_entities WHERE kind = ?1")
            .bind(kind)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn encode_json_columns(entity: &CatalogEntity) -> DbResult<(String, String)> {
    let thumbnails = serde_json::to_string(&entity.thumbnails)
        .map_err(|e| DbError::serialization("thumbnails", e))?;
    let details =
        serde_json::to_string(&entity.details).map_err(|e| DbError::serialization("details", e))?;
    Ok((thumbnails, details))
}

/// The only UNIQUE index on this table is `(kind, slug)`.
fn slug_conflict(err: sqlx::Error, slug: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("slug", slug),
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{entity, test_db};

    #[tokio::test]
    async fn test_insert_and_get_by_slug_and_id() {
        let db = test_db().await;
        let repo = db.catalog();
        let course = entity(EntityKind::Course, "endo-basics", "Endodontics Basics", 1499);
        repo.insert(&course).await.unwrap();

        let by_slug = repo
            .get(EntityKind::Course, &EntityLookup::Slug("endo-basics".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_slug.id, course.id);
        assert_eq!(by_slug.price, Money::from_rupees(1499));
        assert_eq!(by_slug.thumbnails, course.thumbnails);
        assert_eq!(by_slug.details["duration"], "6 weeks");

        let by_id = repo
            .get(EntityKind::Course, &EntityLookup::Id(course.id.clone()))
            .await
            .unwrap();
        assert!(by_id.is_some());
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_kind() {
        let db = test_db().await;
        let repo = db.catalog();
        repo.insert(&entity(EntityKind::Note, "perio-notes", "Perio Notes", 199))
            .await
            .unwrap();

        let wrong_kind = repo
            .get(EntityKind::Video, &EntityLookup::Slug("perio-notes".into()))
            .await
            .unwrap();
        assert!(wrong_kind.is_none());

        let missing = repo
            .get(EntityKind::Note, &EntityLookup::Slug("nope".into()))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_conflict() {
        let db = test_db().await;
        let repo = db.catalog();
        repo.insert(&entity(EntityKind::Exam, "neet-mds", "NEET MDS", 4999))
            .await
            .unwrap();

        let err = repo
            .insert(&entity(EntityKind::Exam, "neet-mds", "NEET MDS Again", 4999))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(err.to_string(), "Duplicate slug: 'neet-mds' already exists");

        // Same slug under another kind is fine.
        repo.insert(&entity(EntityKind::TestSeries, "neet-mds", "NEET MDS Series", 999))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = test_db().await;
        let repo = db.catalog();

        let mut rotary = entity(EntityKind::Course, "rotary-endo", "Rotary Endodontics", 2999);
        rotary.category = Some("Endodontics".to_string());
        let mut implants = entity(EntityKind::Course, "implant-101", "Implantology 101", 3999);
        implants.category = Some("implantology".to_string());
        let mut hidden = entity(EntityKind::Course, "draft-course", "Rotary Draft", 10);
        hidden.is_published = false;

        for e in [&rotary, &implants, &hidden] {
            repo.insert(e).await.unwrap();
        }
        repo.insert(&entity(EntityKind::Video, "rotary-demo", "Rotary Demo", 0))
            .await
            .unwrap();

        let all = repo.list(EntityKind::Course, &CatalogFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|e| e.is_published && e.kind == EntityKind::Course));

        let search = CatalogFilter {
            search: Some("ROTARY".to_string()),
            ..Default::default()
        };
        let found = repo.list(EntityKind::Course, &search).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].slug, "rotary-endo");

        let category = CatalogFilter {
            category: Some("endodontics".to_string()),
            ..Default::default()
        };
        let found = repo.list(EntityKind::Course, &category).await.unwrap();
        assert_eq!(found.len(), 1);

        let limited = CatalogFilter {
            limit: Some(1),
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(EntityKind::Course, &limited).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_id() {
        let db = test_db().await;
        let repo = db.catalog();
        let mut course = entity(EntityKind::Course, "ortho-1", "Ortho One", 100);
        repo.insert(&course).await.unwrap();

        course.slug = "ortho-one".to_string();
        course.price = Money::from_rupees(150);
        repo.update(&course).await.unwrap();

        let updated = repo
            .get(EntityKind::Course, &EntityLookup::Slug("ortho-one".into()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.price, Money::from_rupees(150));
        assert_eq!(repo.count(EntityKind::Course).await.unwrap(), 1);

        let mut ghost = entity(EntityKind::Course, "ghost", "Ghost", 1);
        ghost.id = "missing-id".to_string();
        assert!(matches!(
            repo.update(&ghost).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }
}
