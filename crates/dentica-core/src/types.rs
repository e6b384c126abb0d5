//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogEntity   │   │     Order       │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (ORD-...)   │   │  id (entity)    │       │
//! │  │  kind + slug    │   │  customer       │   │  title          │       │
//! │  │  title, price   │   │  total          │   │  price × qty    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   EntityKind    │   │ PaymentMethod   │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  Course         │   │  Qr             │                             │
//! │  │  Exam           │   │  Paypal         │                             │
//! │  │  TestSeries     │   │  Razorpay       │                             │
//! │  │  Note, Video    │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every catalog entity has:
//! - `id`: UUID v4 - immutable, used by carts and orders
//! - `slug`: human-readable, unique per kind, used in storefront URLs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, ValidationError};
use crate::money::Money;
use crate::validation::{validate_price, validate_slug, validate_title};
use crate::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of purchasable listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Course,
    Exam,
    TestSeries,
    Note,
    Video,
}

impl EntityKind {
    /// Every kind, in storefront menu order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Course,
        EntityKind::Exam,
        EntityKind::TestSeries,
        EntityKind::Note,
        EntityKind::Video,
    ];

    /// Stored/serialized name (`test_series`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Course => "course",
            EntityKind::Exam => "exam",
            EntityKind::TestSeries => "test_series",
            EntityKind::Note => "note",
            EntityKind::Video => "video",
        }
    }

    /// URL collection name (`test-series`).
    pub const fn collection(&self) -> &'static str {
        match self {
            EntityKind::Course => "courses",
            EntityKind::Exam => "exams",
            EntityKind::TestSeries => "test-series",
            EntityKind::Note => "notes",
            EntityKind::Video => "videos",
        }
    }

    /// Resolves a URL collection segment to a kind.
    ///
    /// ```rust
    /// use dentica_core::EntityKind;
    ///
    /// assert_eq!(EntityKind::from_collection("test-series").unwrap(), EntityKind::TestSeries);
    /// assert!(EntityKind::from_collection("dentists").is_err());
    /// ```
    pub fn from_collection(segment: &str) -> Result<Self, CoreError> {
        let normalized = segment.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "courses" => Ok(EntityKind::Course),
            "exams" => Ok(EntityKind::Exam),
            "test-series" | "testseries" | "test_series" => Ok(EntityKind::TestSeries),
            "notes" => Ok(EntityKind::Note),
            "videos" => Ok(EntityKind::Video),
            _ => Err(CoreError::UnknownCollection(segment.to_string())),
        }
    }

    /// Storefront listing page for this kind, used in not-found links.
    pub fn listing_path(&self) -> String {
        format!("/{}", self.collection())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: EntityKind::ALL.iter().map(|k| k.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Catalog Entity
// =============================================================================

/// A purchasable listing: course, exam-prep package, test series, notes, video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogEntity {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub kind: EntityKind,

    /// URL-friendly identifier, unique within a kind.
    pub slug: String,

    pub title: String,

    pub description: Option<String>,

    /// Price in paise.
    pub price: Money,

    /// Primary image shown in listings.
    pub thumbnail: Option<String>,

    /// Gallery images shown on the detail page.
    pub thumbnails: Vec<String>,

    pub category: Option<String>,

    /// Kind-specific fields (course duration, video url, exam date, ...).
    #[ts(type = "Record<string, unknown>")]
    pub details: serde_json::Value,

    /// Unpublished entities are hidden from the storefront.
    pub is_published: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Catalog Draft (admin write contract)
// =============================================================================

/// Body of a create/update request from the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CatalogDraft {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub thumbnails: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "empty_details")]
    #[ts(type = "Record<string, unknown>")]
    pub details: serde_json::Value,
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn empty_details() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn default_published() -> bool {
    true
}

impl CatalogDraft {
    /// Checks the write contract: title and slug present, slug well-formed,
    /// price not negative. Stops at the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_slug(&self.slug)?;
        validate_price(self.price)?;

        if !self.details.is_object() {
            return Err(ValidationError::invalid_format(
                "details",
                "must be a JSON object",
            ));
        }

        Ok(())
    }

    /// Builds a new entity from this draft.
    pub fn into_entity(self, kind: EntityKind, id: String, now: DateTime<Utc>) -> CatalogEntity {
        CatalogEntity {
            id,
            kind,
            slug: self.slug.trim().to_string(),
            title: self.title.trim().to_string(),
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            thumbnails: self.thumbnails,
            category: self.category,
            details: self.details,
            is_published: self.is_published,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies this draft over an existing entity, keeping its identity.
    pub fn apply_to(self, existing: &CatalogEntity, now: DateTime<Utc>) -> CatalogEntity {
        let mut updated = self.into_entity(existing.kind, existing.id.clone(), now);
        updated.created_at = existing.created_at;
        updated
    }
}

// =============================================================================
// Catalog Queries
// =============================================================================

/// Optional filters for catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    /// Requested page size; see [`CatalogFilter::effective_limit`].
    pub limit: Option<u32>,
}

impl CatalogFilter {
    /// Page size clamped to `1..=MAX_LIST_LIMIT`, defaulting to `DEFAULT_LIST_LIMIT`.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

/// How a single entity is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityLookup {
    Id(String),
    Slug(String),
}

impl EntityLookup {
    /// The raw key, for messages.
    pub fn key(&self) -> &str {
        match self {
            EntityLookup::Id(key) | EntityLookup::Slug(key) => key,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// UPI QR code scanned by the customer.
    Qr,
    Paypal,
    Razorpay,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Qr, PaymentMethod::Paypal, PaymentMethod::Razorpay];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Qr => "qr",
            PaymentMethod::Paypal => "paypal",
            PaymentMethod::Razorpay => "razorpay",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// Customer contact details frozen on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A line of a placed order.
/// Uses snapshot pattern to freeze catalog data at time of checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    /// Catalog entity id.
    pub id: String,
    /// Title at time of checkout (frozen).
    pub title: String,
    /// Unit price at time of add-to-cart (frozen).
    pub price: Money,
    pub quantity: i64,
}

impl OrderItem {
    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }
}

/// An immutable record of a completed checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    /// Time-based id, e.g. `ORD-20261018-142233-0042`.
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub payment_method: PaymentMethod,
}

impl Order {
    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CatalogDraft {
        CatalogDraft {
            slug: "endo-basics".to_string(),
            title: "Endodontics Basics".to_string(),
            description: None,
            price: Money::from_rupees(1499),
            thumbnail: None,
            thumbnails: Vec::new(),
            category: Some("endodontics".to_string()),
            details: empty_details(),
            is_published: true,
        }
    }

    #[test]
    fn test_collection_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection(kind.collection()).unwrap(), kind);
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_collection() {
        let err = EntityKind::from_collection("dentists").unwrap_err();
        assert!(matches!(err, CoreError::UnknownCollection(_)));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EntityKind::TestSeries).unwrap();
        assert_eq!(json, "\"test_series\"");
        assert_eq!(EntityKind::TestSeries.listing_path(), "/test-series");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("QR".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qr);
        assert_eq!(" razorpay ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Razorpay);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_filter_limit_clamped() {
        assert_eq!(CatalogFilter::default().effective_limit(), DEFAULT_LIST_LIMIT);

        let big = CatalogFilter {
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(big.effective_limit(), MAX_LIST_LIMIT);

        let zero = CatalogFilter {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(zero.effective_limit(), 1);
    }

    #[test]
    fn test_draft_validation() {
        assert!(draft().validate().is_ok());

        let mut bad = draft();
        bad.title = "  ".to_string();
        assert_eq!(bad.validate().unwrap_err(), ValidationError::required("title"));

        let mut bad = draft();
        bad.slug = "Endo Basics".to_string();
        assert!(matches!(
            bad.validate().unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));

        let mut bad = draft();
        bad.price = Money::from_paise(-1);
        assert!(bad.validate().is_err());

        let mut bad = draft();
        bad.details = serde_json::json!([1, 2]);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_draft_apply_keeps_identity() {
        let created_at = Utc::now() - chrono::Duration::days(3);
        let existing = draft().into_entity(EntityKind::Course, "id-1".to_string(), created_at);

        let mut change = draft();
        change.price = Money::from_rupees(999);
        let updated = change.apply_to(&existing, Utc::now());

        assert_eq!(updated.id, "id-1");
        assert_eq!(updated.kind, EntityKind::Course);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.price, Money::from_rupees(999));
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let draft: CatalogDraft = serde_json::from_value(serde_json::json!({
            "slug": "ortho-notes",
            "title": "Orthodontics Notes",
            "price": 29900
        }))
        .unwrap();

        assert!(draft.is_published);
        assert!(draft.details.is_object());
        assert!(draft.thumbnails.is_empty());
    }
}
