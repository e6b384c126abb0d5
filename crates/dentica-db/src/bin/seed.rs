//! # Seed Data Generator
//!
//! Populates the database with a development catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p dentica-db --bin seed
//!
//! # Specify database path
//! cargo run -p dentica-db --bin seed -- --db ./data/dentica.db
//! ```
//!
//! ## Generated Catalog
//! For every kind (courses, exams, test series, notes, videos) one listing per
//! topic below, with kind-specific `details`:
//! - course: duration, mode, instructor
//! - exam: exam date, seats
//! - test_series: number of tests, validity in days
//! - note: page count, format
//! - video: duration in minutes, preview url
//!
//! Every tenth listing is left unpublished so hidden-entity handling can be
//! exercised from the storefront.

use chrono::Utc;
use dentica_core::{CatalogEntity, EntityKind, Money};
use dentica_db::{Database, DbConfig};
use serde_json::json;
use std::env;
use uuid::Uuid;

/// (category, topic title) pairs shared by all kinds.
const TOPICS: &[(&str, &str)] = &[
    ("endodontics", "Rotary Endodontics"),
    ("endodontics", "Access Cavity Design"),
    ("prosthodontics", "Complete Denture Fabrication"),
    ("prosthodontics", "Crown and Bridge Essentials"),
    ("orthodontics", "Fixed Orthodontic Mechanics"),
    ("orthodontics", "Cephalometric Analysis"),
    ("periodontics", "Periodontal Flap Surgery"),
    ("implantology", "Implant Placement Basics"),
    ("oral-surgery", "Third Molar Extraction"),
    ("oral-medicine", "Oral Pathology Review"),
    ("pedodontics", "Pediatric Behaviour Management"),
    ("public-health", "Community Dentistry Capsule"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/dentica.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Dentica Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/dentica.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Dentica Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = db.catalog();
    let mut generated = 0;

    for kind in EntityKind::ALL {
        let existing = catalog.count(kind).await?;
        if existing > 0 {
            println!("⚠ {} already has {} listings, skipping", kind.collection(), existing);
            continue;
        }

        for (idx, (category, topic)) in TOPICS.iter().enumerate() {
            let entity = generate_entity(kind, category, topic, idx);

            if let Err(e) = catalog.insert(&entity).await {
                eprintln!("Failed to insert {}/{}: {}", kind.collection(), entity.slug, e);
                continue;
            }

            generated += 1;
        }

        println!("  Seeded {}", kind.collection());
    }

    println!();
    println!("✓ Generated {} listings", generated);
    println!("✓ Seed complete!");

    Ok(())
}

/// Builds one listing with deterministic price and details.
fn generate_entity(kind: EntityKind, category: &str, topic: &str, seed: usize) -> CatalogEntity {
    let now = Utc::now();
    let slug = slugify(topic);

    let (title, rupees, details) = match kind {
        EntityKind::Course => (
            format!("{} Masterclass", topic),
            2_499 + (seed as i64 * 250),
            json!({
                "duration": format!("{} weeks", 4 + seed % 6),
                "mode": if seed % 2 == 0 { "online" } else { "hybrid" },
                "instructor": format!("Dr. Faculty {}", seed + 1),
            }),
        ),
        EntityKind::Exam => (
            format!("{} Exam Prep", topic),
            1_499 + (seed as i64 * 100),
            json!({
                "examDate": format!("2027-0{}-15", 1 + seed % 9),
                "seats": 100 + seed * 10,
            }),
        ),
        EntityKind::TestSeries => (
            format!("{} Test Series", topic),
            799 + (seed as i64 * 50),
            json!({
                "tests": 10 + seed,
                "validityDays": 180,
            }),
        ),
        EntityKind::Note => (
            format!("{} Notes", topic),
            if seed % 4 == 0 { 0 } else { 199 + seed as i64 * 20 },
            json!({
                "pages": 40 + seed * 8,
                "format": "pdf",
            }),
        ),
        EntityKind::Video => (
            format!("{} Video Lecture", topic),
            if seed % 5 == 0 { 0 } else { 349 + seed as i64 * 30 },
            json!({
                "durationMinutes": 30 + seed * 5,
                "previewUrl": format!("https://cdn.dentica.in/previews/{}.mp4", slug),
            }),
        ),
    };

    CatalogEntity {
        id: Uuid::new_v4().to_string(),
        kind,
        slug: slug.clone(),
        title,
        description: Some(format!("{} for BDS and MDS aspirants.", topic)),
        price: Money::from_rupees(rupees),
        thumbnail: Some(format!("/images/{}/{}.jpg", kind.collection(), slug)),
        thumbnails: vec![
            format!("/images/{}/{}-1.jpg", kind.collection(), slug),
            format!("/images/{}/{}-2.jpg", kind.collection(), slug),
        ],
        category: Some(category.to_string()),
        details,
        is_published: seed % 10 != 9,
        created_at: now,
        updated_at: now,
    }
}

fn slugify(title: &str) -> String {
    title
        .to_ascii_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
