//! Catalog import commands.
//!
//! # Usage
//!
//! ```bash
//! foodgram import ingredients data/ingredients.json
//! foodgram import tags data/tags.json
//! ```
//!
//! Files are JSON arrays:
//!
//! ```json
//! [{"name": "flour", "measurement_unit": "g"}]
//! [{"name": "Breakfast", "color": "#E26C2D", "slug": "breakfast"}]
//! ```
//!
//! Imports are idempotent: rows that already exist are skipped. Every record
//! is validated before anything is written.

use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use foodgram_api::db::{IngredientRepository, TagRepository};
use foodgram_core::{HexColor, Slug};

use super::{CommandError, connect};

/// One entry of an ingredients file.
#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

/// One entry of a tags file.
#[derive(Debug, Deserialize)]
struct TagRecord {
    name: String,
    color: String,
    slug: String,
}

/// A tag that passed validation.
#[derive(Debug)]
struct NewTag {
    name: String,
    color: HexColor,
    slug: Slug,
}

/// Import ingredients from `file`.
///
/// # Errors
///
/// Returns `CommandError` if the file is unreadable or malformed, a record is
/// invalid, or the database rejects an insert.
pub async fn ingredients(file: &Path) -> Result<(), CommandError> {
    let records = parse_ingredients(&read(file)?, file)?;
    let (_, pool) = connect().await?;
    let repo = IngredientRepository::new(&pool);

    let mut inserted = 0_usize;
    for (name, unit) in &records {
        if repo.insert_if_absent(name, unit).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        total = records.len(),
        inserted,
        skipped = records.len() - inserted,
        "Ingredient import finished"
    );
    Ok(())
}

/// Import tags from `file`.
///
/// # Errors
///
/// Returns `CommandError` if the file is unreadable or malformed, a record is
/// invalid, or the database rejects an insert.
pub async fn tags(file: &Path) -> Result<(), CommandError> {
    let tags = parse_tags(&read(file)?, file)?;
    let (_, pool) = connect().await?;
    let repo = TagRepository::new(&pool);

    let mut inserted = 0_usize;
    for tag in &tags {
        if repo.insert_if_absent(&tag.name, &tag.color, &tag.slug).await? {
            inserted += 1;
        }
    }

    tracing::info!(
        total = tags.len(),
        inserted,
        skipped = tags.len() - inserted,
        "Tag import finished"
    );
    Ok(())
}

fn read(file: &Path) -> Result<String, CommandError> {
    std::fs::read_to_string(file).map_err(|source| CommandError::Read {
        path: file.display().to_string(),
        source,
    })
}

fn parse_records<T: DeserializeOwned>(raw: &str, file: &Path) -> Result<Vec<T>, CommandError> {
    serde_json::from_str(raw).map_err(|source| CommandError::Json {
        path: file.display().to_string(),
        source,
    })
}

fn required(index: usize, field: &str, value: &str) -> Result<String, CommandError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandError::InvalidRecord {
            index,
            reason: format!("{field} is empty"),
        });
    }
    Ok(value.to_owned())
}

fn parse_ingredients(raw: &str, file: &Path) -> Result<Vec<(String, String)>, CommandError> {
    parse_records::<IngredientRecord>(raw, file)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            Ok((
                required(index, "name", &record.name)?,
                required(index, "measurement_unit", &record.measurement_unit)?,
            ))
        })
        .collect()
}

fn parse_tags(raw: &str, file: &Path) -> Result<Vec<NewTag>, CommandError> {
    parse_records::<TagRecord>(raw, file)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let invalid = |reason: String| CommandError::InvalidRecord { index, reason };
            Ok(NewTag {
                name: required(index, "name", &record.name)?,
                color: HexColor::parse(&record.color).map_err(|e| invalid(e.to_string()))?,
                slug: Slug::parse(&record.slug).map_err(|e| invalid(e.to_string()))?,
            })
        })
        .collect()
}
