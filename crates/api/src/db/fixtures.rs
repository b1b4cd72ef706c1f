//! Row builders for repository tests.
//!
//! Each `#[sqlx::test]` gets a fresh database with the migrations applied;
//! these helpers fill it with the few rows a test needs.

#![allow(clippy::unwrap_used)]

use sqlx::PgPool;

use foodgram_core::image::DecodedImage;
use foodgram_core::recipe::{IngredientAmount, ValidatedRecipe};
use foodgram_core::{IngredientId, TagId, UserId};

pub async fn user(pool: &PgPool, username: &str) -> UserId {
    sqlx::query_scalar("INSERT INTO users (email, username) VALUES ($1, $2) RETURNING id")
        .bind(format!("{username}@example.com"))
        .bind(username)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn ingredient(pool: &PgPool, name: &str, unit: &str) -> IngredientId {
    sqlx::query_scalar(
        "INSERT INTO ingredient (name, measurement_unit) VALUES ($1, $2) RETURNING id",
    )
    .bind(name)
    .bind(unit)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// A tag named after its slug.
pub async fn tag(pool: &PgPool, slug: &str, color: &str) -> TagId {
    sqlx::query_scalar("INSERT INTO tag (name, color, slug) VALUES ($1, $2, $1) RETURNING id")
        .bind(slug)
        .bind(color)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn recipe(name: &str, tags: &[TagId], lines: &[(IngredientId, i32)]) -> ValidatedRecipe {
    ValidatedRecipe {
        name: name.to_owned(),
        text: format!("How to make {name}."),
        cooking_time: 30,
        image: DecodedImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            extension: "png".to_owned(),
        },
        tags: tags.to_vec(),
        ingredients: lines
            .iter()
            .map(|&(id, amount)| IngredientAmount { id, amount })
            .collect(),
    }
}

pub async fn count_rows(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}
