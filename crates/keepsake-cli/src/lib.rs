//! Shared helpers for the Keepsake maintenance binaries.
//!
//! Both binaries talk to Postgres directly through `keepsake-db`; set
//! `DATABASE_URL` before running them.

use anyhow::Context;
use keepsake_core::models::{CoupleNames, CreateAlbumRequest};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Albums inserted by `seed_albums` so a fresh install has something to show.
pub fn sample_albums() -> Vec<CreateAlbumRequest> {
    vec![
        CreateAlbumRequest {
            title: "Seda & Ömer Düğün Albümü".to_string(),
            event_date: "1 Nisan 2025".to_string(),
            couple_names: CoupleNames {
                first: "Seda".to_string(),
                second: "Ömer".to_string(),
            },
            cover_image_ref: None,
            description: Some(
                "Seda ve Ömer'in düğün gününden kareler. Misafirler fotoğraf ve videolarını buraya yükleyebilir."
                    .to_string(),
            ),
        },
        CreateAlbumRequest {
            title: "Ayşe & Mehmet Düğün Töreni".to_string(),
            event_date: "15 Haziran 2024".to_string(),
            couple_names: CoupleNames {
                first: "Ayşe".to_string(),
                second: "Mehmet".to_string(),
            },
            cover_image_ref: None,
            description: Some("Ayşe ve Mehmet'in düğün töreninden anılar.".to_string()),
        },
    ]
}

/// Connect to Postgres and bring the schema up to date.
pub async fn connect(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_exact() {
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
        assert_eq!(truncate_string("hello", 0), "...");
    }

    #[test]
    fn truncate_string_counts_characters() {
        assert_eq!(truncate_string("Düğün Albümü", 8), "Düğün...");
        assert_eq!(truncate_string("Ömer", 4), "Ömer");
    }

    #[test]
    fn sample_albums_are_complete() {
        let albums = sample_albums();
        assert_eq!(albums.len(), 2);
        for album in &albums {
            assert!(album.validate().is_ok(), "{} should validate", album.title);
        }
    }
}
