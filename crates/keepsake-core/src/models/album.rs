use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// The couple an album belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CoupleNames {
    #[serde(alias = "name1")]
    #[validate(custom(function = "non_blank", message = "First name is required"))]
    pub first: String,
    #[serde(alias = "name2")]
    #[validate(custom(function = "non_blank", message = "Second name is required"))]
    pub second: String,
}

/// Wedding album
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: Uuid,
    pub title: String,
    pub event_date: String,
    pub couple_names: CoupleNames,
    pub cover_image_ref: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request DTO for creating an album
///
/// Field aliases accept the payload shape older clients send
/// (`date`, `couple.name1`, `coverImage`).
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlbumRequest {
    #[validate(
        custom(function = "non_blank", message = "Title is required"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: String,
    #[serde(alias = "date")]
    #[validate(custom(function = "non_blank", message = "Event date is required"))]
    pub event_date: String,
    #[serde(alias = "couple")]
    #[validate(nested)]
    pub couple_names: CoupleNames,
    #[serde(default, alias = "coverImage")]
    pub cover_image_ref: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request DTO for a partial album update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlbumRequest {
    #[serde(default)]
    #[validate(
        custom(function = "non_blank", message = "Title cannot be empty"),
        length(max = 255, message = "Title must be at most 255 characters")
    )]
    pub title: Option<String>,
    #[serde(default, alias = "date")]
    #[validate(custom(function = "non_blank", message = "Event date cannot be empty"))]
    pub event_date: Option<String>,
    #[serde(default, alias = "couple")]
    #[validate(nested)]
    pub couple_names: Option<CoupleNames>,
    #[serde(default, alias = "coverImage")]
    pub cover_image_ref: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl UpdateAlbumRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.event_date.is_none()
            && self.couple_names.is_none()
            && self.cover_image_ref.is_none()
            && self.description.is_none()
    }
}

impl Album {
    /// Build a fresh album from a validated create request.
    pub fn new(request: CreateAlbumRequest) -> Self {
        let now = Utc::now();
        Album {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            event_date: request.event_date.trim().to_string(),
            couple_names: CoupleNames {
                first: request.couple_names.first.trim().to_string(),
                second: request.couple_names.second.trim().to_string(),
            },
            cover_image_ref: request.cover_image_ref,
            description: request.description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, update: UpdateAlbumRequest) {
        if let Some(title) = update.title {
            self.title = title.trim().to_string();
        }
        if let Some(event_date) = update.event_date {
            self.event_date = event_date.trim().to_string();
        }
        if let Some(couple) = update.couple_names {
            self.couple_names = CoupleNames {
                first: couple.first.trim().to_string(),
                second: couple.second.trim().to_string(),
            };
        }
        if let Some(cover) = update.cover_image_ref {
            self.cover_image_ref = Some(cover);
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
