use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::AppError;

/// Lifecycle state of a draft. Ordering follows the lifecycle.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DraftStatus {
    Created,
    Uploaded,
    Edited,
    Finalized,
}

impl DraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftStatus::Created => "CREATED",
            DraftStatus::Uploaded => "UPLOADED",
            DraftStatus::Edited => "EDITED",
            DraftStatus::Finalized => "FINALIZED",
        }
    }

    /// Status only moves forward; `Edited -> Edited` is a re-edit.
    pub fn can_advance_to(&self, next: DraftStatus) -> bool {
        next > *self || (*self == DraftStatus::Edited && next == DraftStatus::Edited)
    }

    /// Reject a transition that would not move the draft forward
    pub fn ensure_can_advance_to(&self, next: DraftStatus) -> Result<(), AppError> {
        if self.can_advance_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidStateTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }

    /// Finalize and re-edit both need audio in storage
    pub fn has_audio(&self) -> bool {
        matches!(self, DraftStatus::Uploaded | DraftStatus::Edited)
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(DraftStatus::Created),
            "UPLOADED" => Ok(DraftStatus::Uploaded),
            "EDITED" => Ok(DraftStatus::Edited),
            "FINALIZED" => Ok(DraftStatus::Finalized),
            other => Err(AppError::Internal(format!(
                "Unknown draft status: {}",
                other
            ))),
        }
    }
}

/// Pre-publication audio tied to one podcast
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Draft {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub podcast_id: Uuid,
    pub original_object_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_object_path: Option<String>,
    pub content_type: String,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Draft {
    /// Most recent audio object: the edit when one was recorded, else the original
    pub fn current_object_path(&self) -> &str {
        self.edited_object_path
            .as_deref()
            .unwrap_or(&self.original_object_path)
    }
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateDraftRequest {
    pub podcast_id: Uuid,
    /// Audio MIME type the client will upload
    #[validate(length(
        min = 1,
        max = 255,
        message = "Content type must be between 1 and 255 characters"
    ))]
    pub content_type: String,
}

/// Returned when a draft is created
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedDraft {
    pub draft_id: Uuid,
    /// Signed write URL; the client PUTs the audio bytes here
    pub upload_url: String,
    pub object_path: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CompleteEditRequest {
    /// Object path returned by the edit call
    #[validate(length(min = 1, max = 1024))]
    pub object_path: String,
}

/// A signed URL together with its expiry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SignedUrlResponse {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_path: Option<String>,
    pub expires_at: DateTime<Utc>,
}
