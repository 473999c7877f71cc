//! Shared key generation for storage backends.

use uuid::Uuid;

use crate::{StorageError, StorageResult};

/// File extension for an audio content type. Unknown types get `bin`.
pub fn extension_for(content_type: &str) -> &'static str {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/mp4" | "audio/x-m4a" | "audio/m4a" => "m4a",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        "audio/aac" => "aac",
        _ => "bin",
    }
}

/// `drafts/{owner_id}/{draft_id}/original.{ext}`
pub fn draft_original_key(owner_id: Uuid, draft_id: Uuid, content_type: &str) -> String {
    format!(
        "drafts/{}/{}/original.{}",
        owner_id,
        draft_id,
        extension_for(content_type)
    )
}

/// `drafts/{owner_id}/{draft_id}/edits/{revision}.{ext}`
///
/// Every edit gets its own revision so an upload never overwrites the audio
/// the draft currently points at.
pub fn draft_edit_key(
    owner_id: Uuid,
    draft_id: Uuid,
    revision: Uuid,
    content_type: &str,
) -> String {
    format!(
        "{}{}.{}",
        draft_edit_prefix(owner_id, draft_id),
        revision,
        extension_for(content_type)
    )
}

/// Prefix under which every edit revision of a draft lives
pub fn draft_edit_prefix(owner_id: Uuid, draft_id: Uuid) -> String {
    format!("drafts/{}/{}/edits/", owner_id, draft_id)
}

/// `episodes/{podcast_id}/{episode_id}/{revision}.{ext}`
pub fn episode_audio_key(
    podcast_id: Uuid,
    episode_id: Uuid,
    revision: Uuid,
    content_type: &str,
) -> String {
    format!(
        "episodes/{}/{}/{}.{}",
        podcast_id,
        episode_id,
        revision,
        extension_for(content_type)
    )
}

/// Prefix under which every revision of an episode's audio lives
pub fn episode_prefix(podcast_id: Uuid, episode_id: Uuid) -> String {
    format!("episodes/{}/{}/", podcast_id, episode_id)
}

/// Reject keys that could escape the storage root
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
