//! Draft lifecycle
//!
//! `CREATED → UPLOADED → EDITED → FINALIZED`. Audio bytes never pass through
//! the server: clients upload to signed write URLs and the service only checks
//! that the object landed. Finalize turns the draft into an Episode.

use std::sync::Arc;

use castline_core::models::{
    CreateDraftRequest, CreatedDraft, Draft, DraftStatus, Episode, FinalizeMetadata, NewEpisode,
    Podcast, SignedUrlResponse,
};
use castline_core::{AppError, Config};
use castline_db::{DraftStore, EpisodeStore, PodcastStore};
use castline_storage::keys::{
    draft_edit_key, draft_edit_prefix, draft_original_key, episode_audio_key, validate_key,
};
use castline_storage::{SignedUrlIssuer, Storage};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::locks::KeyedLocks;

pub struct DraftService {
    podcasts: Arc<dyn PodcastStore>,
    drafts: Arc<dyn DraftStore>,
    episodes: Arc<dyn EpisodeStore>,
    storage: Arc<dyn Storage>,
    issuer: SignedUrlIssuer,
    allowed_content_types: Vec<String>,
    finalize_locks: KeyedLocks<Uuid>,
}

impl DraftService {
    pub fn new(
        podcasts: Arc<dyn PodcastStore>,
        drafts: Arc<dyn DraftStore>,
        episodes: Arc<dyn EpisodeStore>,
        storage: Arc<dyn Storage>,
        issuer: SignedUrlIssuer,
        allowed_content_types: Vec<String>,
    ) -> Self {
        Self {
            podcasts,
            drafts,
            episodes,
            storage,
            issuer,
            allowed_content_types,
            finalize_locks: KeyedLocks::new(),
        }
    }

    pub fn from_config(
        config: &Config,
        podcasts: Arc<dyn PodcastStore>,
        drafts: Arc<dyn DraftStore>,
        episodes: Arc<dyn EpisodeStore>,
        storage: Arc<dyn Storage>,
        issuer: SignedUrlIssuer,
    ) -> Self {
        Self::new(
            podcasts,
            drafts,
            episodes,
            storage,
            issuer,
            config.audio_allowed_content_types().to_vec(),
        )
    }

    #[tracing::instrument(skip(self, request), fields(podcast_id = %request.podcast_id))]
    pub async fn create(
        &self,
        requester: Uuid,
        request: CreateDraftRequest,
    ) -> Result<CreatedDraft, AppError> {
        let podcast = self.owned_podcast(requester, request.podcast_id).await?;
        let content_type = ensure_allowed_content_type(&self.allowed_content_types, &request.content_type)?;

        let draft_id = Uuid::new_v4();
        let object_path = draft_original_key(requester, draft_id, &content_type);
        let upload = self.issuer.upload_url(&object_path, &content_type).await?;

        let now = Utc::now();
        let draft = Draft {
            id: draft_id,
            owner_id: requester,
            podcast_id: podcast.id,
            original_object_path: object_path.clone(),
            edited_object_path: None,
            content_type,
            status: DraftStatus::Created,
            created_at: now,
            updated_at: now,
        };
        self.drafts.insert_draft(&draft).await?;

        tracing::info!(draft_id = %draft_id, "Draft created");

        Ok(CreatedDraft {
            draft_id,
            upload_url: upload.url,
            object_path,
            expires_at: upload.expires_at,
        })
    }

    /// The client finished its upload. Idempotent once `UPLOADED`.
    #[tracing::instrument(skip(self))]
    pub async fn confirm_upload(&self, requester: Uuid, draft_id: Uuid) -> Result<Draft, AppError> {
        let draft = self.owned_draft(requester, draft_id).await?;
        match draft.status {
            DraftStatus::Uploaded => return Ok(draft),
            status => status.ensure_can_advance_to(DraftStatus::Uploaded)?,
        }

        if !self.storage.exists(&draft.original_object_path).await? {
            return Err(AppError::InvalidInput(
                "Audio has not been uploaded yet".to_string(),
            ));
        }

        match self
            .drafts
            .advance_draft(draft_id, DraftStatus::Created, DraftStatus::Uploaded, None)
            .await?
        {
            Some(updated) => {
                tracing::info!(draft_id = %draft_id, "Draft audio uploaded");
                Ok(updated)
            }
            // Lost a race: fine if the winner also confirmed the upload
            None => {
                let current = self.owned_draft(requester, draft_id).await?;
                if current.status == DraftStatus::Uploaded {
                    Ok(current)
                } else {
                    Err(AppError::InvalidStateTransition {
                        from: current.status.to_string(),
                        to: DraftStatus::Uploaded.to_string(),
                    })
                }
            }
        }
    }

    /// Write URL for a re-edited version of the draft audio
    #[tracing::instrument(skip(self))]
    pub async fn begin_edit(
        &self,
        requester: Uuid,
        draft_id: Uuid,
    ) -> Result<SignedUrlResponse, AppError> {
        let draft = self.owned_draft(requester, draft_id).await?;
        ensure_has_audio(&draft, DraftStatus::Edited)?;

        let object_path =
            draft_edit_key(draft.owner_id, draft.id, Uuid::new_v4(), &draft.content_type);
        let upload = self
            .issuer
            .upload_url(&object_path, &draft.content_type)
            .await?;

        Ok(SignedUrlResponse {
            url: upload.url,
            object_path: Some(object_path),
            expires_at: upload.expires_at,
        })
    }

    /// Point the draft at an uploaded edit revision and drop the one it replaces
    #[tracing::instrument(skip(self))]
    pub async fn complete_edit(
        &self,
        requester: Uuid,
        draft_id: Uuid,
        object_path: &str,
    ) -> Result<Draft, AppError> {
        let draft = self.owned_draft(requester, draft_id).await?;
        ensure_has_audio(&draft, DraftStatus::Edited)?;

        validate_key(object_path)?;
        if !object_path.starts_with(&draft_edit_prefix(draft.owner_id, draft.id)) {
            return Err(AppError::InvalidInput(
                "Object path does not belong to this draft".to_string(),
            ));
        }
        if draft.edited_object_path.as_deref() == Some(object_path) {
            return Ok(draft);
        }
        if !self.storage.exists(object_path).await? {
            return Err(AppError::InvalidInput(
                "Edited audio has not been uploaded yet".to_string(),
            ));
        }

        let updated = self
            .drafts
            .advance_draft(
                draft_id,
                draft.status,
                DraftStatus::Edited,
                Some(object_path),
            )
            .await?
            .ok_or_else(|| AppError::InvalidStateTransition {
                from: draft.status.to_string(),
                to: DraftStatus::Edited.to_string(),
            })?;

        if let Some(previous) = &draft.edited_object_path {
            self.discard_object(previous).await;
        }

        tracing::info!(draft_id = %draft_id, "Draft edit recorded");
        Ok(updated)
    }

    /// Short-lived read URL for the most recent draft audio
    pub async fn preview_url(
        &self,
        requester: Uuid,
        draft_id: Uuid,
    ) -> Result<SignedUrlResponse, AppError> {
        let draft = self.owned_draft(requester, draft_id).await?;
        if !draft.status.has_audio() {
            return Err(AppError::InvalidInput(
                "Draft has no audio to preview yet".to_string(),
            ));
        }

        let path = draft.current_object_path();
        let signed = self.issuer.preview_url(path).await?;
        Ok(SignedUrlResponse {
            url: signed.url,
            object_path: Some(path.to_string()),
            expires_at: signed.expires_at,
        })
    }

    /// Turn the draft into an Episode.
    ///
    /// Either the Episode exists and the draft is gone, or nothing changed.
    /// Serialized per draft so a concurrent second call sees `AlreadyFinalized`.
    #[tracing::instrument(skip(self, metadata))]
    pub async fn finalize(
        &self,
        requester: Uuid,
        draft_id: Uuid,
        metadata: FinalizeMetadata,
    ) -> Result<Episode, AppError> {
        metadata.validate()?;

        let _guard = self.finalize_locks.lock(draft_id).await;

        let draft = self.owned_draft(requester, draft_id).await?;
        ensure_has_audio(&draft, DraftStatus::Finalized)?;

        let episode_id = Uuid::new_v4();
        let source = draft.current_object_path().to_string();
        let destination = episode_audio_key(
            draft.podcast_id,
            episode_id,
            Uuid::new_v4(),
            &draft.content_type,
        );

        // Draft untouched if this fails; the caller retries finalize
        self.storage.copy(&source, &destination).await.map_err(|e| {
            tracing::error!(error = %e, source = %source, "Failed to relocate draft audio");
            AppError::from(e)
        })?;

        let new_episode = NewEpisode {
            id: episode_id,
            podcast_id: draft.podcast_id,
            source_draft_id: draft.id,
            audio_object_path: destination.clone(),
            metadata,
        };

        let episode = match self.drafts.finalize_draft(draft.id, new_episode).await {
            Ok(Some(episode)) => episode,
            Ok(None) => {
                self.discard_object(&destination).await;
                return Err(AppError::AlreadyFinalized(draft_id));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist finalized episode");
                self.discard_object(&destination).await;
                return Err(e);
            }
        };

        self.discard_object(&draft.original_object_path).await;
        if let Some(edited) = &draft.edited_object_path {
            self.discard_object(edited).await;
        }

        tracing::info!(
            draft_id = %draft_id,
            episode_id = %episode.id,
            podcast_id = %episode.podcast_id,
            "Draft finalized"
        );
        Ok(episode)
    }

    async fn discard_object(&self, path: &str) {
        if let Err(e) = self.storage.delete(path).await {
            tracing::warn!(error = %e, storage_key = %path, "Failed to delete object");
        }
    }

    async fn owned_podcast(&self, requester: Uuid, podcast_id: Uuid) -> Result<Podcast, AppError> {
        let podcast = self
            .podcasts
            .get_podcast(podcast_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Podcast {}", podcast_id)))?;
        if !podcast.is_owned_by(requester) {
            return Err(AppError::OwnershipViolation(format!(
                "Podcast {} belongs to another user",
                podcast_id
            )));
        }
        Ok(podcast)
    }

    /// Load a draft the requester owns. A draft that was finalized reports so.
    async fn owned_draft(&self, requester: Uuid, draft_id: Uuid) -> Result<Draft, AppError> {
        let Some(draft) = self.drafts.get_draft(draft_id).await? else {
            return match self.episodes.find_by_source_draft(draft_id).await? {
                Some(episode) => {
                    self.owned_podcast(requester, episode.podcast_id).await?;
                    Err(AppError::AlreadyFinalized(draft_id))
                }
                None => Err(AppError::NotFound(format!("Draft {}", draft_id))),
            };
        };
        self.owned_podcast(requester, draft.podcast_id).await?;
        Ok(draft)
    }
}

fn ensure_has_audio(draft: &Draft, next: DraftStatus) -> Result<(), AppError> {
    if draft.status.has_audio() {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition {
            from: draft.status.to_string(),
            to: next.to_string(),
        })
    }
}

/// Normalize `content_type` and check it against the allow list
pub(crate) fn ensure_allowed_content_type(
    allowed: &[String],
    content_type: &str,
) -> Result<String, AppError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if allowed.iter().any(|a| a.eq_ignore_ascii_case(&essence)) {
        Ok(essence)
    } else {
        Err(AppError::InvalidInput(format!(
            "Content type '{}' is not an allowed audio type",
            content_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{allowed_content_types, finalize_metadata, seed_podcast, MemoryStorage};
    use async_trait::async_trait;
    use castline_db::InMemoryStore;
    use castline_storage::UrlTtls;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Harness {
        store: InMemoryStore,
        storage: Arc<MemoryStorage>,
        service: Arc<DraftService>,
        owner: Uuid,
        podcast_id: Uuid,
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        harness_with(store.clone(), Arc::new(store)).await
    }

    async fn harness_with(store: InMemoryStore, drafts: Arc<dyn DraftStore>) -> Harness {
        let storage = MemoryStorage::new();
        let owner = Uuid::new_v4();
        let podcast = seed_podcast(&store, owner).await;
        let service = DraftService::new(
            Arc::new(store.clone()),
            drafts,
            Arc::new(store.clone()),
            storage.clone(),
            SignedUrlIssuer::new(storage.clone(), UrlTtls::default()),
            allowed_content_types(),
        );
        Harness {
            store,
            storage,
            service: Arc::new(service),
            owner,
            podcast_id: podcast.id,
        }
    }

    impl Harness {
        /// A draft whose original audio has been uploaded and confirmed
        async fn uploaded_draft(&self) -> CreatedDraft {
            let created = self
                .service
                .create(
                    self.owner,
                    CreateDraftRequest {
                        podcast_id: self.podcast_id,
                        content_type: "audio/mpeg".to_string(),
                    },
                )
                .await
                .unwrap();
            self.storage.insert(&created.object_path, b"ID3 raw audio");
            self.service
                .confirm_upload(self.owner, created.draft_id)
                .await
                .unwrap();
            created
        }
    }

    #[tokio::test]
    async fn test_create_issues_upload_url_under_draft_prefix() {
        let h = harness().await;
        let created = h
            .service
            .create(
                h.owner,
                CreateDraftRequest {
                    podcast_id: h.podcast_id,
                    content_type: "audio/mpeg".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(
            created.object_path,
            format!("drafts/{}/{}/original.mp3", h.owner, created.draft_id)
        );
        assert!(created.upload_url.contains("method=PUT"));
        assert!(created.expires_at > Utc::now());

        let draft = h.store.get_draft(created.draft_id).await.unwrap().unwrap();
        assert_eq!(draft.status, DraftStatus::Created);
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_podcast_and_bad_content_type() {
        let h = harness().await;
        let err = h
            .service
            .create(
                Uuid::new_v4(),
                CreateDraftRequest {
                    podcast_id: h.podcast_id,
                    content_type: "audio/mpeg".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OwnershipViolation(_)));

        let err = h
            .service
            .create(
                h.owner,
                CreateDraftRequest {
                    podcast_id: h.podcast_id,
                    content_type: "video/mp4".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_confirm_upload_requires_object_and_is_idempotent() {
        let h = harness().await;
        let created = h
            .service
            .create(
                h.owner,
                CreateDraftRequest {
                    podcast_id: h.podcast_id,
                    content_type: "audio/mpeg".to_string(),
                },
            )
            .await
            .unwrap();

        let err = h
            .service
            .confirm_upload(h.owner, created.draft_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        h.storage.insert(&created.object_path, b"audio");
        let first = h.service.confirm_upload(h.owner, created.draft_id).await.unwrap();
        let second = h.service.confirm_upload(h.owner, created.draft_id).await.unwrap();
        assert_eq!(first.status, DraftStatus::Uploaded);
        assert_eq!(second.status, DraftStatus::Uploaded);
    }

    #[tokio::test]
    async fn test_edit_then_finalize_uses_edited_audio() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let edit = h.service.begin_edit(h.owner, created.draft_id).await.unwrap();
        let edited_path = edit.object_path.unwrap();
        assert!(edited_path.ends_with(".mp3"));
        h.storage.insert(&edited_path, b"edited audio");

        let draft = h
            .service
            .complete_edit(h.owner, created.draft_id, &edited_path)
            .await
            .unwrap();
        assert_eq!(draft.status, DraftStatus::Edited);

        let preview = h.service.preview_url(h.owner, created.draft_id).await.unwrap();
        assert_eq!(preview.object_path.as_deref(), Some(edited_path.as_str()));

        let episode = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap();

        let audio_path = episode.audio_object_path.clone().unwrap();
        assert!(audio_path.starts_with(&format!("episodes/{}/{}/", h.podcast_id, episode.id)));
        assert_eq!(
            h.storage.download(&audio_path).await.unwrap(),
            b"edited audio".to_vec()
        );
        assert!(!episode.is_published);

        // Draft and its objects are gone
        assert!(h.store.get_draft(created.draft_id).await.unwrap().is_none());
        assert!(!h.storage.contains(&created.object_path));
        assert!(!h.storage.contains(&edited_path));
    }

    #[tokio::test]
    async fn test_re_edit_never_overwrites_current_audio() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let first = h
            .service
            .begin_edit(h.owner, created.draft_id)
            .await
            .unwrap()
            .object_path
            .unwrap();
        h.storage.insert(&first, b"first edit");
        h.service
            .complete_edit(h.owner, created.draft_id, &first)
            .await
            .unwrap();

        let second = h
            .service
            .begin_edit(h.owner, created.draft_id)
            .await
            .unwrap()
            .object_path
            .unwrap();
        assert_ne!(first, second);

        // Not completed yet: the draft still previews the first edit
        h.storage.insert(&second, b"second edit");
        let preview = h.service.preview_url(h.owner, created.draft_id).await.unwrap();
        assert_eq!(preview.object_path.as_deref(), Some(first.as_str()));
        assert_eq!(h.storage.download(&first).await.unwrap(), b"first edit".to_vec());

        let draft = h
            .service
            .complete_edit(h.owner, created.draft_id, &second)
            .await
            .unwrap();
        assert_eq!(draft.edited_object_path.as_deref(), Some(second.as_str()));
        assert!(!h.storage.contains(&first));
    }

    #[tokio::test]
    async fn test_complete_edit_rejects_foreign_paths() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let err = h
            .service
            .complete_edit(h.owner, created.draft_id, &created.object_path)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_finalize_twice_is_already_finalized() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        h.service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap();
        let err = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot again"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::AlreadyFinalized(id) if id == created.draft_id));
        assert_eq!(h.store.episode_count(h.podcast_id), 1);
    }

    #[tokio::test]
    async fn test_concurrent_finalize_creates_one_episode() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let mut handles = Vec::new();
        for i in 0..5 {
            let service = h.service.clone();
            let owner = h.owner;
            let draft_id = created.draft_id;
            handles.push(tokio::spawn(async move {
                service
                    .finalize(owner, draft_id, finalize_metadata(&format!("Take {}", i)))
                    .await
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(e) => assert!(matches!(e, AppError::AlreadyFinalized(_))),
            }
        }
        assert_eq!(succeeded, 1);
        assert_eq!(h.store.episode_count(h.podcast_id), 1);
        assert_eq!(
            h.storage
                .keys_with_prefix(&format!("episodes/{}/", h.podcast_id))
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_finalize_by_non_owner_is_rejected() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let err = h
            .service
            .finalize(Uuid::new_v4(), created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OwnershipViolation(_)));
        assert_eq!(h.store.episode_count(h.podcast_id), 0);
    }

    #[tokio::test]
    async fn test_finalize_requires_uploaded_audio() {
        let h = harness().await;
        let created = h
            .service
            .create(
                h.owner,
                CreateDraftRequest {
                    podcast_id: h.podcast_id,
                    content_type: "audio/mpeg".to_string(),
                },
            )
            .await
            .unwrap();

        let err = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition { .. }));
    }

    #[tokio::test]
    async fn test_finalize_rejects_invalid_metadata() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        let err = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata(""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(h.store.get_draft(created.draft_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_draft_and_retry_succeeds() {
        let h = harness().await;
        let created = h.uploaded_draft().await;

        h.storage.fail_copy.store(true, Ordering::SeqCst);
        let err = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageUnavailable(_)));

        let draft = h.store.get_draft(created.draft_id).await.unwrap().unwrap();
        assert_eq!(draft.status, DraftStatus::Uploaded);
        assert!(h.storage.contains(&created.object_path));
        assert_eq!(h.store.episode_count(h.podcast_id), 0);

        h.storage.fail_copy.store(false, Ordering::SeqCst);
        h.service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap();
        assert_eq!(h.store.episode_count(h.podcast_id), 1);
    }

    /// Delegates to the in-memory store but can fail the finalize transaction
    struct FailingFinalize {
        inner: InMemoryStore,
        fail: AtomicBool,
    }

    #[async_trait]
    impl DraftStore for FailingFinalize {
        async fn insert_draft(&self, draft: &Draft) -> Result<(), AppError> {
            self.inner.insert_draft(draft).await
        }

        async fn get_draft(&self, id: Uuid) -> Result<Option<Draft>, AppError> {
            self.inner.get_draft(id).await
        }

        async fn advance_draft(
            &self,
            id: Uuid,
            expected: DraftStatus,
            next: DraftStatus,
            edited_object_path: Option<&str>,
        ) -> Result<Option<Draft>, AppError> {
            self.inner
                .advance_draft(id, expected, next, edited_object_path)
                .await
        }

        async fn finalize_draft(
            &self,
            draft_id: Uuid,
            episode: NewEpisode,
        ) -> Result<Option<Episode>, AppError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Internal("connection reset".to_string()));
            }
            self.inner.finalize_draft(draft_id, episode).await
        }
    }

    #[tokio::test]
    async fn test_store_failure_removes_relocated_copy() {
        let store = InMemoryStore::new();
        let h = harness_with(
            store.clone(),
            Arc::new(FailingFinalize {
                inner: store,
                fail: AtomicBool::new(true),
            }),
        )
        .await;
        let created = h.uploaded_draft().await;

        let err = h
            .service
            .finalize(h.owner, created.draft_id, finalize_metadata("Pilot"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));

        assert_eq!(h.storage.copies.load(Ordering::SeqCst), 1);
        assert!(h
            .storage
            .keys_with_prefix(&format!("episodes/{}/", h.podcast_id))
            .is_empty());
        assert!(h.storage.contains(&created.object_path));
        assert!(h.store.get_draft(created.draft_id).await.unwrap().is_some());
    }

    #[test]
    fn test_content_type_normalization() {
        let allowed = allowed_content_types();
        assert_eq!(
            ensure_allowed_content_type(&allowed, "Audio/MPEG; charset=binary").unwrap(),
            "audio/mpeg"
        );
        assert!(ensure_allowed_content_type(&allowed, "text/plain").is_err());
    }
}
