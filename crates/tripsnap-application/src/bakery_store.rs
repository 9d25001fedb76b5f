//! Bakery detail modal plus the id → detail cache behind it.

use crate::bakery_cache::BakeryCache;
use crate::generation::RequestGeneration;
use crate::payload::{from_envelope, list_from_envelope};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tripsnap_core::endpoints;
use tripsnap_core::model::{Bakery, Comment, LikeState};
use tripsnap_core::{ApiRequest, ApiTransport, Result, TripsnapError, request_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Bypass the cache and re-fetch the detail.
    pub force_refresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub load_comments: bool,
    pub force_refresh: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            load_comments: true,
            force_refresh: false,
        }
    }
}

/// What the bakery modal renders.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BakeryModalState {
    pub open: bool,
    pub bakery: Option<Bakery>,
    pub comments: Vec<Comment>,
    pub loading: bool,
    pub error: Option<String>,
}

impl BakeryModalState {
    fn bakery_id(&self) -> Option<i64> {
        self.bakery.as_ref().map(|bakery| bakery.id)
    }
}

pub struct BakeryStore {
    transport: Arc<dyn ApiTransport>,
    cache: BakeryCache,
    modal: RwLock<BakeryModalState>,
    modal_generation: RequestGeneration,
}

impl BakeryStore {
    pub fn new(transport: Arc<dyn ApiTransport>, cache_capacity: usize) -> Self {
        Self {
            transport,
            cache: BakeryCache::new(cache_capacity),
            modal: RwLock::new(BakeryModalState::default()),
            modal_generation: RequestGeneration::new(),
        }
    }

    pub async fn modal(&self) -> BakeryModalState {
        self.modal.read().await.clone()
    }

    /// Cached record for `id`, refreshing its recency.
    pub async fn cached(&self, id: i64) -> Option<Bakery> {
        self.cache.get(id).await
    }

    pub fn cache(&self) -> &BakeryCache {
        &self.cache
    }

    /// Read-through detail lookup.
    ///
    /// # Arguments
    ///
    /// * `id` - Bakery id
    /// * `options` - `force_refresh` skips the cache
    ///
    /// # Returns
    ///
    /// The cached record, or the freshly fetched one after it was merged into
    /// the cache.
    pub async fn fetch_bakery_detail(&self, id: i64, options: FetchOptions) -> Result<Bakery> {
        if !options.force_refresh {
            if let Some(bakery) = self.cache.get(id).await {
                tracing::debug!("[BakeryStore] Cache hit for bakery {}", id);
                return Ok(bakery);
            }
        }

        let body: Value =
            request_json(&*self.transport, ApiRequest::get(endpoints::bakery_detail(id))).await?;
        let fresh: Bakery = from_envelope(body, "bakery")?;
        Ok(self.cache.merge_insert(fresh).await)
    }

    /// Resolves the detail, then opens the modal on it.
    ///
    /// A failed fetch leaves the modal closed. When another open starts while
    /// this one is in flight, the later one wins.
    pub async fn open_modal_by_id(&self, id: i64, options: OpenOptions) -> Result<()> {
        let ticket = self.modal_generation.begin();
        {
            let mut modal = self.modal.write().await;
            modal.loading = true;
            modal.error = None;
        }

        let fetch = FetchOptions {
            force_refresh: options.force_refresh,
        };
        let bakery = match self.fetch_bakery_detail(id, fetch).await {
            Ok(bakery) => bakery,
            Err(e) => {
                tracing::warn!("[BakeryStore] Failed to open bakery {}: {}", id, e);
                if self.modal_generation.is_current(ticket) {
                    *self.modal.write().await = BakeryModalState {
                        error: Some(e.user_message()),
                        ..BakeryModalState::default()
                    };
                }
                return Err(e);
            }
        };

        self.show(ticket, bakery, options.load_comments).await;
        Ok(())
    }

    /// Opens the modal on an already known, possibly partial, record.
    ///
    /// The record is merged into the cache first. Without coordinates and an
    /// address (or with `force_refresh`) the full detail is fetched before
    /// the modal opens.
    pub async fn open_modal(&self, bakery: Bakery, options: OpenOptions) -> Result<()> {
        let merged = self.cache.merge_insert(bakery).await;

        if options.force_refresh || !merged.has_location() {
            tracing::debug!(
                "[BakeryStore] Bakery {} lacks location data, fetching detail",
                merged.id
            );
            return self
                .open_modal_by_id(
                    merged.id,
                    OpenOptions {
                        force_refresh: true,
                        ..options
                    },
                )
                .await;
        }

        let ticket = self.modal_generation.begin();
        self.show(ticket, merged, options.load_comments).await;
        Ok(())
    }

    async fn show(&self, ticket: u64, bakery: Bakery, load_comments: bool) {
        {
            let mut modal = self.modal.write().await;
            if !self.modal_generation.is_current(ticket) {
                tracing::debug!("[BakeryStore] Discarding superseded open of bakery {}", bakery.id);
                return;
            }
            *modal = BakeryModalState {
                open: true,
                bakery: Some(bakery),
                ..BakeryModalState::default()
            };
        }

        if load_comments {
            if let Err(e) = self.load_comments().await {
                tracing::warn!("[BakeryStore] Failed to load comments: {}", e);
            }
        }
    }

    /// Replaces the open bakery's comment list.
    pub async fn load_comments(&self) -> Result<()> {
        let Some(id) = self.modal.read().await.bakery_id() else {
            return Ok(());
        };

        let result = async {
            let body: Value =
                request_json(&*self.transport, ApiRequest::get(endpoints::bakery_comments(id)))
                    .await?;
            list_from_envelope::<Comment>(body, "comments")
        }
        .await;

        let mut modal = self.modal.write().await;
        if modal.bakery_id() != Some(id) {
            return Ok(());
        }
        match result {
            Ok(comments) => {
                modal.comments = comments;
                Ok(())
            }
            Err(e) => {
                modal.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Toggles the like of the open bakery; the modal and the cache are
    /// updated together.
    pub async fn toggle_like(&self) -> Result<LikeState> {
        let id = self.open_bakery_id().await?;

        let body: Value =
            request_json(&*self.transport, ApiRequest::post(endpoints::bakery_like(id))).await?;
        let like: LikeState = serde_json::from_value(body)?;

        let apply = |bakery: &mut Bakery| {
            bakery.is_liked = Some(like.is_liked);
            bakery.like_count = Some(like.like_count);
        };
        self.update_open(id, apply).await;
        self.cache.update(id, apply).await;

        Ok(like)
    }

    /// Posts a comment on the open bakery.
    pub async fn submit_comment(&self, text: &str) -> Result<Comment> {
        let content = text.trim();
        if content.is_empty() {
            return Err(TripsnapError::validation("Please enter a comment."));
        }
        let id = self.open_bakery_id().await?;

        let request =
            ApiRequest::post(endpoints::bakery_comment_create(id)).json(json!({ "content": content }));
        let body: Value = request_json(&*self.transport, request).await?;
        let reported_count = body.get("comment_count").and_then(Value::as_u64);
        let comment: Comment = from_envelope(body, "comment")?;

        let listed_count = {
            let mut modal = self.modal.write().await;
            if modal.bakery_id() == Some(id) {
                modal.comments.push(comment.clone());
                Some(modal.comments.len() as u64)
            } else {
                None
            }
        };

        match reported_count.or(listed_count) {
            Some(count) => {
                let apply = |bakery: &mut Bakery| bakery.comment_count = Some(count);
                self.update_open(id, apply).await;
                self.cache.update(id, apply).await;
            }
            // The modal moved on; its comment list belongs to another bakery.
            None => {
                self.cache
                    .update(id, |bakery| {
                        bakery.comment_count = Some(bakery.comment_count.unwrap_or(0) + 1)
                    })
                    .await;
            }
        }

        Ok(comment)
    }

    /// Deletes one of the open bakery's comments.
    pub async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        let id = self.open_bakery_id().await?;

        self.transport
            .request(ApiRequest::delete(endpoints::bakery_comment_delete(id, comment_id)))
            .await?
            .error_for_status()?;

        {
            let mut modal = self.modal.write().await;
            if modal.bakery_id() == Some(id) {
                modal.comments.retain(|comment| comment.id != comment_id);
            }
        }

        let apply = |bakery: &mut Bakery| {
            bakery.comment_count = bakery.comment_count.map(|count| count.saturating_sub(1));
        };
        self.update_open(id, apply).await;
        self.cache.update(id, apply).await;
        Ok(())
    }

    /// Closes the modal. The cache is kept so re-opening is cheap.
    pub async fn close_modal(&self) {
        self.modal_generation.invalidate();
        *self.modal.write().await = BakeryModalState::default();
    }

    /// Lists or searches bakeries; every partial record is merged into the cache.
    pub async fn list_bakeries(&self, query: Option<&str>) -> Result<Vec<Bakery>> {
        let mut request = ApiRequest::get(endpoints::BAKERY_LIST);
        if let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) {
            request = request.query("q", query);
        }

        let body: Value = request_json(&*self.transport, request).await?;
        let bakeries: Vec<Bakery> = list_from_envelope(body, "results")?;
        for bakery in &bakeries {
            self.cache.merge_insert(bakery.clone()).await;
        }

        tracing::debug!("[BakeryStore] Listed {} bakeries", bakeries.len());
        Ok(bakeries)
    }

    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    async fn open_bakery_id(&self) -> Result<i64> {
        self.modal
            .read()
            .await
            .bakery_id()
            .ok_or_else(|| TripsnapError::validation("No bakery is open."))
    }

    async fn update_open<F>(&self, id: i64, update: F)
    where
        F: FnOnce(&mut Bakery),
    {
        let mut modal = self.modal.write().await;
        if let Some(bakery) = modal.bakery.as_mut().filter(|bakery| bakery.id == id) {
            update(bakery);
        }
    }
}
