//! Profile store: the loaded profile, its posts, and the modals layered on
//! top of them.
//!
//! Each modal is an `Option`/flag rather than a stack, so at most one of each
//! kind is open at a time. The post list and the post-modal copy of a post
//! are independent values; every mutation updates both.

use crate::generation::RequestGeneration;
use crate::payload::{from_envelope, list_from_envelope, reported_failure};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tripsnap_core::data_url;
use tripsnap_core::endpoints;
use tripsnap_core::model::{
    Comment, FollowListKind, FollowListResponse, FollowToggleResponse, FollowUser,
    FollowVisibility, LikeState, NewPost, Post, Profile, ProfilePayload, SearchResults,
};
use tripsnap_core::{ApiRequest, ApiTransport, Result, TripsnapError, request_json};

/// Shown when the owner's follow visibility hides the list.
pub const PRIVATE_LIST_MESSAGE: &str = "This user's list is private.";
/// Shown when the list could not be loaded for any other reason.
pub const FOLLOW_LIST_ERROR_MESSAGE: &str = "Could not load the list. Please try again.";
/// Quiet period before an autocomplete query is sent.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostModal {
    pub post: Post,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowModal {
    pub kind: FollowListKind,
    pub nickname: String,
    pub users: Vec<FollowUser>,
    /// Denial or failure message; exclusive with a non-empty `users`.
    pub message: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ProfileState {
    pub profile: Option<Profile>,
    pub posts: Vec<Post>,
    pub loading: bool,
    pub error: Option<String>,
    pub post_modal: Option<PostModal>,
    pub image_modal_open: bool,
    pub create_modal_open: bool,
    pub follow_modal: Option<FollowModal>,
    pub search_results: SearchResults,
    pub follow_visibility: Option<FollowVisibility>,
}

impl ProfileState {
    fn modal_post_id(&self) -> Option<i64> {
        self.post_modal.as_ref().map(|modal| modal.post.id)
    }

    /// Applies `update` to the list entry and to the modal copy of `post_id`.
    fn update_post<F>(&mut self, post_id: i64, mut update: F)
    where
        F: FnMut(&mut Post),
    {
        if let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) {
            update(post);
        }
        if let Some(modal) = self.post_modal.as_mut().filter(|m| m.post.id == post_id) {
            update(&mut modal.post);
        }
    }
}

pub struct ProfileStore {
    transport: Arc<dyn ApiTransport>,
    state: RwLock<ProfileState>,
    profile_generation: RequestGeneration,
    follow_generation: RequestGeneration,
    search_generation: RequestGeneration,
}

impl ProfileStore {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            state: RwLock::new(ProfileState::default()),
            profile_generation: RequestGeneration::new(),
            follow_generation: RequestGeneration::new(),
            search_generation: RequestGeneration::new(),
        }
    }

    pub async fn snapshot(&self) -> ProfileState {
        self.state.read().await.clone()
    }

    pub async fn profile(&self) -> Option<Profile> {
        self.state.read().await.profile.clone()
    }

    pub async fn posts(&self) -> Vec<Post> {
        self.state.read().await.posts.clone()
    }

    // ============================================================================
    // Profile loading
    // ============================================================================

    pub async fn load_my_profile(&self) -> Result<()> {
        self.load(ApiRequest::get(endpoints::MY_PROFILE)).await
    }

    pub async fn load_profile_by_nickname(&self, nickname: &str) -> Result<()> {
        self.load(ApiRequest::get(endpoints::profile(nickname))).await
    }

    /// Replaces profile and posts wholesale, unless a newer load was issued
    /// (or the store was reset) while this one was in flight.
    async fn load(&self, request: ApiRequest) -> Result<()> {
        let ticket = self.profile_generation.begin();
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }

        let path = request.path.clone();
        let result = request_json::<ProfilePayload>(&*self.transport, request).await;

        let mut state = self.state.write().await;
        if !self.profile_generation.is_current(ticket) {
            tracing::debug!("[ProfileStore] Discarding stale response for {}", path);
            return result.map(|_| ());
        }
        state.loading = false;

        match result {
            Ok(payload) => {
                tracing::debug!(
                    "[ProfileStore] Loaded {} with {} posts",
                    payload.profile.nickname,
                    payload.posts.len()
                );
                if payload.profile.is_owner {
                    state.follow_visibility = Some(payload.profile.follow_visibility);
                }
                state.profile = Some(payload.profile);
                state.posts = payload.posts;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[ProfileStore] Failed to load {}: {}", path, e);
                state.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Restores every profile-scoped field to its default.
    ///
    /// In-flight loads, follow lists and searches are superseded so they
    /// cannot repopulate the store afterwards.
    pub async fn reset_profile(&self) {
        self.profile_generation.invalidate();
        self.follow_generation.invalidate();
        self.search_generation.invalidate();
        *self.state.write().await = ProfileState::default();
    }

    // ============================================================================
    // Follow & like
    // ============================================================================

    /// Toggles following `nickname`.
    ///
    /// `success: false` in the response is an error even on a 2xx status.
    pub async fn toggle_follow(&self, nickname: &str) -> Result<FollowToggleResponse> {
        let body: Value = request_json(
            &*self.transport,
            ApiRequest::post(endpoints::follow_toggle(nickname)),
        )
        .await?;
        let response: FollowToggleResponse = serde_json::from_value(body)?;

        if response.success == Some(false) {
            let message = response
                .error
                .clone()
                .unwrap_or_else(|| "Could not update follow status.".to_string());
            return Err(TripsnapError::api(200, message));
        }

        let mut state = self.state.write().await;
        if let Some(profile) = state.profile.as_mut().filter(|p| p.nickname == nickname) {
            profile.is_following = response.is_following;
            profile.follower_count = response.follower_count;
        }
        Ok(response)
    }

    pub async fn toggle_like(&self, post_id: i64) -> Result<LikeState> {
        let body: Value =
            request_json(&*self.transport, ApiRequest::post(endpoints::post_like(post_id))).await?;
        let like: LikeState = serde_json::from_value(body)?;

        self.state
            .write()
            .await
            .update_post(post_id, |post| post.apply_like(like));
        Ok(like)
    }

    // ============================================================================
    // Posts
    // ============================================================================

    /// Creates a post, prepends it to the list and closes the create modal.
    ///
    /// # Arguments
    ///
    /// * `new_post` - Title and content must be non-blank; images are data URLs
    ///
    /// # Returns
    ///
    /// The created post, tagged as owned.
    pub async fn create_post(&self, new_post: NewPost) -> Result<Post> {
        let title = new_post.title.trim();
        let content = new_post.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(TripsnapError::validation("Please enter a title and content."));
        }

        let request = ApiRequest::post(endpoints::POST_CREATE).json(json!({
            "title": title,
            "content": content,
            "images": new_post.images,
            "image_base64": new_post.images.first(),
        }));
        let body: Value = request_json(&*self.transport, request).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        let mut post: Post = from_envelope(body, "post")?;
        post.is_owner = true;

        let mut state = self.state.write().await;
        state.posts.insert(0, post.clone());
        state.create_modal_open = false;

        tracing::info!("[ProfileStore] Created post {}", post.id);
        Ok(post)
    }

    pub async fn update_post(&self, post_id: i64, title: &str, content: &str) -> Result<()> {
        let title = title.trim();
        let content = content.trim();
        if title.is_empty() {
            return Err(TripsnapError::validation("Please enter a title."));
        }

        let request = ApiRequest::post(endpoints::post_update(post_id))
            .json(json!({ "title": title, "content": content }));
        let body: Value = request_json(&*self.transport, request).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        let saved = body.get("post");
        let text = |key: &str, fallback: &str| {
            saved
                .and_then(|post| post.get(key))
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };
        let (title, content) = (text("title", title), text("content", content));

        self.state.write().await.update_post(post_id, |post| {
            post.title = title.clone();
            post.content = content.clone();
        });
        Ok(())
    }

    /// Deletes a post; closes the post modal if it was showing that post.
    pub async fn delete_post(&self, post_id: i64) -> Result<()> {
        let body: Value =
            request_json(&*self.transport, ApiRequest::post(endpoints::post_delete(post_id)))
                .await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        let mut state = self.state.write().await;
        state.posts.retain(|post| post.id != post_id);
        if state.modal_post_id() == Some(post_id) {
            state.post_modal = None;
        }
        Ok(())
    }

    // ============================================================================
    // Post modal & comments
    // ============================================================================

    /// Opens the post modal on a copy of `post` and reloads its comments.
    pub async fn open_post_modal(&self, post: Post) -> Result<()> {
        let post_id = post.id;
        self.state.write().await.post_modal = Some(PostModal {
            post,
            comments: Vec::new(),
        });
        self.load_comments(post_id).await.map(|_| ())
    }

    pub async fn close_post_modal(&self) {
        self.state.write().await.post_modal = None;
    }

    /// Fetches the comments of `post_id` and, if its modal is still open,
    /// replaces the modal's list.
    pub async fn load_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let body: Value =
            request_json(&*self.transport, ApiRequest::get(endpoints::post_comments(post_id)))
                .await?;
        let comments: Vec<Comment> = list_from_envelope(body, "comments")?;

        let mut state = self.state.write().await;
        if let Some(modal) = state.post_modal.as_mut().filter(|m| m.post.id == post_id) {
            modal.comments = comments.clone();
        }
        Ok(comments)
    }

    /// Posts a comment. Blank content is rejected without a request.
    ///
    /// The server answers either the new comment (appended) or the full list
    /// (replacing the modal's list).
    pub async fn submit_comment(&self, post_id: i64, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TripsnapError::validation("Please enter a comment."));
        }

        let request =
            ApiRequest::post(endpoints::post_comments(post_id)).json(json!({ "content": content }));
        let body: Value = request_json(&*self.transport, request).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        let full_list = body.get("comments").is_some_and(Value::is_array);
        let mut state = self.state.write().await;
        let Some(modal) = state.post_modal.as_mut().filter(|m| m.post.id == post_id) else {
            return Ok(());
        };
        if full_list {
            modal.comments = list_from_envelope(body, "comments")?;
        } else {
            modal.comments.push(from_envelope(body, "comment")?);
        }
        Ok(())
    }

    pub async fn update_comment(&self, comment_id: i64, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TripsnapError::validation("Please enter a comment."));
        }

        let request = ApiRequest::post(endpoints::comment_update(comment_id))
            .json(json!({ "content": content }));
        let body: Value = request_json(&*self.transport, request).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }
        let saved = body
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or(content)
            .to_string();

        let mut state = self.state.write().await;
        if let Some(modal) = state.post_modal.as_mut() {
            if let Some(comment) = modal.comments.iter_mut().find(|c| c.id == comment_id) {
                comment.content = saved;
            }
        }
        Ok(())
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        let body: Value = request_json(
            &*self.transport,
            ApiRequest::post(endpoints::comment_delete(comment_id)),
        )
        .await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }

        let mut state = self.state.write().await;
        if let Some(modal) = state.post_modal.as_mut() {
            modal.comments.retain(|comment| comment.id != comment_id);
        }
        Ok(())
    }

    // ============================================================================
    // Profile image
    // ============================================================================

    pub async fn open_image_modal(&self) {
        self.state.write().await.image_modal_open = true;
    }

    pub async fn close_image_modal(&self) {
        self.state.write().await.image_modal_open = false;
    }

    /// Uploads a `data:image/...;base64,` payload as the profile picture.
    ///
    /// # Returns
    ///
    /// The new image URL with a `t=<millis>` cache-busting parameter, which
    /// is also stored on the loaded profile.
    pub async fn upload_profile_image_base64(&self, payload: &str) -> Result<String> {
        if !data_url::is_image(payload) {
            return Err(TripsnapError::validation(
                "Expected an image encoded as data:<mime>;base64,<data>.",
            ));
        }

        let request = ApiRequest::post(endpoints::PROFILE_IMAGE).json(json!({ "image": payload }));
        let body: Value = request_json(&*self.transport, request).await?;
        if let Some(message) = reported_failure(&body) {
            return Err(TripsnapError::api(200, message));
        }
        let image_url = body
            .get("image_url")
            .and_then(Value::as_str)
            .ok_or_else(|| TripsnapError::api(200, "The server did not return an image URL."))?;

        let busted = cache_busted(image_url, chrono::Utc::now().timestamp_millis());
        let mut state = self.state.write().await;
        if let Some(profile) = state.profile.as_mut() {
            profile.profile_img = Some(busted.clone());
        }
        state.image_modal_open = false;

        tracing::info!("[ProfileStore] Profile image updated");
        Ok(busted)
    }

    // ============================================================================
    // Create modal
    // ============================================================================

    /// Opens the create-post modal; any active post modal is closed.
    pub async fn open_create_modal(&self) {
        let mut state = self.state.write().await;
        state.post_modal = None;
        state.create_modal_open = true;
    }

    pub async fn close_create_modal(&self) {
        self.state.write().await.create_modal_open = false;
    }

    // ============================================================================
    // Follow-list modal
    // ============================================================================

    /// Opens the follower/following list of `nickname`, defaulting to the
    /// loaded profile.
    ///
    /// A 403 or a `private` body is a policy denial: the modal shows
    /// [`PRIVATE_LIST_MESSAGE`] (or the server's text) and this returns `Ok`.
    /// Other failures show [`FOLLOW_LIST_ERROR_MESSAGE`] and return the error.
    pub async fn open_follow_modal(&self, kind: FollowListKind, nickname: Option<&str>) -> Result<()> {
        let nickname = match nickname {
            Some(nickname) => nickname.to_string(),
            None => self
                .profile()
                .await
                .map(|profile| profile.nickname)
                .ok_or_else(|| TripsnapError::validation("No profile is loaded."))?,
        };

        let ticket = self.follow_generation.begin();
        self.state.write().await.follow_modal = Some(FollowModal {
            kind,
            nickname: nickname.clone(),
            users: Vec::new(),
            message: None,
            loading: true,
        });

        let path = match kind {
            FollowListKind::Followers => endpoints::followers(&nickname),
            FollowListKind::Followings => endpoints::followings(&nickname),
        };
        let outcome = self.fetch_follow_list(ApiRequest::get(path)).await;

        let mut state = self.state.write().await;
        if !self.follow_generation.is_current(ticket) {
            return Ok(());
        }
        let Some(modal) = state.follow_modal.as_mut() else {
            return Ok(());
        };
        modal.loading = false;

        match outcome {
            Ok(FollowListOutcome::Users(users)) => {
                modal.users = users;
                Ok(())
            }
            Ok(FollowListOutcome::Denied(message)) => {
                tracing::debug!("[ProfileStore] {} of {} is hidden", kind, nickname);
                modal.message = Some(message);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[ProfileStore] Failed to load {} of {}: {}", kind, nickname, e);
                modal.message = Some(FOLLOW_LIST_ERROR_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_follow_list(&self, request: ApiRequest) -> Result<FollowListOutcome> {
        let response = self.transport.request(request).await?;
        if response.status == 403 {
            let message = response
                .field("detail")
                .and_then(Value::as_str)
                .unwrap_or(PRIVATE_LIST_MESSAGE)
                .to_string();
            return Ok(FollowListOutcome::Denied(message));
        }

        let list: FollowListResponse = response.error_for_status()?.into_json()?;
        if list.private {
            let message = list.detail.unwrap_or_else(|| PRIVATE_LIST_MESSAGE.to_string());
            return Ok(FollowListOutcome::Denied(message));
        }
        Ok(FollowListOutcome::Users(list.users))
    }

    pub async fn close_follow_modal(&self) {
        self.follow_generation.invalidate();
        self.state.write().await.follow_modal = None;
    }

    // ============================================================================
    // Search & settings
    // ============================================================================

    /// Combined user and bakery search. A blank query clears the results.
    pub async fn search_users_and_bakeries(&self, query: &str) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            self.search_generation.invalidate();
            self.state.write().await.search_results = SearchResults::default();
            return Ok(SearchResults::default());
        }

        let ticket = self.search_generation.begin();
        let results: SearchResults = request_json(
            &*self.transport,
            ApiRequest::get(endpoints::SEARCH).query("q", query),
        )
        .await?;

        if self.search_generation.is_current(ticket) {
            self.state.write().await.search_results = results.clone();
        }
        Ok(results)
    }

    /// Autocomplete entry point: waits `delay` and sends the query only if
    /// no later search was issued meanwhile.
    ///
    /// Returns `None` when superseded. A blank query clears immediately.
    pub async fn search_debounced(
        &self,
        query: &str,
        delay: Duration,
    ) -> Result<Option<SearchResults>> {
        if query.trim().is_empty() {
            return self.search_users_and_bakeries(query).await.map(Some);
        }

        let ticket = self.search_generation.begin();
        tokio::time::sleep(delay).await;
        if !self.search_generation.is_current(ticket) {
            return Ok(None);
        }
        self.search_users_and_bakeries(query).await.map(Some)
    }

    pub async fn load_follow_visibility(&self) -> Result<FollowVisibility> {
        let body: Value =
            request_json(&*self.transport, ApiRequest::get(endpoints::FOLLOW_VISIBILITY)).await?;
        let visibility = parse_visibility(&body)?;
        self.store_visibility(visibility).await;
        Ok(visibility)
    }

    /// Saves the follow-list visibility; always sent in canonical form.
    pub async fn update_follow_visibility(&self, visibility: FollowVisibility) -> Result<FollowVisibility> {
        let request = ApiRequest::post(endpoints::FOLLOW_VISIBILITY)
            .json(json!({ "follow_visibility": visibility }));
        let body: Value = request_json(&*self.transport, request).await?;
        let saved = parse_visibility(&body).unwrap_or(visibility);
        self.store_visibility(saved).await;
        Ok(saved)
    }

    async fn store_visibility(&self, visibility: FollowVisibility) {
        let mut state = self.state.write().await;
        state.follow_visibility = Some(visibility);
        if let Some(profile) = state.profile.as_mut().filter(|p| p.is_owner) {
            profile.follow_visibility = visibility;
        }
    }
}

enum FollowListOutcome {
    Users(Vec<FollowUser>),
    Denied(String),
}

fn parse_visibility(body: &Value) -> Result<FollowVisibility> {
    let value = body.get("follow_visibility").cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

/// Appends `t=<millis>` so a replaced image is not served from cache.
fn cache_busted(url: &str, millis: i64) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}t={millis}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockTransport;
    use tripsnap_core::{Method, RequestBody};

    fn post(id: i64, title: &str) -> Value {
        json!({"id": id, "title": title, "content": "body", "like_count": 2, "is_liked": false})
    }

    fn payload(nickname: &str, post_ids: &[i64]) -> Value {
        let posts: Vec<Value> = post_ids.iter().map(|id| post(*id, "post")).collect();
        json!({
            "profile": {"nickname": nickname, "follower_count": 1, "is_owner": false},
            "posts": posts
        })
    }

    async fn loaded(transport: &Arc<MockTransport>, post_ids: &[i64]) -> ProfileStore {
        transport.respond(Method::Get, endpoints::MY_PROFILE, 200, payload("crumb", post_ids));
        let store = ProfileStore::new(transport.clone());
        store.load_my_profile().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_delete_open_post_closes_modal() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, &endpoints::post_comments(2), 200, json!({"comments": []}));
        transport.respond(Method::Post, &endpoints::post_delete(2), 200, json!({"success": true, "id": 2}));
        let store = loaded(&transport, &[1, 2, 3]).await;

        let second = store.posts().await[1].clone();
        store.open_post_modal(second).await.unwrap();
        assert!(store.snapshot().await.post_modal.is_some());

        store.delete_post(2).await.unwrap();

        let state = store.snapshot().await;
        let ids: Vec<i64> = state.posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(state.post_modal.is_none());
    }

    #[tokio::test]
    async fn test_create_post_prepends_owned_post() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::POST_CREATE,
            200,
            json!({"post": {"id": 10, "title": "A", "content": "B", "image": null, "like_count": 0, "is_liked": false}}),
        );
        let store = loaded(&transport, &[1, 2]).await;
        store.open_create_modal().await;

        let created = store
            .create_post(NewPost {
                title: "A".into(),
                content: "B".into(),
                images: vec![],
            })
            .await
            .unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.posts[0].id, 10);
        assert!(state.posts[0].is_owner);
        assert!(created.is_owner);
        assert!(!state.create_modal_open);
        assert_eq!(state.posts.len(), 3);
    }

    #[tokio::test]
    async fn test_create_post_requires_title_and_content() {
        let transport = MockTransport::new();
        let store = ProfileStore::new(transport.clone());

        let err = store
            .create_post(NewPost {
                title: "  ".into(),
                content: "B".into(),
                images: vec![],
            })
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_comment_issues_no_request() {
        let transport = MockTransport::new();
        let store = ProfileStore::new(transport.clone());

        let err = store.submit_comment(1, "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_like_round_trip_updates_list_and_modal() {
        let transport = MockTransport::new();
        let like = endpoints::post_like(1);
        transport.respond(Method::Post, &like, 200, json!({"is_liked": true, "like_count": 3}));
        transport.respond(Method::Post, &like, 200, json!({"is_liked": false, "like_count": 2}));
        transport.respond(Method::Get, &endpoints::post_comments(1), 200, json!({"comments": []}));
        let store = loaded(&transport, &[1]).await;
        let original = store.posts().await[0].clone();
        store.open_post_modal(original.clone()).await.unwrap();

        store.toggle_like(1).await.unwrap();
        let state = store.snapshot().await;
        assert!(state.posts[0].is_liked);
        assert_eq!(state.post_modal.as_ref().unwrap().post.like_count, 3);

        store.toggle_like(1).await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.posts[0], original);
        assert_eq!(state.post_modal.unwrap().post, original);
    }

    #[tokio::test]
    async fn test_last_issued_load_wins() {
        let transport = MockTransport::new();
        let slow = endpoints::profile("slow");
        let fast = endpoints::profile("fast");
        transport.respond(Method::Get, &slow, 200, payload("slow", &[1]));
        transport.respond(Method::Get, &fast, 200, payload("fast", &[2]));
        let gate = transport.gate(Method::Get, &slow);
        let store = ProfileStore::new(transport.clone());

        let first = store.load_profile_by_nickname("slow");
        let second = async {
            store.load_profile_by_nickname("fast").await.unwrap();
            gate.notify_one();
        };
        let (first, ()) = tokio::join!(first, second);
        first.unwrap();

        let state = store.snapshot().await;
        assert_eq!(state.profile.unwrap().nickname, "fast");
        assert_eq!(state.posts[0].id, 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_superseded_load_still_reports_failure() {
        let transport = MockTransport::new();
        let slow = endpoints::profile("slow");
        let fast = endpoints::profile("fast");
        transport.respond(Method::Get, &slow, 500, json!({"detail": "Server error"}));
        transport.respond(Method::Get, &fast, 200, payload("fast", &[2]));
        let gate = transport.gate(Method::Get, &slow);
        let store = ProfileStore::new(transport.clone());

        let first = store.load_profile_by_nickname("slow");
        let second = async {
            store.load_profile_by_nickname("fast").await.unwrap();
            gate.notify_one();
        };
        let (first, ()) = tokio::join!(first, second);
        assert_eq!(first.unwrap_err().status(), Some(500));

        let state = store.snapshot().await;
        assert_eq!(state.profile.unwrap().nickname, "fast");
        assert_eq!(state.error, None);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_load() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, endpoints::MY_PROFILE, 200, payload("crumb", &[1]));
        let gate = transport.gate(Method::Get, endpoints::MY_PROFILE);
        let store = ProfileStore::new(transport.clone());

        let load = store.load_my_profile();
        let reset = async {
            store.reset_profile().await;
            gate.notify_one();
        };
        let (load, ()) = tokio::join!(load, reset);
        load.unwrap();

        assert_eq!(store.snapshot().await, ProfileState::default());
    }

    #[tokio::test]
    async fn test_toggle_follow_updates_profile() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            &endpoints::follow_toggle("crumb"),
            200,
            json!({"success": true, "is_following": true, "follower_count": 2}),
        );
        let store = loaded(&transport, &[]).await;

        store.toggle_follow("crumb").await.unwrap();
        let profile = store.profile().await.unwrap();
        assert!(profile.is_following);
        assert_eq!(profile.follower_count, 2);
    }

    #[tokio::test]
    async fn test_toggle_follow_reported_failure() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            &endpoints::follow_toggle("crumb"),
            200,
            json!({"success": false, "error": "You cannot follow yourself."}),
        );
        let store = loaded(&transport, &[]).await;

        let err = store.toggle_follow("crumb").await.unwrap_err();
        assert_eq!(err.user_message(), "You cannot follow yourself.");
        assert_eq!(store.profile().await.unwrap().follower_count, 1);
    }

    #[tokio::test]
    async fn test_follow_modal_private_body() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            &endpoints::followers("crumb"),
            200,
            json!({"users": [], "private": true, "detail": "Only followers can see this."}),
        );
        let store = loaded(&transport, &[]).await;

        store.open_follow_modal(FollowListKind::Followers, None).await.unwrap();
        let modal = store.snapshot().await.follow_modal.unwrap();
        assert!(modal.users.is_empty());
        assert_eq!(modal.message.as_deref(), Some("Only followers can see this."));
        assert!(!modal.loading);
    }

    #[tokio::test]
    async fn test_follow_modal_403_is_denial() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, &endpoints::followings("dough"), 403, json!({}));
        let store = ProfileStore::new(transport.clone());

        store
            .open_follow_modal(FollowListKind::Followings, Some("dough"))
            .await
            .unwrap();
        let modal = store.snapshot().await.follow_modal.unwrap();
        assert_eq!(modal.message.as_deref(), Some(PRIVATE_LIST_MESSAGE));
    }

    #[tokio::test]
    async fn test_follow_modal_failure_uses_generic_message() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, &endpoints::followers("dough"), 500, json!({"detail": "boom"}));
        let store = ProfileStore::new(transport.clone());

        assert!(
            store
                .open_follow_modal(FollowListKind::Followers, Some("dough"))
                .await
                .is_err()
        );
        let modal = store.snapshot().await.follow_modal.unwrap();
        assert_eq!(modal.message.as_deref(), Some(FOLLOW_LIST_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_follow_modal_lists_users() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            &endpoints::followers("dough"),
            200,
            json!({"users": [{"nickname": "crumb", "username": "c"}], "private": false}),
        );
        let store = ProfileStore::new(transport.clone());

        store
            .open_follow_modal(FollowListKind::Followers, Some("dough"))
            .await
            .unwrap();
        let modal = store.snapshot().await.follow_modal.unwrap();
        assert_eq!(modal.users.len(), 1);
        assert!(modal.message.is_none());

        store.close_follow_modal().await;
        assert!(store.snapshot().await.follow_modal.is_none());
    }

    #[tokio::test]
    async fn test_submit_comment_appends_or_replaces() {
        let transport = MockTransport::new();
        let comments = endpoints::post_comments(1);
        transport.respond(Method::Get, &comments, 200, json!({"comments": [{"id": 1, "content": "first"}]}));
        transport.respond(
            Method::Post,
            &comments,
            200,
            json!({"success": true, "comment": {"id": 2, "content": "second", "is_owner": true}}),
        );
        transport.respond(
            Method::Post,
            &comments,
            200,
            json!({"comments": [{"id": 1, "content": "first"}, {"id": 2, "content": "second"}, {"id": 3, "content": "third"}]}),
        );
        let store = loaded(&transport, &[1]).await;
        store.open_post_modal(store.posts().await[0].clone()).await.unwrap();

        store.submit_comment(1, "second").await.unwrap();
        assert_eq!(store.snapshot().await.post_modal.unwrap().comments.len(), 2);

        store.submit_comment(1, "third").await.unwrap();
        let ids: Vec<i64> = store
            .snapshot()
            .await
            .post_modal
            .unwrap()
            .comments
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_update_and_delete_comment() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            &endpoints::post_comments(1),
            200,
            json!({"comments": [{"id": 5, "content": "old"}, {"id": 6, "content": "other"}]}),
        );
        transport.respond(
            Method::Post,
            &endpoints::comment_update(5),
            200,
            json!({"success": true, "id": 5, "content": "new"}),
        );
        transport.respond(Method::Post, &endpoints::comment_delete(6), 200, json!({"success": true, "id": 6}));
        let store = loaded(&transport, &[1]).await;
        store.open_post_modal(store.posts().await[0].clone()).await.unwrap();

        store.update_comment(5, "new").await.unwrap();
        store.delete_comment(6).await.unwrap();

        let comments = store.snapshot().await.post_modal.unwrap().comments;
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "new");
    }

    #[tokio::test]
    async fn test_update_post_mutates_both_copies() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, &endpoints::post_comments(1), 200, json!({"comments": []}));
        transport.respond(
            Method::Post,
            &endpoints::post_update(1),
            200,
            json!({"success": true, "post": {"id": 1, "title": "Edited", "content": "body"}}),
        );
        let store = loaded(&transport, &[1]).await;
        store.open_post_modal(store.posts().await[0].clone()).await.unwrap();

        store.update_post(1, " Edited ", "body").await.unwrap();
        let state = store.snapshot().await;
        assert_eq!(state.posts[0].title, "Edited");
        assert_eq!(state.post_modal.unwrap().post.title, "Edited");
    }

    #[tokio::test]
    async fn test_open_create_modal_clears_active_post() {
        let transport = MockTransport::new();
        transport.respond(Method::Get, &endpoints::post_comments(1), 200, json!({"comments": []}));
        let store = loaded(&transport, &[1]).await;
        store.open_post_modal(store.posts().await[0].clone()).await.unwrap();

        store.open_create_modal().await;
        let state = store.snapshot().await;
        assert!(state.post_modal.is_none());
        assert!(state.create_modal_open);
    }

    #[tokio::test]
    async fn test_upload_profile_image() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Post,
            endpoints::PROFILE_IMAGE,
            200,
            json!({"success": true, "image_url": "http://localhost:8000/media/p.png"}),
        );
        let store = loaded(&transport, &[]).await;
        store.open_image_modal().await;

        let url = store
            .upload_profile_image_base64("data:image/png;base64,iVBORw0KGgo=")
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8000/media/p.png?t="));

        let state = store.snapshot().await;
        assert_eq!(state.profile.unwrap().profile_img, Some(url));
        assert!(!state.image_modal_open);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_data_url() {
        let transport = MockTransport::new();
        let store = ProfileStore::new(transport.clone());

        let err = store.upload_profile_image_base64("not-an-image").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(transport.total_calls(), 0);
    }

    #[test]
    fn test_cache_busted_separator() {
        assert_eq!(cache_busted("/a.png", 5), "/a.png?t=5");
        assert_eq!(cache_busted("/a.png?v=1", 5), "/a.png?v=1&t=5");
    }

    #[tokio::test]
    async fn test_blank_search_clears_results() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            endpoints::SEARCH,
            200,
            json!({"users": [{"nickname": "crumb"}], "bakeries": [{"id": 1, "name": "A"}]}),
        );
        let store = ProfileStore::new(transport.clone());

        store.search_users_and_bakeries("cr").await.unwrap();
        assert_eq!(store.snapshot().await.search_results.bakeries.len(), 1);

        store.search_users_and_bakeries("  ").await.unwrap();
        assert_eq!(store.snapshot().await.search_results, SearchResults::default());
        assert_eq!(transport.total_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_search_sends_last_keystroke_only() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            endpoints::SEARCH,
            200,
            json!({"users": [], "bakeries": [{"id": 7, "name": "Sungsimdang"}]}),
        );
        let store = ProfileStore::new(transport.clone());
        let store = &store;
        let keystroke = move |query: &'static str, after_ms: u64| async move {
            tokio::time::sleep(Duration::from_millis(after_ms)).await;
            store.search_debounced(query, SEARCH_DEBOUNCE).await.unwrap()
        };

        let (s, su, sun, sung, sungs) = tokio::join!(
            keystroke("s", 0),
            keystroke("su", 50),
            keystroke("sun", 100),
            keystroke("sung", 150),
            keystroke("sungs", 200),
        );

        assert!(s.is_none() && su.is_none() && sun.is_none() && sung.is_none());
        assert_eq!(sungs.unwrap().bakeries[0].id, 7);
        assert_eq!(transport.call_count(Method::Get, endpoints::SEARCH), 1);
        let sent = &transport.calls()[0];
        assert_eq!(sent.query, vec![("q".to_string(), "sungs".to_string())]);
        assert_eq!(store.snapshot().await.search_results.bakeries.len(), 1);
    }

    #[tokio::test]
    async fn test_follow_visibility_is_normalised() {
        let transport = MockTransport::new();
        transport.respond(
            Method::Get,
            endpoints::FOLLOW_VISIBILITY,
            200,
            json!({"follow_visibility": "followers"}),
        );
        transport.respond(
            Method::Post,
            endpoints::FOLLOW_VISIBILITY,
            200,
            json!({"follow_visibility": "private"}),
        );
        let store = ProfileStore::new(transport.clone());

        assert_eq!(
            store.load_follow_visibility().await.unwrap(),
            FollowVisibility::FollowingOnly
        );
        store
            .update_follow_visibility(FollowVisibility::Private)
            .await
            .unwrap();
        assert_eq!(
            store.snapshot().await.follow_visibility,
            Some(FollowVisibility::Private)
        );

        let RequestBody::Json(body) = &transport.calls()[1].body else {
            panic!("expected a JSON body");
        };
        assert_eq!(body["follow_visibility"], "private");
    }
}
