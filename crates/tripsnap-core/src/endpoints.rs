//! Paths of the backend REST contract.

pub const CSRF: &str = "/users/csrf/";

pub const REGISTER: &str = "/api/auth/registration/";
pub const LOGIN: &str = "/api/auth/login/";
pub const ME: &str = "/api/auth/user/";
pub const LOGOUT: &str = "/api/auth/logout/";
pub const PASSWORD_CHANGE: &str = "/api/auth/password/change/";
pub const ACCOUNT_DELETE: &str = "/users/api/account/delete/";

pub const MY_PROFILE: &str = "/users/api/profile/me/";
pub const FOLLOW_VISIBILITY: &str = "/users/api/settings/follow-visibility/";
pub const SEARCH: &str = "/users/profile/search/";
pub const PROFILE_IMAGE: &str = "/users/upload-profile-image/";
pub const POST_CREATE: &str = "/users/post/create/";

pub const BAKERY_LIST: &str = "/chatbot/bakery/";
pub const CHAT_INIT: &str = "/chatbot/init/";
pub const CHAT_MESSAGE: &str = "/chatbot/chat/";

pub const KEYWORD_REBUILD: &str = "/users/api/admin/build-keywords/";

pub fn profile(nickname: &str) -> String {
    format!("/users/api/profile/{}/", urlencoding::encode(nickname))
}

pub fn follow_toggle(nickname: &str) -> String {
    format!("/users/follow/{}/", urlencoding::encode(nickname))
}

pub fn followers(nickname: &str) -> String {
    format!("/users/profile/{}/followers/", urlencoding::encode(nickname))
}

pub fn followings(nickname: &str) -> String {
    format!("/users/profile/{}/followings/", urlencoding::encode(nickname))
}

pub fn post_update(post_id: i64) -> String {
    format!("/users/post/{post_id}/update/")
}

pub fn post_delete(post_id: i64) -> String {
    format!("/users/post/{post_id}/delete/")
}

pub fn post_like(post_id: i64) -> String {
    format!("/users/post/{post_id}/like-toggle/")
}

pub fn post_comments(post_id: i64) -> String {
    format!("/users/post/{post_id}/comments/")
}

pub fn comment_update(comment_id: i64) -> String {
    format!("/users/comment/{comment_id}/update/")
}

pub fn comment_delete(comment_id: i64) -> String {
    format!("/users/comment/{comment_id}/delete/")
}

pub fn bakery_detail(bakery_id: i64) -> String {
    format!("/chatbot/bakery/{bakery_id}/")
}

pub fn bakery_like(bakery_id: i64) -> String {
    format!("/chatbot/bakery/{bakery_id}/like/")
}

pub fn bakery_comments(bakery_id: i64) -> String {
    format!("/chatbot/bakery/{bakery_id}/comments/")
}

pub fn bakery_comment_create(bakery_id: i64) -> String {
    format!("/chatbot/bakery/{bakery_id}/comments/create/")
}

pub fn bakery_comment_delete(bakery_id: i64, comment_id: i64) -> String {
    format!("/chatbot/bakery/{bakery_id}/comments/{comment_id}/")
}

/// OAuth entry point; the backend redirects to `return_path` when done.
pub fn oauth_login(origin: &str, provider: &str, return_path: &str) -> String {
    format!(
        "{}/accounts/{}/login/?process=login&next={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(provider),
        urlencoding::encode(return_path)
    )
}
