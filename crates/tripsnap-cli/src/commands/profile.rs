use super::print_json;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tripsnap_application::AppContext;
use tripsnap_core::model::{FollowListKind, NewPost};
use tripsnap_infrastructure::image::encode_image_file;

pub async fn show(context: &AppContext, nickname: Option<&str>) -> Result<()> {
    match nickname {
        Some(nickname) => context.profile.load_profile_by_nickname(nickname).await?,
        None => context.profile.load_my_profile().await?,
    }
    let state = context.profile.snapshot().await;
    print_json(&serde_json::json!({
        "profile": state.profile,
        "posts": state.posts,
    }))
}

pub async fn followers(context: &AppContext, nickname: &str) -> Result<()> {
    follow_list(context, FollowListKind::Followers, nickname).await
}

pub async fn followings(context: &AppContext, nickname: &str) -> Result<()> {
    follow_list(context, FollowListKind::Followings, nickname).await
}

async fn follow_list(context: &AppContext, kind: FollowListKind, nickname: &str) -> Result<()> {
    context.profile.open_follow_modal(kind, Some(nickname)).await?;
    print_json(&context.profile.snapshot().await.follow_modal)
}

pub async fn search(context: &AppContext, query: &str) -> Result<()> {
    let results = context.profile.search_users_and_bakeries(query).await?;
    print_json(&results)
}

pub async fn create_post(
    context: &AppContext,
    title: String,
    content: String,
    images: &[PathBuf],
) -> Result<()> {
    let mut encoded = Vec::with_capacity(images.len());
    for path in images {
        let data_url = encode_image_file(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        encoded.push(data_url);
    }

    let post = context
        .profile
        .create_post(NewPost {
            title,
            content,
            images: encoded,
        })
        .await?;
    print_json(&post)
}

pub async fn avatar(context: &AppContext, path: &Path) -> Result<()> {
    let data_url = encode_image_file(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let url = context.profile.upload_profile_image_base64(&data_url).await?;
    println!("{url}");
    Ok(())
}
