use super::print_json;
use anyhow::Result;
use tripsnap_application::AppContext;

pub async fn me(context: &AppContext) -> Result<()> {
    print_json(&context.session.snapshot().await)
}

pub fn oauth_url(context: &AppContext) {
    println!("{}", context.session.oauth_login_url());
}

pub async fn rebuild_keywords(context: &AppContext) -> Result<()> {
    let response = context.admin.rebuild_keywords().await?;
    print_json(&response)
}
