//! Seeds a Postgres database with a starter catalog and a moderator
//! account. For fresh installs and local development.

use anyhow::Context;
use chrono::Utc;
use secrecy::ExposeSecret;
use tracing::info;
use uuid::Uuid;

use domains::{Account, AccountStore, Capability, CatalogStore, Forum, ModerationProfile, Section};
use storage_adapters::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let config = configs::load().context("loading configuration")?;
    let url = config
        .database
        .url
        .as_ref()
        .context("database.url must be set to seed")?;
    let store = PgStore::connect(url.expose_secret()).await?;

    let section = Section {
        id: Uuid::now_v7(),
        name: "General".to_string(),
    };
    let forum = Forum {
        id: Uuid::now_v7(),
        section_id: section.id,
        name: "Open Discussion".to_string(),
        description: Some("Anything goes".to_string()),
    };
    store.insert_section(section).await?;
    store.insert_forum(forum).await?;

    let moderator = Account {
        id: Uuid::now_v7(),
        name: "moderator".to_string(),
        capabilities: vec![
            Capability::CanCreateThreads,
            Capability::CanPinThreads,
            Capability::CanDeleteAnyThread,
            Capability::CanRemoveAnyResponse,
            Capability::CanBanUsers,
        ],
        created_at: Utc::now(),
    };
    let moderator_id = moderator.id;
    let profile = ModerationProfile {
        account_id: moderator_id,
        banned_until: None,
    };
    AccountStore::insert(&store, moderator, profile).await?;

    info!(%moderator_id, "seed complete");
    Ok(())
}
