//! Fixed request and response shapes for the JSON surface. Each call has an
//! explicitly validated input structure; unknown keys are simply ignored by
//! serde rather than probed at runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use domains::{Account, Response, Thread};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateThreadRequest {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateResponseRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EditResponseRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub pinned: bool,
}

#[derive(Debug, Deserialize)]
pub struct BanRequest {
    pub until: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub like: bool,
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct ThreadDetail {
    pub thread: Thread,
    pub responses: Vec<Response>,
}

#[derive(Debug, Serialize)]
pub struct AccountDetail {
    pub account: Account,
    pub banned_until: Option<DateTime<Utc>>,
}
