//! Best-effort client for the companion backend.
//!
//! Call sites degrade to local-only behavior on any failure; nothing here
//! retries. Errors carry the server's own message when one is present, so
//! the chat transcript can show it verbatim.

use std::time::Duration;

use anyhow::{Result, anyhow};
use serde::Deserialize;

use zen_core::{Task, now_iso8601};
use zen_store::Config;

pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub remaining_chats: u32,
}

impl BackendClient {
    /// None when no backend is configured; callers then stay local.
    pub fn from_config(config: &Config) -> Option<Self> {
        let base_url = config.backend_url.clone()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .ok()?;
        Some(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn chat(&self, user_id: &str, message: &str) -> Result<ChatReply> {
        let response = self
            .http
            .post(format!("{}/api/master/chat", self.base_url))
            .json(&serde_json::json!({
                "message": message,
                "user_id": user_id,
                "timestamp": now_iso8601(),
            }))
            .send()
            .await?;

        let status = response.status();
        let body: serde_json::Value = response.json().await?;
        if !status.is_success() {
            // The backend reports errors as {error} or {details}.
            let detail = body
                .get("error")
                .or_else(|| body.get("details"))
                .and_then(|v| v.as_str())
                .unwrap_or("禅师暂时无法回应，请稍后再试。");
            return Err(anyhow!("{detail}"));
        }
        Ok(serde_json::from_value(body)?)
    }

    pub async fn remaining_chats(&self, user_id: &str) -> Result<u32> {
        let body: serde_json::Value = self
            .http
            .get(format!(
                "{}/api/master/remaining_chats?user_id={user_id}",
                self.base_url
            ))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.get("remaining_chats")
            .and_then(|v| v.as_u64())
            .map(|n| n as u32)
            .ok_or_else(|| anyhow!("malformed remaining_chats response"))
    }

    // --- Task sync (fire-and-forget from the caller's perspective) ---

    pub async fn push_task(&self, task: &Task) -> Result<()> {
        self.http
            .post(format!("{}/api/tasks", self.base_url))
            .json(&serde_json::json!({
                "title": task.title,
                "priority": task.priority.as_str(),
                "date": task.date,
                "category": task.category,
                "description": task.description,
            }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn push_task_update(&self, task: &Task) -> Result<()> {
        self.http
            .put(format!("{}/api/tasks/{}", self.base_url, task.id))
            .json(task)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn delete_task(&self, id: u64) -> Result<()> {
        self.http
            .delete(format!("{}/api/tasks/{id}", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
