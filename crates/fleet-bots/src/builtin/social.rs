//! Social Bot
//!
//! Drafts posts locally. Publishing to the platforms is out of scope.

use async_trait::async_trait;
use fleet_core::BotKind;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_params, unknown_command};
use crate::bot::Bot;

/// Character limits per supported platform
const PLATFORM_LIMITS: &[(&str, usize)] = &[("twitter", 280), ("mastodon", 500), ("linkedin", 3000)];

#[derive(Debug, Deserialize)]
struct DraftPostParams {
    platform: String,
    text: String,
    #[serde(default)]
    hashtags: Vec<String>,
}

#[derive(Debug, Default)]
pub struct SocialBot;

impl SocialBot {
    pub fn new() -> Self {
        Self
    }

    fn draft_post(&self, params: DraftPostParams) -> Result<Value, String> {
        let platform = params.platform.to_lowercase();
        let limit = platform_limit(&platform)
            .ok_or_else(|| format!("Unsupported platform: {}", params.platform))?;

        let text = params.text.trim();
        if text.is_empty() {
            return Err("Post text must not be empty".to_string());
        }

        let tags: Vec<String> = params
            .hashtags
            .iter()
            .map(|tag| tag.trim().trim_start_matches('#'))
            .filter(|tag| !tag.is_empty())
            .map(|tag| format!("#{}", tag))
            .collect();

        let post = if tags.is_empty() {
            text.to_string()
        } else {
            format!("{}\n\n{}", text, tags.join(" "))
        };
        let length = post.chars().count();

        Ok(json!({
            "platform": platform,
            "post": post,
            "length": length,
            "limit": limit,
            "fits": length <= limit,
        }))
    }

    fn platforms(&self) -> Value {
        let platforms: Vec<Value> = PLATFORM_LIMITS
            .iter()
            .map(|(name, limit)| json!({ "platform": name, "limit": limit }))
            .collect();
        json!({ "platforms": platforms })
    }
}

fn platform_limit(platform: &str) -> Option<usize> {
    PLATFORM_LIMITS
        .iter()
        .find(|(name, _)| *name == platform)
        .map(|(_, limit)| *limit)
}

#[async_trait]
impl Bot for SocialBot {
    fn kind(&self) -> BotKind {
        BotKind::Social
    }

    fn commands(&self) -> Vec<String> {
        vec!["draft-post".to_string(), "platforms".to_string()]
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match command {
            "draft-post" => self.draft_post(parse_params(command, params)?),
            "platforms" => Ok(self.platforms()),
            _ => Err(unknown_command(command)),
        }
    }
}
