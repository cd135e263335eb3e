//! Docs Bot

use async_trait::async_trait;
use fleet_core::BotKind;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use super::{parse_params, unknown_command};
use crate::bot::Bot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyLogParams {
    date: String,
    #[serde(default)]
    events: Vec<String>,
    #[serde(default)]
    lessons: Vec<String>,
    #[serde(default)]
    next_steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChangelogParams {
    version: String,
    #[serde(default)]
    date: Option<String>,
    /// Section name ("Added", "Fixed", ...) to entries
    #[serde(default)]
    changes: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct DocsBot;

impl DocsBot {
    pub fn new() -> Self {
        Self
    }

    fn daily_log(&self, params: DailyLogParams) -> Value {
        let mut markdown = format!("# Daily Log - {}\n", params.date);
        let sections = [
            ("Events", &params.events),
            ("Lessons Learned", &params.lessons),
            ("Next Steps", &params.next_steps),
        ];
        for (title, items) in sections {
            push_section(&mut markdown, title, items);
        }

        json!({
            "title": format!("Daily Log - {}", params.date),
            "markdown": markdown,
            "entries": params.events.len() + params.lessons.len() + params.next_steps.len(),
        })
    }

    fn changelog(&self, params: ChangelogParams) -> Result<Value, String> {
        if params.changes.values().all(Vec::is_empty) {
            return Err(format!("No changes listed for version {}", params.version));
        }

        let mut markdown = match &params.date {
            Some(date) => format!("## [{}] - {}\n", params.version, date),
            None => format!("## [{}]\n", params.version),
        };
        for (section, items) in &params.changes {
            push_section(&mut markdown, section, items);
        }

        Ok(json!({
            "version": params.version,
            "markdown": markdown,
        }))
    }
}

fn push_section(markdown: &mut String, title: &str, items: &[String]) {
    markdown.push_str(&format!("\n### {}\n", title));
    if items.is_empty() {
        markdown.push_str("- _None_\n");
    }
    for item in items {
        markdown.push_str(&format!("- {}\n", item));
    }
}

#[async_trait]
impl Bot for DocsBot {
    fn kind(&self) -> BotKind {
        BotKind::Docs
    }

    fn commands(&self) -> Vec<String> {
        vec!["daily-log".to_string(), "changelog".to_string()]
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match command {
            "daily-log" => Ok(self.daily_log(parse_params(command, params)?)),
            "changelog" => self.changelog(parse_params(command, params)?),
            _ => Err(unknown_command(command)),
        }
    }
}
