//! Research Bot

use async_trait::async_trait;
use fleet_core::BotKind;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_params, unknown_command};
use crate::bot::Bot;

#[derive(Debug, Deserialize)]
struct OutlineParams {
    topic: String,
    #[serde(default)]
    questions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeParams {
    text: String,
    #[serde(default = "default_max_sentences")]
    max_sentences: usize,
}

fn default_max_sentences() -> usize {
    3
}

#[derive(Debug, Default)]
pub struct ResearchBot;

impl ResearchBot {
    pub fn new() -> Self {
        Self
    }

    fn outline(&self, params: OutlineParams) -> Result<Value, String> {
        let topic = params.topic.trim();
        if topic.is_empty() {
            return Err("Topic must not be empty".to_string());
        }

        let questions = if params.questions.is_empty() {
            vec![
                format!("What problem does {} address?", topic),
                format!("Who are the main actors working on {}?", topic),
                format!("What are the open risks around {}?", topic),
            ]
        } else {
            params.questions
        };

        Ok(json!({
            "topic": topic,
            "sections": [
                { "title": "Background", "items": [format!("Define {} and its scope", topic)] },
                { "title": "Key Questions", "items": questions },
                { "title": "Sources to Consult", "items": ["Primary documentation", "Recent publications", "Practitioner interviews"] },
                { "title": "Findings", "items": [] },
                { "title": "Open Issues", "items": [] },
            ],
        }))
    }

    fn summarize(&self, params: SummarizeParams) -> Result<Value, String> {
        let sentences = split_sentences(&params.text);
        if sentences.is_empty() {
            return Err("Nothing to summarize".to_string());
        }
        if params.max_sentences == 0 {
            return Err("maxSentences must be at least 1".to_string());
        }

        let kept: Vec<&str> = sentences.iter().take(params.max_sentences).copied().collect();
        Ok(json!({
            "summary": kept.join(" "),
            "sentences": kept.len(),
            "totalSentences": sentences.len(),
        }))
    }
}

/// Split on `.`, `!` and `?`, keeping the terminator with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?') {
            let end = idx + ch.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

#[async_trait]
impl Bot for ResearchBot {
    fn kind(&self) -> BotKind {
        BotKind::Research
    }

    fn commands(&self) -> Vec<String> {
        vec!["outline".to_string(), "summarize".to_string()]
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match command {
            "outline" => self.outline(parse_params(command, params)?),
            "summarize" => self.summarize(parse_params(command, params)?),
            _ => Err(unknown_command(command)),
        }
    }
}
