//! Code Bot

use async_trait::async_trait;
use fleet_core::BotKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_params, unknown_command};
use crate::bot::Bot;

const MAX_LINE_LENGTH: usize = 100;

#[derive(Debug, Deserialize)]
struct GenerateParams {
    language: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ReviewParams {
    code: String,
}

#[derive(Debug, Serialize)]
struct Finding {
    line: usize,
    kind: &'static str,
    message: String,
}

#[derive(Debug, Default)]
pub struct CodeBot;

impl CodeBot {
    pub fn new() -> Self {
        Self
    }

    fn generate(&self, params: GenerateParams) -> Result<Value, String> {
        let name = params.name.trim();
        let valid_ident = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_ident {
            return Err(format!("'{}' is not a valid function name", params.name));
        }

        let doc = if params.description.is_empty() {
            format!("TODO: describe {}", name)
        } else {
            params.description.clone()
        };

        let language = params.language.to_lowercase();
        let code = match language.as_str() {
            "rust" => format!("/// {doc}\npub fn {name}() {{\n    todo!()\n}}\n"),
            "python" => format!("def {name}():\n    \"\"\"{doc}\"\"\"\n    raise NotImplementedError\n"),
            "javascript" | "typescript" => format!(
                "/** {doc} */\nexport function {name}() {{\n  throw new Error('not implemented');\n}}\n"
            ),
            "go" => format!("// {name} {doc}\nfunc {name}() {{\n\tpanic(\"not implemented\")\n}}\n"),
            other => return Err(format!("Unsupported language: {}", other)),
        };

        Ok(json!({
            "language": language,
            "name": name,
            "code": code,
        }))
    }

    fn review(&self, params: ReviewParams) -> Value {
        let mut findings = Vec::new();
        for (idx, line) in params.code.lines().enumerate() {
            let line_no = idx + 1;
            if line.contains("TODO") || line.contains("FIXME") {
                findings.push(Finding {
                    line: line_no,
                    kind: "todo",
                    message: "Unresolved TODO/FIXME marker".to_string(),
                });
            }
            if line.chars().count() > MAX_LINE_LENGTH {
                findings.push(Finding {
                    line: line_no,
                    kind: "long-line",
                    message: format!("Line exceeds {} characters", MAX_LINE_LENGTH),
                });
            }
            if line.contains(".unwrap()") {
                findings.push(Finding {
                    line: line_no,
                    kind: "unwrap",
                    message: "unwrap() panics on error; propagate with ? instead".to_string(),
                });
            }
        }

        json!({
            "lines": params.code.lines().count(),
            "clean": findings.is_empty(),
            "findings": findings,
        })
    }
}

#[async_trait]
impl Bot for CodeBot {
    fn kind(&self) -> BotKind {
        BotKind::Code
    }

    fn commands(&self) -> Vec<String> {
        vec!["generate".to_string(), "review".to_string()]
    }

    async fn execute(&self, command: &str, params: Value) -> Result<Value, String> {
        match command {
            "generate" => self.generate(parse_params(command, params)?),
            "review" => Ok(self.review(parse_params(command, params)?)),
            _ => Err(unknown_command(command)),
        }
    }
}
