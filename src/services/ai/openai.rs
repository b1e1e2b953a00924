use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{LlmProvider, Message, Reply, ToolCall, ToolSpec};

/// Chat completions provider for OpenAI and OpenAI-compatible endpoints
/// such as Groq.
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            client: super::http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<Reply> {
        let body = build_body(&self.model, system_prompt, messages, tools);

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to call chat completions API")?;

        let status = resp.status();
        let data: Value = resp
            .json()
            .await
            .context("failed to parse chat completions response")?;

        if !status.is_success() {
            anyhow::bail!("chat completions API error ({}): {}", status, data);
        }

        parse_response(&data)
    }
}

fn build_body(model: &str, system_prompt: &str, messages: &[Message], tools: &[ToolSpec]) -> Value {
    let mut chat_messages = vec![json!({
        "role": "system",
        "content": system_prompt,
    })];

    for msg in messages {
        let mut entry = json!({
            "role": msg.role,
            "content": msg.content,
        });
        if !msg.tool_calls.is_empty() {
            let calls: Vec<Value> = msg
                .tool_calls
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "type": "function",
                        "function": {
                            "name": c.name,
                            "arguments": c.arguments.to_string(),
                        },
                    })
                })
                .collect();
            entry["tool_calls"] = Value::Array(calls);
        }
        if let Some(id) = &msg.tool_call_id {
            entry["tool_call_id"] = json!(id);
        }
        chat_messages.push(entry);
    }

    let mut body = json!({
        "model": model,
        "messages": chat_messages,
        "temperature": 0,
    });

    if !tools.is_empty() {
        let defs: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    },
                })
            })
            .collect();
        body["tools"] = Value::Array(defs);
    }

    body
}

fn parse_response(data: &Value) -> anyhow::Result<Reply> {
    let message = data["choices"][0]
        .get("message")
        .ok_or_else(|| anyhow::anyhow!("missing message in chat completions response"))?;

    let content = message["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .map(|c| {
                    let raw = c["function"]["arguments"].as_str().unwrap_or("{}");
                    ToolCall {
                        id: c["id"].as_str().unwrap_or_default().to_string(),
                        name: c["function"]["name"].as_str().unwrap_or_default().to_string(),
                        // malformed arguments reach the dispatcher as a string and fail there
                        arguments: serde_json::from_str(raw)
                            .unwrap_or_else(|_| Value::String(raw.to_string())),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Reply {
        content,
        tool_calls,
    })
}
