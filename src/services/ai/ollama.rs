use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{LlmProvider, Message, Reply, ToolCall, ToolSpec};

pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(url: String, model: String, timeout_secs: u64) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client: super::http_client(timeout_secs)?,
        })
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> anyhow::Result<Reply> {
        let mut ollama_messages = vec![json!({
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
                    .map(|c| json!({"function": {"name": c.name, "arguments": c.arguments}}))
                    .collect();
                entry["tool_calls"] = Value::Array(calls);
            }
            ollama_messages.push(entry);
        }

        let tool_defs: Vec<Value> = tools
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

        let body = json!({
            "model": self.model,
            "messages": ollama_messages,
            "tools": tool_defs,
            "stream": false,
            "options": { "temperature": 0 },
        });

        let resp = self
            .client
            .post(format!("{}/api/chat", self.url))
            .json(&body)
            .send()
            .await
            .context("failed to call Ollama API")?;

        let data: Value = resp
            .json()
            .await
            .context("failed to parse Ollama response")?;

        parse_response(&data)
    }
}

fn parse_response(data: &Value) -> anyhow::Result<Reply> {
    let message = data
        .get("message")
        .ok_or_else(|| anyhow::anyhow!("missing message in Ollama response"))?;

    let content = message["content"]
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string());

    // Ollama does not assign call ids
    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .map(|c| ToolCall {
                    id: format!("call_{}", uuid::Uuid::new_v4().simple()),
                    name: c["function"]["name"].as_str().unwrap_or_default().to_string(),
                    arguments: c["function"]["arguments"].clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Reply {
        content,
        tool_calls,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        let data = json!({"message": {"role": "assistant", "content": "Hello"}, "done": true});
        let reply = parse_response(&data).unwrap();
        assert_eq!(reply.content.as_deref(), Some("Hello"));
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn test_parse_tool_calls_assigns_ids() {
        let data = json!({"message": {
            "role": "assistant",
            "content": "",
            "tool_calls": [{"function": {"name": "parse_date", "arguments": {"input_date": "friday"}}}]
        }});
        let reply = parse_response(&data).unwrap();
        assert_eq!(reply.content, None);
        assert_eq!(reply.tool_calls.len(), 1);
        assert!(reply.tool_calls[0].id.starts_with("call_"));
        assert_eq!(reply.tool_calls[0].arguments["input_date"], "friday");
    }

    #[test]
    fn test_parse_error_payload() {
        let data = json!({"error": "model not found"});
        assert!(parse_response(&data).is_err());
    }
}
