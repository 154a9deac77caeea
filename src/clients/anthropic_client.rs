use serde::{Deserialize, Serialize};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// One completed turn: the reply text plus the token counts the API billed.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u64,
    output_tokens: u64,
}

pub async fn complete_messages(
    system: &str,
    messages: &[ChatMessage],
    api_key: &str,
) -> Result<ChatCompletion, Box<dyn std::error::Error + Send + Sync>> {
    let request = MessagesRequest {
        model: MODEL,
        max_tokens: MAX_TOKENS,
        system,
        messages,
    };

    let client = reqwest::Client::new();
    let response = client
        .post(MESSAGES_URL)
        .header("x-api-key", api_key)
        .header("anthropic-version", API_VERSION)
        .header("Content-Type", "application/json")
        .json(&request)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?; // read the body once

    if !status.is_success() {
        tracing::warn!(%status, body = %text, "Anthropic API request failed");
        return Err(format!("Request failed with status {}", status).into());
    }

    let parsed: MessagesResponse = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse JSON: {}\nRaw body: {}", e, text))?;

    let Some(block) = parsed.content.iter().find(|b| b.kind == "text") else {
        return Err("No text content in response".to_string().into());
    };

    Ok(ChatCompletion {
        text: block.text.clone(),
        input_tokens: parsed.usage.input_tokens,
        output_tokens: parsed.usage.output_tokens,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_parsing_picks_first_text_block() {
        let body = r#"{
            "content": [
                {"type": "tool_use", "id": "x"},
                {"type": "text", "text": "こんにちは"}
            ],
            "usage": {"input_tokens": 12, "output_tokens": 34}
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        let block = parsed.content.iter().find(|b| b.kind == "text").unwrap();
        assert_eq!(block.text, "こんにちは");
        assert_eq!(parsed.usage.input_tokens, 12);
        assert_eq!(parsed.usage.output_tokens, 34);
    }
}
