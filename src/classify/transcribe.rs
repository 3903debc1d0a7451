//! Audio memo transcription over the OpenAI audio endpoint.

use crate::error::MemologError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;
use serde_json::Value;
use std::env;
use std::path::Path;
use std::time::Duration;

const TRANSCRIBE_TIMEOUT_SECS: u64 = 120;

fn api_key() -> Result<String> {
    for var in ["OPENAI_API_KEY", "AI_API_KEY"] {
        if let Ok(v) = env::var(var)
            && !v.trim().is_empty()
        {
            return Ok(v.trim().to_string());
        }
    }
    Err(MemologError::MissingApiKey("OPENAI_API_KEY".to_string()).into())
}

/// Transcribe one audio file to plain text.
pub fn transcribe(path: &Path) -> Result<String> {
    let key = api_key()?;
    let form = Form::new()
        .text("model", "whisper-1")
        .file("file", path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let client = Client::builder()
        .timeout(Duration::from_secs(TRANSCRIBE_TIMEOUT_SECS))
        .build()?;
    let response = client
        .post("https://api.openai.com/v1/audio/transcriptions")
        .bearer_auth(&key)
        .multipart(form)
        .send()
        .with_context(|| format!("transcription request failed for {}", path.display()))?;
    if !response.status().is_success() {
        anyhow::bail!(
            "transcription of {} failed with status {}",
            path.display(),
            response.status()
        );
    }

    let json: Value = response.json()?;
    let text = json
        .get("text")
        .and_then(Value::as_str)
        .context("transcription response missing text field")?;
    Ok(text.trim().to_string())
}
