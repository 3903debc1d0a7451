//! Remote classifier providers and the local alias fallback.

use crate::classify::{ClassifiedEntry, ClassifyRequest, output};
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use std::env;
use std::time::Duration;

use crate::memolog::config::ClassifyConfig;

const REQUEST_TIMEOUT_SECS: u64 = 45;

pub trait Classifier {
    fn classify(&self, req: &ClassifyRequest) -> Result<String>;
}

pub struct OpenAiClassifier {
    pub api_key: String,
    pub model: String,
}

pub struct AnthropicClassifier {
    pub api_key: String,
    pub model: String,
}

pub struct GeminiClassifier {
    pub api_key: String,
    pub model: String,
}

pub struct OpenAiCompatClassifier {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteProvider {
    OpenAi,
    Anthropic,
    Gemini,
    OpenAiCompatible,
}

impl RemoteProvider {
    fn label(self) -> &'static str {
        match self {
            RemoteProvider::OpenAi => "openai",
            RemoteProvider::Anthropic => "anthropic",
            RemoteProvider::Gemini => "gemini",
            RemoteProvider::OpenAiCompatible => "openai-compatible",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteModelConfig {
    provider: RemoteProvider,
    model: String,
    api_key: String,
    base_url: Option<String>,
}

impl RemoteModelConfig {
    pub fn label(&self) -> &'static str {
        self.provider.label()
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

fn parse_provider_alias(raw: &str) -> Option<RemoteProvider> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "openai" => Some(RemoteProvider::OpenAi),
        "anthropic" | "claude" => Some(RemoteProvider::Anthropic),
        "gemini" | "google" => Some(RemoteProvider::Gemini),
        "openai-compatible" | "compatible" | "deepseek" => Some(RemoteProvider::OpenAiCompatible),
        _ => None,
    }
}

fn parse_prefixed_model(raw: &str) -> (Option<RemoteProvider>, String) {
    let trimmed = raw.trim();
    if let Some((prefix, model)) = trimmed.split_once(':')
        && let Some(provider) = parse_provider_alias(prefix)
    {
        return (Some(provider), model.trim().to_string());
    }
    (None, trimmed.to_string())
}

fn infer_provider_from_model(model: &str) -> Option<RemoteProvider> {
    let lower = model.trim().to_ascii_lowercase();
    if lower.starts_with("deepseek-") {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if lower.starts_with("claude-") {
        return Some(RemoteProvider::Anthropic);
    }
    if lower.starts_with("gemini-") {
        return Some(RemoteProvider::Gemini);
    }
    if lower.starts_with("gpt-")
        || lower.starts_with("o1")
        || lower.starts_with("o3")
        || lower.starts_with("o4")
    {
        return Some(RemoteProvider::OpenAi);
    }
    None
}

fn first_available_provider() -> Option<RemoteProvider> {
    if env_non_empty("AI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAiCompatible);
    }
    if env_non_empty("OPENAI_API_KEY").is_some() {
        return Some(RemoteProvider::OpenAi);
    }
    if env_non_empty("ANTHROPIC_API_KEY").is_some() {
        return Some(RemoteProvider::Anthropic);
    }
    if env_non_empty("GEMINI_API_KEY").is_some() {
        return Some(RemoteProvider::Gemini);
    }
    None
}

fn default_model_for_provider(provider: RemoteProvider) -> &'static str {
    match provider {
        RemoteProvider::OpenAi => "gpt-4.1-mini",
        RemoteProvider::Anthropic => "claude-3-5-haiku-latest",
        RemoteProvider::Gemini => "gemini-2.5-flash-lite",
        RemoteProvider::OpenAiCompatible => "deepseek-chat",
    }
}

fn resolve_api_key(provider: RemoteProvider) -> Option<String> {
    match provider {
        RemoteProvider::OpenAi => {
            env_non_empty("OPENAI_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::Anthropic => {
            env_non_empty("ANTHROPIC_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::Gemini => {
            env_non_empty("GEMINI_API_KEY").or_else(|| env_non_empty("AI_API_KEY"))
        }
        RemoteProvider::OpenAiCompatible => env_non_empty("AI_API_KEY")
            .or_else(|| env_non_empty("DEEPSEEK_API_KEY"))
            .or_else(|| env_non_empty("OPENAI_API_KEY")),
    }
}

fn resolve_compatible_base_url(model: &str) -> Option<String> {
    if let Some(base) = env_non_empty("AI_BASE_URL") {
        return Some(base);
    }
    if model.trim().to_ascii_lowercase().starts_with("deepseek-") {
        return Some("https://api.deepseek.com".to_string());
    }
    None
}

/// Resolve which remote provider to use, if any. `provider = "local"`
/// pins the alias fallback; `"auto"` infers a provider from the model
/// name or from whichever API key is present in the environment.
pub fn resolve_remote_config(cfg: &ClassifyConfig) -> Option<RemoteModelConfig> {
    if cfg.provider.eq_ignore_ascii_case("local") {
        return None;
    }

    let mut chosen_provider = parse_provider_alias(&cfg.provider);
    let (prefixed_provider, mut model) = parse_prefixed_model(&cfg.model);
    if chosen_provider.is_none() {
        chosen_provider = prefixed_provider
            .or_else(|| infer_provider_from_model(&model))
            .or_else(first_available_provider);
    }

    let provider = chosen_provider?;
    if model.trim().is_empty() {
        model = default_model_for_provider(provider).to_string();
    }
    let base_url = match provider {
        RemoteProvider::OpenAiCompatible => resolve_compatible_base_url(&model),
        _ => None,
    };
    let api_key = resolve_api_key(provider)?;
    Some(RemoteModelConfig {
        provider,
        model,
        api_key,
        base_url,
    })
}

pub fn classify_remote(remote: &RemoteModelConfig, req: &ClassifyRequest) -> Result<String> {
    match remote.provider {
        RemoteProvider::OpenAi => OpenAiClassifier {
            api_key: remote.api_key.clone(),
            model: remote.model.clone(),
        }
        .classify(req),
        RemoteProvider::Anthropic => AnthropicClassifier {
            api_key: remote.api_key.clone(),
            model: remote.model.clone(),
        }
        .classify(req),
        RemoteProvider::Gemini => GeminiClassifier {
            api_key: remote.api_key.clone(),
            model: remote.model.clone(),
        }
        .classify(req),
        RemoteProvider::OpenAiCompatible => OpenAiCompatClassifier {
            api_key: remote.api_key.clone(),
            model: remote.model.clone(),
            base_url: remote
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
        }
        .classify(req),
    }
}

fn build_prompt(req: &ClassifyRequest) -> String {
    let mut project_list = String::new();
    for entry in req.catalog.entries() {
        project_list.push_str(&format!(
            "- {} (aliases: {})\n",
            entry.name,
            entry.aliases.join(", ")
        ));
    }

    let mut format_block = String::new();
    for section in req.sections {
        format_block.push_str(section);
        format_block.push_str("\n- …\n\n");
    }

    let first_section = req.sections.first().map(String::as_str).unwrap_or("");
    format!(
        "You turn a work memo into project log entries.\n\n\
         KNOWN PROJECTS:\n{project_list}\n\
         INSTRUCTIONS:\n\
         - Split the content per project.\n\
         - Assign a project only when the relation is reasonably certain.\n\
         - When in doubt, or for general content, assign to \"{unclassified}\".\n\
         - One memo may yield entries for several projects.\n\
         - Use exactly the markdown format below per entry.\n\
         - Be factual and compact. No assumptions, no inventions.\n\n\
         FORMAT PER ENTRY (no ## date line, only the sections):\n\n{format_block}\
         IMPORTANT: omit a section entirely when it has no content for it.\n\
         Never include a section header without a bullet under it.\n\n\
         Answer with JSON: an array of objects with \"project\" (exactly a\n\
         project name from the list above, or \"{unclassified}\") and \"entry\"\n\
         (the content WITHOUT a date line).\n\n\
         Example:\n\
         [\n\
           {{\"project\": \"<project name>\", \"entry\": \"{first_section}\\n- …\"}},\n\
           {{\"project\": \"{unclassified}\", \"entry\": \"{first_section}\\n- …\"}}\n\
         ]\n\n\
         MEMO:\n{memo}",
        unclassified = req.unclassified,
        memo = req.memo_text,
    )
}

fn blocking_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

fn extract_openai_text(json: &Value) -> Option<String> {
    if let Some(text) = json.get("output_text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    let mut chunks = Vec::new();
    let output = json.get("output").and_then(Value::as_array)?;
    for item in output {
        let Some(content) = item.get("content").and_then(Value::as_array) else {
            continue;
        };
        for part in content {
            if let Some(text) = part.get("text").and_then(Value::as_str) {
                chunks.push(text.to_string());
            }
        }
    }

    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

fn extract_anthropic_text(json: &Value) -> Option<String> {
    let mut chunks = Vec::new();
    let content = json.get("content").and_then(Value::as_array)?;
    for part in content {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            chunks.push(text.to_string());
        }
    }
    if chunks.is_empty() {
        None
    } else {
        Some(chunks.join("\n"))
    }
}

fn extract_openai_compatible_text(json: &Value) -> Option<String> {
    let choices = json.get("choices").and_then(Value::as_array)?;
    let first = choices.first()?;
    let content = first.get("message")?.get("content")?;
    match content {
        Value::String(s) => Some(s.to_string()),
        Value::Array(parts) => {
            let mut chunks = Vec::new();
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    chunks.push(text.to_string());
                }
            }
            if chunks.is_empty() {
                None
            } else {
                Some(chunks.join("\n"))
            }
        }
        _ => None,
    }
}

impl Classifier for OpenAiClassifier {
    fn classify(&self, req: &ClassifyRequest) -> Result<String> {
        let prompt = build_prompt(req);
        let payload = serde_json::json!({
            "model": self.model,
            "input": prompt,
            "temperature": 0.2
        });

        let response = blocking_client()?
            .post("https://api.openai.com/v1/responses")
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!("openai call failed with status {}", response.status());
        }

        let json: Value = response.json()?;
        extract_openai_text(&json).context("openai response missing text content")
    }
}

impl Classifier for AnthropicClassifier {
    fn classify(&self, req: &ClassifyRequest) -> Result<String> {
        let prompt = build_prompt(req);
        let payload = serde_json::json!({
            "model": self.model,
            "max_tokens": 2000,
            "temperature": 0.2,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let response = blocking_client()?
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!("anthropic call failed with status {}", response.status());
        }

        let json: Value = response.json()?;
        extract_anthropic_text(&json).context("anthropic response missing text content")
    }
}

impl Classifier for GeminiClassifier {
    fn classify(&self, req: &ClassifyRequest) -> Result<String> {
        let prompt = build_prompt(req);
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let payload = serde_json::json!({
            "contents": [
                {"parts": [{"text": prompt}]}
            ]
        });

        let response = blocking_client()?.post(&url).json(&payload).send()?;
        if !response.status().is_success() {
            anyhow::bail!("gemini call failed with status {}", response.status());
        }

        let json: Value = response.json()?;
        let text = json
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .and_then(|v| v.get("content"))
            .and_then(|v| v.get("parts"))
            .and_then(Value::as_array)
            .and_then(|parts| parts.first())
            .and_then(|v| v.get("text"))
            .and_then(Value::as_str)
            .context("gemini response missing text content")?;
        Ok(text.to_string())
    }
}

impl Classifier for OpenAiCompatClassifier {
    fn classify(&self, req: &ClassifyRequest) -> Result<String> {
        let prompt = build_prompt(req);
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/v1/chat/completions");
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.2
        });

        let response = blocking_client()?
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()?;
        if !response.status().is_success() {
            anyhow::bail!(
                "openai-compatible call failed with status {}",
                response.status()
            );
        }

        let json: Value = response.json()?;
        extract_openai_compatible_text(&json)
            .context("openai-compatible response missing text content")
    }
}

/// Alias-match fallback: assign the whole memo to the first catalog
/// project whose name or alias occurs in the text, the sentinel otherwise.
/// The memo's lines are re-shaped into bullets under the first recognized
/// subsection so they survive the merge.
pub fn classify_by_alias(req: &ClassifyRequest) -> Vec<ClassifiedEntry> {
    let entry = output::bulletize(req.memo_text, req.sections);
    if entry.is_empty() {
        return Vec::new();
    }

    let lower = req.memo_text.to_lowercase();
    let project = req
        .catalog
        .entries()
        .iter()
        .find(|candidate| {
            std::iter::once(&candidate.name)
                .chain(candidate.aliases.iter())
                .any(|term| {
                    let term = term.trim().to_lowercase();
                    !term.is_empty() && lower.contains(&term)
                })
        })
        .map(|candidate| candidate.name.clone())
        .unwrap_or_else(|| req.unclassified.to_string());

    vec![ClassifiedEntry { project, entry }]
}
