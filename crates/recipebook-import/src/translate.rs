use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ImportError, ImportResult};

/// Machine translation of recipe text.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> ImportResult<String>;
}

/// Passes text through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str) -> ImportResult<String> {
        Ok(text.to_string())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: Option<MyMemoryData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: Option<String>,
}

/// Client for the MyMemory translation API.
#[derive(Clone, Debug)]
pub struct MyMemoryTranslator {
    client: reqwest::Client,
    endpoint: String,
    lang_pair: String,
}

impl MyMemoryTranslator {
    pub fn new(endpoint: impl Into<String>, lang_pair: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            lang_pair: lang_pair.into(),
        }
    }

    pub fn lang_pair(&self) -> &str {
        &self.lang_pair
    }
}

#[async_trait]
impl Translator for MyMemoryTranslator {
    async fn translate(&self, text: &str) -> ImportResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let response: MyMemoryResponse = self
            .client
            .get(&self.endpoint)
            .query(&[("q", text), ("langpair", self.lang_pair.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        extract(response)
    }
}

fn extract(response: MyMemoryResponse) -> ImportResult<String> {
    response
        .response_data
        .and_then(|data| data.translated_text)
        .ok_or_else(|| ImportError::Translation("response carried no translatedText".into()))
}
