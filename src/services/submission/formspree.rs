use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;

use super::{Submission, SubmissionClient};

const ALLOWED_DOMAINS: &[&str] = &["formspree.io"];

pub struct FormspreeClient {
    endpoint: String,
    client: reqwest::Client,
}

impl FormspreeClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    pub fn for_form(form_id: &str) -> Self {
        Self::new(format!("https://formspree.io/f/{form_id}"))
    }
}

/// Only hosts under an allow-listed domain may receive customer details.
pub fn is_allowed_endpoint(url: &str) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };
    let Some(host) = url.host_str() else {
        return false;
    };
    ALLOWED_DOMAINS
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

/// Message for a non-success response: the `errors[].message` values joined
/// with ", ", or a generic failure when the body has none.
pub fn error_message(body: &serde_json::Value) -> String {
    let messages: Vec<&str> = body["errors"]
        .as_array()
        .map(|errors| errors.iter().filter_map(|e| e["message"].as_str()).collect())
        .unwrap_or_default();

    if messages.is_empty() {
        "Failed to submit booking".to_string()
    } else {
        messages.join(", ")
    }
}

#[async_trait]
impl SubmissionClient for FormspreeClient {
    async fn submit(&self, submission: &Submission) -> anyhow::Result<()> {
        if !is_allowed_endpoint(&self.endpoint) {
            anyhow::bail!("Invalid form action URL");
        }

        let resp = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(submission)
            .send()
            .await
            .context("failed to send booking request")?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let data: serde_json::Value = resp.json().await.unwrap_or(serde_json::Value::Null);
        tracing::warn!(%status, body = %data, "booking endpoint returned error");
        anyhow::bail!("{}", error_message(&data))
    }
}
