// src/fetch.rs
use serde_json::Value;

use crate::snapshot::FetchResult;
use crate::sources::{LatestPolicy, Source};

/// Issues one GET per source and folds every outcome into a [`FetchResult`].
/// Failures are captured as data; nothing here aborts a run.
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, source: &Source) -> FetchResult {
        let mut req = self.client.get(&source.url);
        for (name, value) in &source.headers {
            req = req.header(name, value);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(source = %source.key, error = ?e, "transport error");
                return FetchResult::Error(format!("API request failed: {e}"));
            }
        };

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(source = %source.key, "endpoint absent (404)");
            return FetchResult::Skipped;
        }
        if !status.is_success() {
            tracing::warn!(source = %source.key, %status, "non-success status");
            return FetchResult::Error(format!(
                "Failed to fetch data, status: {}",
                status.as_u16()
            ));
        }

        match resp.json::<Value>().await {
            Ok(body) => match source.latest {
                Some(policy) => FetchResult::Ok(extract_latest(body, policy)),
                None => FetchResult::Ok(body),
            },
            Err(e) => {
                tracing::warn!(source = %source.key, error = ?e, "body parse error");
                FetchResult::Error(format!("API request failed: {e}"))
            }
        }
    }
}

/// Reduce a list-shaped body to one element. Handles both a bare JSON array
/// and the HellHub `{"data": [...]}` envelope; anything else (including an
/// empty list) passes through unchanged.
fn extract_latest(body: Value, policy: LatestPolicy) -> Value {
    let items = match &body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            _ => return body,
        },
        _ => return body,
    };
    if items.is_empty() {
        return body;
    }
    match policy {
        LatestPolicy::First => items[0].clone(),
        LatestPolicy::Last => items[items.len() - 1].clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn latest_picks_first_or_last_of_bare_array() {
        let body = json!(["a", "b", "c"]);
        assert_eq!(extract_latest(body.clone(), LatestPolicy::First), json!("a"));
        assert_eq!(extract_latest(body, LatestPolicy::Last), json!("c"));
    }

    #[test]
    fn latest_unwraps_data_envelope() {
        let body = json!({"data": [{"id": 1}, {"id": 2}]});
        assert_eq!(
            extract_latest(body, LatestPolicy::Last),
            json!({"id": 2})
        );
    }

    #[test]
    fn latest_leaves_non_lists_and_empty_lists_alone() {
        let scalar = json!(42);
        assert_eq!(extract_latest(scalar.clone(), LatestPolicy::Last), scalar);

        let empty = json!([]);
        assert_eq!(extract_latest(empty.clone(), LatestPolicy::First), empty);

        let plain = json!({"status": "ok"});
        assert_eq!(extract_latest(plain.clone(), LatestPolicy::Last), plain);
    }
}
