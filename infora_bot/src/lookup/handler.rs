use std::time::Duration;

use anyhow::{Result, anyhow};
use futures::future::join;
use reqwest::Client;
use serde_json::{Value, json};

use crate::lookup::dto::NumberReport;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct Lookup {
    client: Client,
    name_finder_url: String,
    aadhaar_finder_url: String,
}

impl Lookup {
    /// The configured URLs are complete except for the target, which is
    /// appended url-encoded.
    pub fn new(name_finder_url: String, aadhaar_finder_url: String) -> Self {
        Self {
            client: Client::new(),
            name_finder_url,
            aadhaar_finder_url,
        }
    }

    /// Query both providers concurrently and settle each independently. At
    /// least one answer makes a report; `Err` means neither provider could
    /// be reached and the caller should refund the charge.
    pub async fn lookup_number(&self, phone: &str) -> Result<NumberReport> {
        let (name_result, aadhaar_result) = join(
            self.fetch(&self.name_finder_url, phone),
            self.fetch(&self.aadhaar_finder_url, phone),
        )
        .await;

        if name_result.is_err() && aadhaar_result.is_err() {
            return Err(anyhow!("all lookup providers failed"));
        }
        Ok(NumberReport {
            phone_number: phone.to_string(),
            name_finder: settle(name_result),
            aadhaar_info: settle(aadhaar_result),
        })
    }

    async fn fetch(&self, base_url: &str, phone: &str) -> Result<Value> {
        let url = format!("{}{}", base_url, urlencoding::encode(phone));
        let response = self.client.get(&url).timeout(LOOKUP_TIMEOUT).send().await?;
        let status = response.status();
        if !status.is_success() {
            log::warn!("lookup provider returned status {}", status);
            return Err(anyhow!("lookup provider returned status {}", status));
        }
        // Some providers answer JSON under a text/plain content type; read
        // the body and parse it ourselves, keeping raw text as a fallback.
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(body)),
        }
    }
}

fn settle(result: Result<Value>) -> Value {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lookup_against(server: &MockServer) -> Lookup {
        Lookup::new(
            format!("{}/name?number=", server.uri()),
            format!("{}/aadhaar?number=", server.uri()),
        )
    }

    #[tokio::test]
    async fn test_report_with_both_providers_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "TEST" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/aadhaar"))
            .respond_with(ResponseTemplate::new(200).set_body_string("plain text answer"))
            .mount(&server)
            .await;

        let report = lookup_against(&server).lookup_number("6295533968").await.unwrap();
        assert_eq!(report.phone_number, "6295533968");
        assert_eq!(report.name_finder["name"], "TEST");
        assert_eq!(
            report.aadhaar_info,
            Value::String("plain text answer".to_string())
        );
        assert_eq!(report.outcome_summary(), "name:ok aadhaar:ok");
    }

    #[tokio::test]
    async fn test_single_provider_failure_is_embedded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/name"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "TEST" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/aadhaar"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let report = lookup_against(&server).lookup_number("6295533968").await.unwrap();
        assert!(report.aadhaar_info.get("error").is_some());
        assert_eq!(report.outcome_summary(), "name:ok aadhaar:failed");
    }

    #[tokio::test]
    async fn test_both_providers_down_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(lookup_against(&server).lookup_number("6295533968").await.is_err());
    }
}
