//! HTTP implementation of the processing service.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::core::ClientConfig;
use crate::{BenchError, BenchResult};

use super::traits::{
    BenchmarkService, QueueStatusResponse, ServerResult, SubmitForm, SubmitResponse,
};

/// Talks to the processing server over HTTP.
///
/// Endpoints, relative to the configured API base:
/// - `POST benchmark/submit` (multipart)
/// - `GET queue-status/{task_id}`
/// - `GET benchmark/result/{task_id}`
#[derive(Debug, Clone)]
pub struct HttpService {
    client: Client,
    base: Url,
}

impl HttpService {
    pub fn new(config: &ClientConfig) -> BenchResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(HttpService {
            client,
            base: config.base_url()?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> BenchResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BenchError::Config(format!("api url '{}' cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> BenchResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(BenchError::Status {
                operation,
                status: status.as_u16(),
            });
        }
        response.json::<T>().await.map_err(|e| BenchError::Decode {
            operation,
            reason: e.to_string(),
        })
    }
}

impl BenchmarkService for HttpService {
    async fn submit(&self, form: SubmitForm) -> BenchResult<SubmitResponse> {
        let url = self.endpoint(&["benchmark", "submit"])?;
        let fields = form.text_fields();
        let part = Part::bytes(form.file.bytes).file_name(form.file.name);
        let mut multipart = Form::new().part("file", part);
        for (name, value) in fields {
            multipart = multipart.text(name, value);
        }

        tracing::debug!(%url, file_type = %form.file_type, "submitting benchmark");
        let response = self.client.post(url).multipart(multipart).send().await?;
        Self::decode("submit", response).await
    }

    async fn queue_status(&self, task_id: &str) -> BenchResult<QueueStatusResponse> {
        let url = self.endpoint(&["queue-status", task_id])?;
        let response = self.client.get(url).send().await?;
        Self::decode("queue-status", response).await
    }

    async fn fetch_result(&self, task_id: &str) -> BenchResult<ServerResult> {
        let url = self.endpoint(&["benchmark", "result", task_id])?;
        let response = self.client.get(url).send().await?;
        Self::decode("result", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(api_url: &str) -> HttpService {
        let config = ClientConfig {
            api_url: api_url.to_string(),
            ..ClientConfig::default()
        };
        HttpService::new(&config).unwrap()
    }

    #[test]
    fn test_endpoints_under_default_base() {
        let svc = service("/api");
        assert_eq!(
            svc.endpoint(&["benchmark", "submit"]).unwrap().as_str(),
            "http://localhost:8000/api/benchmark/submit"
        );
        assert_eq!(
            svc.endpoint(&["queue-status", "t1"]).unwrap().as_str(),
            "http://localhost:8000/api/queue-status/t1"
        );
    }

    #[test]
    fn test_task_id_is_escaped() {
        let svc = service("http://bench.local/v2/");
        assert_eq!(
            svc.endpoint(&["benchmark", "result", "a/b c"]).unwrap().as_str(),
            "http://bench.local/v2/benchmark/result/a%2Fb%20c"
        );
    }
}
