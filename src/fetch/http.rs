use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::{Category, FetchError, Transport};
use crate::config::Config;
use crate::logging::{log, obj, v_str, Domain, Level};

/// GET against `<api_base><category>` with reqwest.
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(cfg: &Config) -> Self {
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.http_timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            client: builder.build().unwrap_or_else(|err| {
                log(
                    Level::Warn,
                    Domain::System,
                    "http_client_default",
                    obj(&[
                        ("msg", v_str("client builder failed; using defaults without timeout")),
                        ("detail", v_str(&err.to_string())),
                    ]),
                );
                Client::new()
            }),
            base: cfg.api_base.clone(),
        }
    }

    pub fn endpoint(&self, category: Category) -> Result<Url, FetchError> {
        self.base
            .join(category.relative())
            .map_err(|e| FetchError::Transport {
                category,
                detail: e.to_string(),
            })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, category: Category) -> Result<Vec<u8>, FetchError> {
        let url = self.endpoint(category)?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            category,
            detail: e.to_string(),
        };

        let resp = self.client.get(url).send().await.map_err(transport)?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                category,
                status: resp.status().as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }
}
