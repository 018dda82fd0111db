//! Thin client for the AWX v2 REST API.
//!
//! Every write goes through a find-then-create (or find-then-PATCH) pair,
//! so running the same setup twice converges instead of duplicating
//! resources.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{AwxError, AwxResult};

/// Minimal shape of any named AWX resource.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<Resource>,
}

pub struct AwxClient {
    http: reqwest::Client,
    base: Url,
    username: String,
    password: String,
}

impl AwxClient {
    pub fn new(host: &str, username: &str, password: &str) -> AwxResult<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(host)?,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// `/api/v2/<endpoint>/` under the controller base URL.
    fn api_url(&self, endpoint: &str) -> AwxResult<Url> {
        Ok(self.base.join(&format!("/api/v2/{endpoint}/"))?)
    }

    async fn check(&self, endpoint: &str, response: Response) -> AwxResult<Response> {
        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AwxError::Api {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        })
    }

    /// First resource with the given name, if any.
    pub async fn find_by_name(&self, endpoint: &str, name: &str) -> AwxResult<Option<Resource>> {
        let url = self.api_url(endpoint)?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("name", name)])
            .send()
            .await?;
        let response = self.check(endpoint, response).await?;
        let list: ListResponse = response.json().await?;
        Ok(list.results.into_iter().next())
    }

    pub async fn post(&self, endpoint: &str, body: &Value) -> AwxResult<Resource> {
        let url = self.api_url(endpoint)?;
        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await?;
        let response = self.check(endpoint, response).await?;
        Ok(response.json().await?)
    }

    pub async fn patch(&self, endpoint: &str, body: &Value) -> AwxResult<Resource> {
        let url = self.api_url(endpoint)?;
        let response = self
            .http
            .patch(url)
            .basic_auth(&self.username, Some(&self.password))
            .json(body)
            .send()
            .await?;
        let response = self.check(endpoint, response).await?;
        Ok(response.json().await?)
    }

    /// Reuse the named resource or create it.
    pub async fn get_or_create(
        &self,
        endpoint: &str,
        name: &str,
        body: &Value,
    ) -> AwxResult<Resource> {
        if let Some(existing) = self.find_by_name(endpoint, name).await? {
            info!(endpoint, name, id = existing.id, "resource exists");
            return Ok(existing);
        }
        let created = self.post(endpoint, body).await?;
        info!(endpoint, name, id = created.id, "resource created");
        Ok(created)
    }

    /// Reuse and PATCH the named resource to the wanted settings, or create
    /// it.
    pub async fn converge(&self, endpoint: &str, name: &str, body: &Value) -> AwxResult<Resource> {
        if let Some(existing) = self.find_by_name(endpoint, name).await? {
            debug!(endpoint, name, id = existing.id, "patching existing resource");
            let patched = self
                .patch(&format!("{endpoint}/{}", existing.id), body)
                .await?;
            info!(endpoint, name, id = patched.id, "resource updated");
            return Ok(patched);
        }
        let created = self.post(endpoint, body).await?;
        info!(endpoint, name, id = created.id, "resource created");
        Ok(created)
    }

    /// The stock "Demo Inventory", else the first inventory defined.
    pub async fn fallback_inventory(&self) -> AwxResult<Resource> {
        if let Some(demo) = self.find_by_name("inventories", "Demo Inventory").await? {
            info!(id = demo.id, "using the demo inventory");
            return Ok(demo);
        }
        let url = self.api_url("inventories")?;
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        let response = self.check("inventories", response).await?;
        let list: ListResponse = response.json().await?;
        let first = list.results.into_iter().next().ok_or(AwxError::NoInventory)?;
        info!(id = first.id, name = first.name, "using the first inventory");
        Ok(first)
    }

    /// Launch a job template; returns the job id.
    pub async fn launch(&self, template: &Resource) -> AwxResult<u64> {
        let job = self
            .post(
                &format!("job_templates/{}/launch", template.id),
                &Value::Object(Default::default()),
            )
            .await?;
        info!(template = template.name, job = job.id, "job launched");
        Ok(job.id)
    }

    pub fn host(&self) -> &Url {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_urls_are_rooted_and_trailing_slashed() {
        let client = AwxClient::new("http://awx.example:8080", "admin", "pw").unwrap();
        assert_eq!(
            client.api_url("projects").unwrap().as_str(),
            "http://awx.example:8080/api/v2/projects/"
        );
        assert_eq!(
            client.api_url("job_templates/7/launch").unwrap().as_str(),
            "http://awx.example:8080/api/v2/job_templates/7/launch/"
        );
    }

    #[test]
    fn base_paths_are_replaced_not_joined() {
        // The controller may be port-forwarded under a bare host; a stray
        // path on the base URL must not leak into API calls.
        let client = AwxClient::new("http://localhost:8080/some/ui/path", "admin", "pw").unwrap();
        assert_eq!(
            client.api_url("inventories").unwrap().as_str(),
            "http://localhost:8080/api/v2/inventories/"
        );
    }

    #[test]
    fn bad_host_is_rejected_up_front() {
        assert!(AwxClient::new("not a url", "admin", "pw").is_err());
    }

    #[test]
    fn list_parsing_takes_the_first_result() {
        let raw = r#"{"count":2,"results":[{"id":3,"name":"a"},{"id":4,"name":"b"}]}"#;
        let list: ListResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(list.results[0].id, 3);
        let raw = r#"{"count":0,"results":[]}"#;
        let list: ListResponse = serde_json::from_str(raw).unwrap();
        assert!(list.results.is_empty());
    }
}
