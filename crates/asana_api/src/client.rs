use crate::config::AsanaConfig;
use crate::error::{AsanaError, Result};
use crate::models::{DataEnvelope, Project, ProjectRef, Task, User};
use crate::rate_limiter::RateLimiter;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, COOKIE, USER_AGENT};
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

const TASK_OPT_FIELDS: &str = "name,gid,completed,memberships.section.name,memberships.project.gid";
const PROJECT_OPT_FIELDS: &str = "gid,name";
const PROJECT_LIST_LIMIT: &str = "100";

/// Typed client for the Asana web API, authenticated with a browser session
/// cookie sent on every request.
#[derive(Clone)]
pub struct AsanaClient {
    http: HttpClient,
    config: AsanaConfig,
    limiter: RateLimiter,
}

impl AsanaClient {
    pub fn new(config: AsanaConfig) -> Result<Self> {
        let http = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.cooldown);
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn new_with_limiter(config: AsanaConfig, limiter: RateLimiter) -> Result<Self> {
        let http = build_http_client(&config)?;
        Ok(Self {
            http,
            config,
            limiter,
        })
    }

    pub fn config(&self) -> &AsanaConfig {
        &self.config
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    async fn get<T>(&self, path: &str, query: Option<&[(&str, &str)]>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.limiter.hit().await;
        let url = self.url_for(path);
        debug!(path, "asana request");
        let mut request = self.http.get(url);
        if let Some(params) = query {
            request = request.query(params);
        }
        let response = request.send().await?;
        Self::parse_json(response).await
    }

    fn url_for(&self, path: &str) -> String {
        let mut base = self.config.api_root();
        base.push_str(path.trim_start_matches('/'));
        base
    }

    async fn parse_json<T>(response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            response.json::<T>().await.map_err(AsanaError::from)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            Err(AsanaError::Authentication(format!(
                "Access denied ({}) - {}",
                status, body
            )))
        } else if status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            Err(AsanaError::NotFound(body))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(AsanaError::http(status, body))
        }
    }

    /// Fetches the authenticated user's profile. The cheapest live probe of
    /// cookie freshness.
    pub async fn get_me(&self) -> Result<User> {
        let envelope: DataEnvelope<User> = self.get("users/me", None).await?;
        Ok(envelope.data)
    }

    /// Fetches one project; 200 proves the id is valid and accessible.
    pub async fn get_project(&self, project_gid: &str) -> Result<Project> {
        let path = format!("projects/{}", project_gid);
        let envelope: DataEnvelope<Project> = self.get(&path, None).await?;
        Ok(envelope.data)
    }

    /// Lists projects the session can see, compact form.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRef>> {
        let envelope: DataEnvelope<Vec<ProjectRef>> = self
            .get(
                "projects",
                Some(&[
                    ("limit", PROJECT_LIST_LIMIT),
                    ("opt_fields", PROJECT_OPT_FIELDS),
                ]),
            )
            .await?;
        Ok(envelope.data)
    }

    /// Lists a project's tasks with the fields the ticket mapping needs.
    pub async fn list_project_tasks(&self, project_gid: &str) -> Result<Vec<Task>> {
        let path = format!("projects/{}/tasks", project_gid);
        let envelope: DataEnvelope<Vec<Task>> = self
            .get(&path, Some(&[("opt_fields", TASK_OPT_FIELDS)]))
            .await?;
        Ok(envelope.data)
    }
}

fn build_http_client(config: &AsanaConfig) -> Result<HttpClient> {
    let mut headers = HeaderMap::new();

    headers.insert(COOKIE, header_value(config.cookie.clone())?);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    // Asana's web API rejects some requests without this marker.
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );
    headers.insert(USER_AGENT, header_value(config.user_agent.clone())?);

    HttpClient::builder()
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|err| AsanaError::Other(err.to_string()))
}

fn header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|err| AsanaError::Other(err.to_string()))
}
