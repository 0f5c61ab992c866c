//! HTTPS client for the Container Engine REST API

use super::error::ApiError;
use super::models::*;
use super::ContainerEngineApi;
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// API version path segment
const API_VERSION: &str = "20180222";

/// User agent string for nodepoolctl HTTP requests
const USER_AGENT: &str = concat!("nodepoolctl/", env!("CARGO_PKG_VERSION"));

/// Header carrying the id of the work request started by a mutating call
const WORK_REQUEST_HEADER: &str = "opc-work-request-id";

/// Header carrying the cursor of the next page of a list call
const NEXT_PAGE_HEADER: &str = "opc-next-page";

const REQUEST_ID_HEADER: &str = "opc-request-id";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Container Engine API
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ContainerEngineClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

/// Builder for [`ContainerEngineClient`]
#[derive(Debug, Default)]
pub struct ContainerEngineClientBuilder {
    region: Option<String>,
    endpoint: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl ContainerEngineClientBuilder {
    /// Region used to derive the default endpoint, e.g. `us-ashburn-1`
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Explicit endpoint, overriding the region-derived one
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Bearer token sent with every request
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout (default 30s)
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ContainerEngineClient, ApiError> {
        let endpoint = match (self.endpoint, self.region) {
            (Some(endpoint), _) => endpoint,
            (None, Some(region)) => format!("https://containerengine.{region}.oraclecloud.com"),
            (None, None) => {
                return Err(ApiError::InvalidConfig(
                    "either an endpoint or a region is required".to_string(),
                ));
            }
        };

        let mut base_url = Url::parse(&endpoint)
            .map_err(|e| ApiError::InvalidConfig(format!("invalid endpoint '{endpoint}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "endpoint '{endpoint}' cannot be used as a base URL"
            )));
        }
        {
            let mut segments = base_url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidConfig(format!("invalid endpoint '{endpoint}'")))?;
            segments.pop_if_empty().push(API_VERSION);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()?;

        debug!("Container Engine endpoint: {}", base_url);

        Ok(ContainerEngineClient {
            http,
            base_url,
            token: self.token,
        })
    }
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ContainerEngineClient {
    pub fn builder() -> ContainerEngineClientBuilder {
        ContainerEngineClientBuilder::default()
    }

    /// Base URL including the API version segment
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        debug!("Response status: {}", status);

        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::service_error(response).await)
        }
    }

    async fn service_error(response: Response) -> ApiError {
        let status = response.status();
        let request_id = header_value(&response, REQUEST_ID_HEADER);
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ServiceErrorBody>(&body).ok();

        let code = parsed
            .as_ref()
            .and_then(|b| b.code.clone())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        let message = parsed.and_then(|b| b.message).unwrap_or(body);

        ApiError::Service {
            status: status.as_u16(),
            code,
            message,
            request_id,
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn work_request_id(response: &Response) -> Result<WorkRequestId, ApiError> {
        header_value(response, WORK_REQUEST_HEADER)
            .and_then(WorkRequestId::new)
            .ok_or_else(|| {
                ApiError::InvalidResponse(format!("missing {WORK_REQUEST_HEADER} header"))
            })
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl ContainerEngineApi for ContainerEngineClient {
    async fn create_node_pool(
        &self,
        details: &CreateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        let url = self.url(&["nodePools"]);
        let response = self
            .send(self.request(Method::POST, url).json(details))
            .await?;
        Self::work_request_id(&response)
    }

    async fn update_node_pool(
        &self,
        node_pool_id: &str,
        details: &UpdateNodePoolDetails,
    ) -> Result<WorkRequestId, ApiError> {
        let url = self.url(&["nodePools", node_pool_id]);
        let response = self
            .send(self.request(Method::PUT, url).json(details))
            .await?;
        Self::work_request_id(&response)
    }

    async fn delete_node_pool(&self, node_pool_id: &str) -> Result<WorkRequestId, ApiError> {
        let url = self.url(&["nodePools", node_pool_id]);
        let response = self.send(self.request(Method::DELETE, url)).await?;
        Self::work_request_id(&response)
    }

    async fn get_node_pool(&self, node_pool_id: &str) -> Result<NodePool, ApiError> {
        let url = self.url(&["nodePools", node_pool_id]);
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::json(response).await
    }

    async fn list_node_pools(
        &self,
        filter: &NodePoolFilter,
        cursor: Option<&str>,
    ) -> Result<Page<NodePoolSummary>, ApiError> {
        let mut url = self.url(&["nodePools"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("compartmentId", &filter.compartment_id);
            if let Some(cluster_id) = &filter.cluster_id {
                query.append_pair("clusterId", cluster_id);
            }
            if let Some(name) = &filter.name {
                query.append_pair("name", name);
            }
            if let Some(limit) = filter.limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(page) = cursor {
                query.append_pair("page", page);
            }
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        let next_cursor = header_value(&response, NEXT_PAGE_HEADER);
        let items = Self::json(response).await?;
        Ok(Page::new(items, next_cursor))
    }

    async fn get_work_request(&self, id: &WorkRequestId) -> Result<WorkRequest, ApiError> {
        let url = self.url(&["workRequests", id.as_str()]);
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::json(response).await
    }

    async fn list_work_request_errors(
        &self,
        id: &WorkRequestId,
    ) -> Result<Vec<WorkRequestError>, ApiError> {
        let url = self.url(&["workRequests", id.as_str(), "errors"]);
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::json(response).await
    }

    async fn get_node_pool_options(&self, option_id: &str) -> Result<NodePoolOptions, ApiError> {
        let url = self.url(&["nodePoolOptions", option_id]);
        let response = self.send(self.request(Method::GET, url)).await?;
        Self::json(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_endpoint() {
        let client = ContainerEngineClient::builder()
            .region("us-ashburn-1")
            .build()
            .unwrap();
        assert_eq!(
            client.base_url().as_str(),
            "https://containerengine.us-ashburn-1.oraclecloud.com/20180222"
        );
    }

    #[test]
    fn test_endpoint_overrides_region() {
        let client = ContainerEngineClient::builder()
            .region("us-ashburn-1")
            .endpoint("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8080/20180222");
    }

    #[test]
    fn test_missing_endpoint_and_region() {
        let err = ContainerEngineClient::builder().build().unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_endpoint() {
        let err = ContainerEngineClient::builder()
            .endpoint("not a url")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn test_url_escapes_segments() {
        let client = ContainerEngineClient::builder()
            .endpoint("http://localhost")
            .build()
            .unwrap();
        let url = client.url(&["nodePools", "a/b"]);
        assert_eq!(url.as_str(), "http://localhost/20180222/nodePools/a%2Fb");
    }
}
