//! HTTP implementation of [`RemoteSource`] on top of reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;

use super::error::{FetchError, SubmissionError};
use super::{Endpoint, Endpoints, RemoteSource};
use crate::submit::ProductSubmission;

/// Remote data source reached over HTTP with JSON bodies.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    server_url: String,
    endpoints: Endpoints,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Creates a client for `server_url` with a per-request timeout.
    pub fn new(
        server_url: impl Into<String>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            server_url: server_url.into(),
            endpoints,
            client,
        })
    }

    /// Returns the server URL.
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Builds an HTTP URL for a given path.
    fn build_url(&self, path: &str) -> String {
        let base_url = if !self.server_url.starts_with("http://")
            && !self.server_url.starts_with("https://")
        {
            format!("http://{}", self.server_url)
        } else {
            self.server_url.clone()
        };

        let path = path.trim_start_matches('/');
        format!("{}/{}", base_url.trim_end_matches('/'), path)
    }

    /// Create goes to the collection path, update to `<collection>/<id>`.
    fn submission_url(&self, product_id: Option<&str>) -> String {
        let collection = self.build_url(&self.endpoints.products);
        match product_id {
            Some(id) => format!("{}/{}", collection, urlencoding::encode(id)),
            None => collection,
        }
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch_records(&self, endpoint: Endpoint) -> Result<Vec<Value>, FetchError> {
        let url = self.build_url(self.endpoints.path(endpoint));

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Http {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                endpoint: endpoint.to_string(),
                status: response.status().as_u16(),
            });
        }

        let records: Option<Vec<Value>> =
            response.json().await.map_err(|e| FetchError::Decode {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;

        Ok(records.unwrap_or_default())
    }

    async fn submit_product(
        &self,
        product_id: Option<&str>,
        submission: &ProductSubmission,
    ) -> Result<Value, SubmissionError> {
        let url = self.submission_url(product_id);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(submission)
            .send()
            .await
            .map_err(|e| SubmissionError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SubmissionError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| SubmissionError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn remote(url: &str) -> HttpRemote {
        HttpRemote::new(url, Endpoints::default(), Duration::from_secs(5)).unwrap()
    }

    fn submission() -> ProductSubmission {
        ProductSubmission {
            name: "N95".to_string(),
            brand_name: "3M".to_string(),
            price: 120.0,
            origin: "US".to_string(),
            remarks: String::new(),
            rating: 4,
            category: Category::Mask,
            labels: vec!["kids".to_string()],
            device_id: Some("device-1".to_string()),
        }
    }

    #[test]
    fn test_build_url() {
        let with_slash = remote("http://localhost:5000/");
        assert_eq!(
            with_slash.build_url("/products"),
            "http://localhost:5000/products"
        );

        let bare_host = remote("localhost:5000");
        assert_eq!(bare_host.build_url("admin"), "http://localhost:5000/admin");
    }

    #[test]
    fn test_submission_url_encodes_id() {
        let remote = remote("https://api.example.com");
        assert_eq!(remote.submission_url(None), "https://api.example.com/products");
        assert_eq!(
            remote.submission_url(Some("a b")),
            "https://api.example.com/products/a%20b"
        );
    }

    #[tokio::test]
    async fn test_fetch_records() {
        let app = Router::new().route(
            "/products",
            get(|| async { Json(json!([{ "_id": "1", "name": "A" }])) }),
        );
        let url = serve(app).await;

        let records = remote(&url).fetch_records(Endpoint::Products).await.unwrap();
        assert_eq!(records, vec![json!({ "_id": "1", "name": "A" })]);
    }

    #[tokio::test]
    async fn test_fetch_null_body_is_empty() {
        let app = Router::new().route("/admin", get(|| async { Json(Value::Null) }));
        let url = serve(app).await;

        let records = remote(&url).fetch_records(Endpoint::Info).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let app = Router::new().route(
            "/product-comparisons",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = serve(app).await;

        let err = remote(&url)
            .fetch_records(Endpoint::Comparisons)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_fetch_invalid_body() {
        let app = Router::new().route("/favorites", get(|| async { "not json" }));
        let url = serve(app).await;

        let err = remote(&url)
            .fetch_records(Endpoint::Favorites)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_submit_create_and_update() {
        let app = Router::new()
            .route(
                "/products",
                post(|Json(body): Json<Value>| async move {
                    let mut body = body;
                    body["_id"] = json!("new-id");
                    Json(body)
                }),
            )
            .route(
                "/products/{id}",
                post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                    let mut body = body;
                    body["_id"] = json!(id);
                    Json(body)
                }),
            );
        let url = serve(app).await;
        let remote = remote(&url);

        let created = remote.submit_product(None, &submission()).await.unwrap();
        assert_eq!(created["_id"], json!("new-id"));
        assert_eq!(created["brandName"], json!("3M"));
        assert_eq!(created["deviceId"], json!("device-1"));
        assert_eq!(created["category"], json!("mask"));

        let updated = remote.submit_product(Some("p7"), &submission()).await.unwrap();
        assert_eq!(updated["_id"], json!("p7"));
    }

    #[tokio::test]
    async fn test_submit_rejected() {
        let app = Router::new().route("/products", post(|| async { StatusCode::BAD_REQUEST }));
        let url = serve(app).await;

        let err = remote(&url)
            .submit_product(None, &submission())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Status(400)));
    }
}
