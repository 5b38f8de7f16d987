//! Content API client
//!
//! Speaks the Prismic-style REST wire format: a root document listing
//! repository refs, and a `documents/search` endpoint scoped by the
//! master ref. Next-page cursors returned by the search endpoint are
//! absolute URLs and are requested verbatim, never parsed or rebuilt.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ApiConfig;
use crate::content::{Post, PostPage, PostSummary};

use super::error::{ApiError, Result};
use super::types::{ApiInfo, SearchResponse};

/// Client for a Prismic-style content API
#[derive(Debug, Clone)]
pub struct ContentApi {
    client: Client,
    endpoint: Url,
    document_type: String,
    page_size: usize,
    access_token: Option<String>,
}

impl ContentApi {
    /// Build a client from the configured endpoint
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let endpoint =
            Url::parse(&config.endpoint).map_err(|source| ApiError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                source,
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("comet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| ApiError::Client { source })?;

        Ok(Self {
            client,
            endpoint,
            document_type: config.document_type.clone(),
            page_size: config.page_size,
            access_token: config.access_token.clone(),
        })
    }

    /// Fetch the first page of posts for the configured document type
    pub async fn fetch_posts(&self) -> Result<PostPage> {
        let reference = self.master_ref().await?;
        let mut query = vec![
            ("ref", reference),
            (
                "q",
                format!(r#"[[at(document.type,"{}")]]"#, self.document_type),
            ),
            ("pageSize", self.page_size.to_string()),
        ];
        if let Some(token) = &self.access_token {
            query.push(("access_token", token.clone()));
        }

        let response: SearchResponse = self.get_json(&self.search_url(), &query).await?;
        page_from(response)
    }

    /// Fetch the page behind a next-page cursor
    ///
    /// The cursor is an opaque absolute URL supplied by the API and is
    /// used as the request target unchanged.
    pub async fn fetch_more(&self, cursor: &str) -> Result<PostPage> {
        let response: SearchResponse = self.get_json(cursor, &[]).await?;
        page_from(response)
    }

    /// Fetch one post by its uid
    pub async fn fetch_post(&self, uid: &str) -> Result<Post> {
        let reference = self.master_ref().await?;
        let mut query = vec![
            ("ref", reference),
            (
                "q",
                format!(r#"[[at(my.{}.uid,"{}")]]"#, self.document_type, uid),
            ),
            ("pageSize", "1".to_string()),
        ];
        if let Some(token) = &self.access_token {
            query.push(("access_token", token.clone()));
        }

        let response: SearchResponse = self.get_json(&self.search_url(), &query).await?;
        let doc = response.results.first().ok_or_else(|| ApiError::NotFound {
            uid: uid.to_string(),
        })?;
        Post::from_document(doc)
    }

    /// Resolve the master ref from the API root
    async fn master_ref(&self) -> Result<String> {
        let url = self.root_url();
        let info: ApiInfo = self.get_json(&url, &[]).await?;
        info.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or(ApiError::NoMasterRef { url })
    }

    fn root_url(&self) -> String {
        self.endpoint.as_str().trim_end_matches('/').to_string()
    }

    fn search_url(&self) -> String {
        format!("{}/documents/search", self.root_url())
    }

    /// GET a URL and decode the JSON body
    ///
    /// The body is read as text first so decode failures carry the URL
    /// alongside the serde error.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Normalize a search response into a page of post summaries
fn page_from(response: SearchResponse) -> Result<PostPage> {
    let posts = response
        .results
        .iter()
        .map(PostSummary::from_document)
        .collect::<Result<Vec<_>>>()?;

    Ok(PostPage {
        next_cursor: response.next_page,
        posts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_config(endpoint: String) -> ApiConfig {
        ApiConfig {
            endpoint,
            ..Default::default()
        }
    }

    fn api_for(server: &MockServer) -> ContentApi {
        ContentApi::new(&api_config(format!("{}/api/v2", server.uri()))).unwrap()
    }

    fn refs_body() -> serde_json::Value {
        json!({
            "refs": [
                {"id": "draft", "ref": "draft-ref", "label": "Draft"},
                {"id": "master", "ref": "master-ref", "label": "Master", "isMasterRef": true}
            ]
        })
    }

    fn doc(uid: &str, title: &str) -> serde_json::Value {
        json!({
            "id": format!("X{uid}"),
            "uid": uid,
            "type": "posts",
            "first_publication_date": "2021-04-15T19:25:28+0000",
            "data": {
                "title": title,
                "subtitle": "a subtitle",
                "author": "Ada Lovelace"
            }
        })
    }

    async fn mount_refs(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(refs_body()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_fetch_posts_scopes_query_to_master_ref() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "master-ref"))
            .and(query_param("q", r#"[[at(document.type,"posts")]]"#))
            .and(query_param("pageSize", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [doc("first-post", "First post")]
            })))
            .mount(&server)
            .await;

        let page = api_for(&server).fetch_posts().await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].uid, "first-post");
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_fetch_more_requests_cursor_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("ref", "master-ref"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [doc("second-post", "Second post")]
            })))
            .mount(&server)
            .await;

        let cursor = format!(
            "{}/api/v2/documents/search?ref=master-ref&page=2",
            server.uri()
        );
        let page = api_for(&server).fetch_more(&cursor).await.unwrap();
        assert_eq!(page.posts.len(), 1);
        assert_eq!(page.posts[0].uid, "second-post");
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_fetch_post_by_uid() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("q", r#"[[at(my.posts.uid,"first-post")]]"#))
            .and(query_param("pageSize", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [{
                    "id": "Xfirst",
                    "uid": "first-post",
                    "type": "posts",
                    "first_publication_date": "2021-04-15T19:25:28+0000",
                    "data": {
                        "title": "First post",
                        "subtitle": "a subtitle",
                        "author": "Ada Lovelace",
                        "banner": {"url": "https://images.example.com/banner.png"},
                        "content": [{
                            "heading": "Intro",
                            "body": [{"type": "paragraph", "text": "Hello.", "spans": []}]
                        }]
                    }
                }]
            })))
            .mount(&server)
            .await;

        let post = api_for(&server).fetch_post("first-post").await.unwrap();
        assert_eq!(post.uid, "first-post");
        assert_eq!(post.title, "First post");
        assert_eq!(
            post.banner_url.as_deref(),
            Some("https://images.example.com/banner.png")
        );
        assert_eq!(post.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_post_not_found() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": []
            })))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_post("ghost").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_reported_with_status() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_posts().await.unwrap_err();
        match err {
            ApiError::Status { status, .. } => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_a_decode_error() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_posts().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_missing_master_ref() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refs": []})))
            .mount(&server)
            .await;

        let err = api_for(&server).fetch_posts().await.unwrap_err();
        assert!(matches!(err, ApiError::NoMasterRef { .. }));
    }

    #[tokio::test]
    async fn test_access_token_forwarded() {
        let server = MockServer::start().await;
        mount_refs(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/documents/search"))
            .and(query_param("access_token", "sekrit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": []
            })))
            .mount(&server)
            .await;

        let mut config = api_config(format!("{}/api/v2", server.uri()));
        config.access_token = Some("sekrit".to_string());
        let api = ContentApi::new(&config).unwrap();
        let page = api.fetch_posts().await.unwrap();
        assert!(page.posts.is_empty());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let err = ContentApi::new(&api_config("not a url".to_string())).unwrap_err();
        assert!(matches!(err, ApiError::InvalidEndpoint { .. }));
    }
}
