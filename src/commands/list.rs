//! List site content

use anyhow::Result;

use crate::feed::PostFeed;
use crate::Comet;

/// List every post the API currently serves
pub async fn run(app: &Comet) -> Result<()> {
    let api = app.api()?;
    let feed = PostFeed::new(api.fetch_posts().await?)
        .load_all(&api)
        .await?;

    println!("Posts ({}):", feed.posts().len());
    for post in feed.posts() {
        let date = post
            .publication_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!("  {} - {} [{}]", date, post.title, post.uid);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_walks_every_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/api/v2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "refs": [{"id": "master", "ref": "r1", "label": "Master", "isMasterRef": true}]
            })))
            .mount(&server)
            .await;

        let page2 = format!("{}/api/v2/documents/search?ref=r1&page=2", server.uri());
        Mock::given(method("GET"))
            .and(url_path("/api/v2/documents/search"))
            .and(query_param("q", r#"[[at(document.type,"posts")]]"#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": page2,
                "results": [{
                    "id": "X1", "uid": "one", "type": "posts",
                    "first_publication_date": "2021-04-15T19:25:28+0000",
                    "data": {"title": "One", "subtitle": "s", "author": "a"}
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(url_path("/api/v2/documents/search"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "next_page": null,
                "results": [{
                    "id": "X2", "uid": "two", "type": "posts",
                    "first_publication_date": null,
                    "data": {"title": "Two", "subtitle": "s", "author": "a"}
                }]
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let mut config = SiteConfig::default();
        config.api.endpoint = format!("{}/api/v2", server.uri());
        let app = Comet::with_config(config, dir.path());

        run(&app).await.unwrap();
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }
}
