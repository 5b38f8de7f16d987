//! Wire types for the content API
//!
//! Strictly typed counterparts of the JSON the API serves: the root
//! document listing refs, and the search response envelope. Unknown
//! fields are ignored; fields the rest of the crate reads are typed
//! here so a shape mismatch fails decoding instead of propagating.

use serde::Deserialize;

use crate::content::richtext::Block;

/// API root document
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    pub refs: Vec<ApiRef>,
}

/// One repository snapshot ref
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default, rename = "isMasterRef")]
    pub is_master_ref: bool,
}

/// Envelope returned by the document search endpoint
///
/// `next_page` is the opaque absolute URL of the following page, null on
/// the last one.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub next_page: Option<String>,
    pub results: Vec<Document>,
}

/// One document as served by the search endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub id: String,
    pub uid: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub first_publication_date: Option<String>,
    pub data: DocumentData,
}

/// The custom-type payload of a post document
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentData {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub author: Option<String>,
    pub banner: Option<Banner>,
    #[serde(default)]
    pub content: Vec<ContentSection>,
}

/// Image field carrying the CDN URL
#[derive(Debug, Clone, Deserialize)]
pub struct Banner {
    pub url: Option<String>,
}

/// One heading-plus-body group of the post content
#[derive(Debug, Clone, Deserialize)]
pub struct ContentSection {
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_search_response() {
        let body = r#"{
            "page": 1,
            "total_pages": 2,
            "next_page": "https://repo.cdn.prismic.io/api/v2/documents/search?ref=r&page=2",
            "results": [{
                "id": "XyZ123",
                "uid": "my-post",
                "type": "posts",
                "first_publication_date": "2021-04-15T19:25:28+0000",
                "data": {
                    "title": "My post",
                    "subtitle": "On things",
                    "author": "Ada Lovelace"
                }
            }]
        }"#;
        let response: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(response.next_page.is_some());
        assert_eq!(response.results[0].uid.as_deref(), Some("my-post"));
        assert_eq!(response.results[0].data.title.as_deref(), Some("My post"));
    }

    #[test]
    fn test_decode_refs() {
        let body = r#"{
            "refs": [
                {"id": "master", "ref": "abc~def", "label": "Master", "isMasterRef": true},
                {"id": "draft", "ref": "xyz", "label": "Draft"}
            ]
        }"#;
        let info: ApiInfo = serde_json::from_str(body).unwrap();
        assert_eq!(info.refs.len(), 2);
        assert!(info.refs[0].is_master_ref);
        assert!(!info.refs[1].is_master_ref);
        assert_eq!(info.refs[0].reference, "abc~def");
    }

    #[test]
    fn test_malformed_results_rejected() {
        // results must be an array of documents, not scalars
        let body = r#"{"next_page": null, "results": [42]}"#;
        assert!(serde_json::from_str::<SearchResponse>(body).is_err());
    }
}
