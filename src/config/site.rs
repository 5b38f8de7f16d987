//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::helpers::Locale;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,

    // URL
    pub url: String,
    pub root: String,

    // Directory
    pub public_dir: String,
    pub static_dir: String,
    pub post_dir: String,

    // Presentation
    pub date_format: String,
    pub load_more_text: String,
    pub logo: Option<String>,

    // Meta
    pub meta_generator: bool,

    // Seconds before generated pages are considered stale
    pub revalidate: u64,

    // Content API
    #[serde(default)]
    pub api: ApiConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Comet".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),

            url: "http://example.com".to_string(),
            root: "/".to_string(),

            public_dir: "public".to_string(),
            static_dir: "static".to_string(),
            post_dir: "post".to_string(),

            date_format: "dd MMM yyyy".to_string(),
            load_more_text: "Load more posts".to_string(),
            logo: None,

            meta_generator: true,

            revalidate: 1800,

            api: ApiConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Month-name locale derived from the configured language
    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.language)
    }
}

/// Content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. https://myrepo.cdn.prismic.io/api/v2
    pub endpoint: String,
    pub document_type: String,
    pub page_size: usize,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            document_type: "posts".to_string(),
            page_size: 20,
            access_token: None,
            timeout_secs: 30,
        }
    }
}
