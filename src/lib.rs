//! comet: A static blog generator for Prismic-style headless content APIs
//!
//! This crate builds a blog as static HTML from documents served by a
//! headless content API, and ships a preview server that keeps the
//! generated pages fresh and answers load-more requests.

pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod content;
pub mod feed;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The main Comet application
#[derive(Clone)]
pub struct Comet {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
    /// Static assets directory
    pub static_dir: std::path::PathBuf,
}

impl Comet {
    /// Create a new Comet instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(config, base_dir))
    }

    /// Create an instance from an already built configuration
    pub fn with_config<P: AsRef<Path>>(config: config::SiteConfig, base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let static_dir = base_dir.join(&config.static_dir);

        Self {
            config,
            base_dir,
            public_dir,
            static_dir,
        }
    }

    /// Build a content API client from the configuration
    pub fn api(&self) -> std::result::Result<api::ContentApi, api::ApiError> {
        api::ContentApi::new(&self.config.api)
    }

    /// Initialize a new site
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean generated output
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
