//! Initialize a new Comet site

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::Comet;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        anyhow::bail!("Already initialized: {:?}", config_path);
    }

    // Create directory structure
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("static"))?;

    // Create default _config.yml
    let config_content = r#"# Comet Configuration

# Site
title: Comet
description: ''
author: John Doe
language: en

# URL
url: http://example.com
root: /

# Directory
public_dir: public
static_dir: static
post_dir: post

# Content API
api:
  endpoint: https://your-repository.cdn.prismic.io/api/v2
  document_type: posts
  page_size: 20
  # access_token: ''

# Presentation
date_format: dd MMM yyyy
load_more_text: Load more posts
# logo: /images/logo.svg
meta_generator: true

# Incremental revalidation interval in seconds (0 disables it)
revalidate: 1800
"#;

    fs::write(&config_path, config_content)?;

    Ok(())
}

/// Run the init command with an existing Comet instance
pub fn run(app: &Comet) -> Result<()> {
    init_site(&app.base_dir)
}
