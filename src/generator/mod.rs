//! Generator module - builds the static site from the content API

use anyhow::Result;
use std::fs;

use walkdir::WalkDir;

use crate::api::ContentApi;
use crate::cache::BuildStamp;
use crate::content::Post;
use crate::feed::PostFeed;
use crate::helpers::{escape_xml, full_post_url, strip_invalid_xml_chars, url_for};
use crate::templates::{PostCard, PostView, SiteData, TemplateRenderer, FEED_SCRIPT, STYLESHEET};
use crate::Comet;

/// Number of posts carried in the Atom feed
const FEED_LIMIT: usize = 20;

/// Static site generator backed by the content API
pub struct Generator {
    app: Comet,
    renderer: TemplateRenderer,
    site: SiteData,
}

impl Generator {
    /// Create a new generator
    pub fn new(app: &Comet) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let site = SiteData::from_config(&app.config);

        Ok(Self {
            app: app.clone(),
            renderer,
            site,
        })
    }

    /// Generate the entire site
    ///
    /// The index page is built from the first feed page only; the
    /// remaining pages are walked to generate every post page and the
    /// Atom feed. Returns the first-page feed, which is the state the
    /// preview server starts from.
    pub async fn generate(&self, api: &ContentApi) -> Result<PostFeed> {
        fs::create_dir_all(&self.app.public_dir)?;

        self.copy_static_assets()?;
        self.write_embedded_assets()?;

        // Initial data load
        let initial = api.fetch_posts().await?;
        tracing::info!(
            "Fetched {} posts (more available: {})",
            initial.posts.len(),
            initial.has_more()
        );
        let feed = PostFeed::new(initial);

        self.generate_index(&feed)?;

        // Walk the full feed for post pages and the Atom feed
        let full = feed.clone().load_all(api).await?;

        for summary in full.posts() {
            let post = api.fetch_post(&summary.uid).await?;
            self.generate_post_page(&post)?;
        }
        tracing::info!("Generated {} post pages", full.posts().len());

        self.generate_atom_feed(&full)?;
        self.generate_not_found()?;

        BuildStamp::now(full.posts().len()).save(&self.app.base_dir)?;

        Ok(feed)
    }

    /// Render and write the index page
    pub fn generate_index(&self, feed: &PostFeed) -> Result<()> {
        let cards: Vec<PostCard> = feed
            .posts()
            .iter()
            .map(|post| PostCard::from_summary(&self.app.config, post))
            .collect();

        let html = self
            .renderer
            .render_index(&self.site, &cards, feed.has_more())?;
        fs::write(self.app.public_dir.join("index.html"), html)?;
        tracing::info!("Generated index page");

        Ok(())
    }

    /// Render feed cards for the posts appended after index `from`
    ///
    /// Used by the preview server to answer load-more requests with the
    /// same markup the index page is built from.
    pub fn render_new_cards(&self, feed: &PostFeed, from: usize) -> Result<String> {
        let start = from.min(feed.posts().len());
        let cards: Vec<PostCard> = feed.posts()[start..]
            .iter()
            .map(|post| PostCard::from_summary(&self.app.config, post))
            .collect();

        self.renderer.render_cards(&cards)
    }

    /// Render and write one post page under the post directory
    pub fn generate_post_page(&self, post: &Post) -> Result<()> {
        let view = PostView::from_post(&self.app.config, post);
        let html = self.renderer.render_post(&self.site, &view)?;

        let output_path = self
            .app
            .public_dir
            .join(self.app.config.post_dir.trim_matches('/'))
            .join(&post.uid)
            .join("index.html");
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated post page: {}", post.uid);

        Ok(())
    }

    /// Generate the Atom feed from the fully loaded post list
    fn generate_atom_feed(&self, feed: &PostFeed) -> Result<()> {
        let config = &self.app.config;
        let base_url = config.url.trim_end_matches('/');

        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        out.push('\n');
        out.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        out.push('\n');
        out.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        out.push_str(&format!(
            "  <link href=\"{}{}\" rel=\"self\"/>\n",
            base_url,
            url_for(config, "atom.xml")
        ));
        out.push_str(&format!(
            "  <link href=\"{}{}\"/>\n",
            base_url,
            url_for(config, "")
        ));
        out.push_str(&format!(
            "  <updated>{}</updated>\n",
            chrono::Utc::now().to_rfc3339()
        ));
        out.push_str(&format!("  <id>{}{}</id>\n", base_url, url_for(config, "")));
        out.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        for post in feed.posts().iter().take(FEED_LIMIT) {
            let link = full_post_url(config, &post.uid);
            out.push_str("  <entry>\n");
            out.push_str(&format!(
                "    <title>{}</title>\n",
                escape_xml(&strip_invalid_xml_chars(&post.title))
            ));
            out.push_str(&format!("    <link href=\"{}\"/>\n", link));
            out.push_str(&format!("    <id>{}</id>\n", link));
            if let Some(date) = post.publication_date {
                out.push_str(&format!(
                    "    <published>{}</published>\n",
                    date.to_rfc3339()
                ));
                out.push_str(&format!("    <updated>{}</updated>\n", date.to_rfc3339()));
            }
            out.push_str(&format!(
                "    <summary>{}</summary>\n",
                escape_xml(&strip_invalid_xml_chars(&post.subtitle))
            ));
            out.push_str(&format!(
                "    <author><name>{}</name></author>\n",
                escape_xml(&post.author)
            ));
            out.push_str("  </entry>\n");
        }

        out.push_str("</feed>\n");

        fs::write(self.app.public_dir.join("atom.xml"), out)?;
        tracing::info!("Generated atom.xml");

        Ok(())
    }

    /// Generate the 404 page
    fn generate_not_found(&self) -> Result<()> {
        let html = self.renderer.render_not_found(&self.site)?;
        fs::write(self.app.public_dir.join("404.html"), html)?;
        Ok(())
    }

    /// Write the embedded stylesheet and browser script
    fn write_embedded_assets(&self) -> Result<()> {
        let css_dir = self.app.public_dir.join("css");
        fs::create_dir_all(&css_dir)?;
        fs::write(css_dir.join("comet.css"), STYLESHEET)?;

        let js_dir = self.app.public_dir.join("js");
        fs::create_dir_all(&js_dir)?;
        fs::write(js_dir.join("feed.js"), FEED_SCRIPT)?;

        Ok(())
    }

    /// Copy files from the static directory into the public directory
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = &self.app.static_dir;
        if !static_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(static_dir)?;
                let dest = self.app.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }
}
