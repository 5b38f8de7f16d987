//! Built-in site templates using the Tera template engine
//!
//! All templates are embedded directly in the binary. Autoescaping is
//! off; every value placed into a context is escaped (or deliberately
//! raw HTML) when the context is built, so the templates stay plain.

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{richtext, Post, PostSummary};
use crate::helpers::{html_escape, meta_generator, post_url, time_tag, url_for};

/// Embedded stylesheet, written to `css/comet.css` at generation
pub const STYLESHEET: &str = include_str!("builtin/comet.css");

/// Embedded load-more browser script, written to `js/feed.js`
pub const FEED_SCRIPT: &str = include_str!("builtin/feed.js");

/// Template renderer with the embedded templates loaded
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Values are escaped at context-build time
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("builtin/layout.html")),
            ("index.html", include_str!("builtin/index.html")),
            ("post.html", include_str!("builtin/post.html")),
            ("not_found.html", include_str!("builtin/not_found.html")),
            (
                "partials/post_cards.html",
                include_str!("builtin/partials/post_cards.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render the index page
    pub fn render_index(
        &self,
        site: &SiteData,
        cards: &[PostCard],
        has_more: bool,
    ) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("posts", cards);
        context.insert("has_more", &has_more);
        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render post cards alone, as appended by the load-more endpoint
    pub fn render_cards(&self, cards: &[PostCard]) -> Result<String> {
        let mut context = Context::new();
        context.insert("posts", cards);
        Ok(self.tera.render("partials/post_cards.html", &context)?)
    }

    /// Render a full post page
    pub fn render_post(&self, site: &SiteData, post: &PostView) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        context.insert("post", post);
        Ok(self.tera.render("post.html", &context)?)
    }

    /// Render the 404 page
    pub fn render_not_found(&self, site: &SiteData) -> Result<String> {
        let mut context = Context::new();
        context.insert("site", site);
        Ok(self.tera.render("not_found.html", &context)?)
    }
}

/// Data structures for template context

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    pub url: String,
    pub logo: Option<String>,
    pub load_more_text: String,
    pub feed_endpoint: String,
    pub generator_tag: String,
}

impl SiteData {
    /// Build the site context from configuration
    pub fn from_config(config: &SiteConfig) -> Self {
        let mut root = config.root.clone();
        if !root.ends_with('/') {
            root.push('/');
        }

        Self {
            title: html_escape(&config.title),
            description: html_escape(&config.description),
            author: html_escape(&config.author),
            language: config.language.clone(),
            root,
            url: config.url.trim_end_matches('/').to_string(),
            logo: config.logo.clone(),
            load_more_text: html_escape(&config.load_more_text),
            feed_endpoint: url_for(config, "_feed/more"),
            generator_tag: if config.meta_generator {
                meta_generator()
            } else {
                String::new()
            },
        }
    }
}

/// One post card on the index page
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date_html: String,
}

impl PostCard {
    /// Build a card from a summary, escaping CMS-provided text
    pub fn from_summary(config: &SiteConfig, post: &PostSummary) -> Self {
        let date_html = post
            .publication_date
            .map(|date| time_tag(&date, &config.date_format, config.locale()))
            .unwrap_or_default();

        Self {
            uid: post.uid.clone(),
            url: post_url(config, &post.uid),
            title: html_escape(&post.title),
            subtitle: html_escape(&post.subtitle),
            author: html_escape(&post.author),
            date_html,
        }
    }
}

/// One rendered content section of a post page
#[derive(Debug, Clone, Serialize)]
pub struct SectionView {
    pub heading: Option<String>,
    pub body_html: String,
}

/// A full post as rendered on its page
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub author: String,
    pub date_html: String,
    pub reading_minutes: usize,
    pub banner_url: Option<String>,
    pub sections: Vec<SectionView>,
}

impl PostView {
    /// Build the page view from post detail, rendering rich text to HTML
    pub fn from_post(config: &SiteConfig, post: &Post) -> Self {
        let date_html = post
            .publication_date
            .map(|date| time_tag(&date, &config.date_format, config.locale()))
            .unwrap_or_default();

        let sections = post
            .sections
            .iter()
            .map(|section| SectionView {
                heading: section.heading.as_deref().map(html_escape),
                body_html: richtext::as_html(&section.body),
            })
            .collect();

        Self {
            uid: post.uid.clone(),
            url: post_url(config, &post.uid),
            title: html_escape(&post.title),
            author: html_escape(&post.author),
            date_html,
            reading_minutes: post.reading_minutes(),
            banner_url: post.banner_url.as_deref().map(html_escape),
            sections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Section;
    use chrono::{FixedOffset, TimeZone};

    fn config() -> SiteConfig {
        SiteConfig {
            title: "My Blog".to_string(),
            ..Default::default()
        }
    }

    fn summary(uid: &str, title: &str) -> PostSummary {
        PostSummary {
            uid: uid.to_string(),
            publication_date: Some(
                FixedOffset::east_opt(0)
                    .unwrap()
                    .with_ymd_and_hms(2021, 4, 15, 12, 0, 0)
                    .unwrap(),
            ),
            title: title.to_string(),
            subtitle: "a subtitle".to_string(),
            author: "Ada".to_string(),
        }
    }

    #[test]
    fn test_render_index_with_more() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::from_config(&config());
        let cards = vec![PostCard::from_summary(&config(), &summary("p1", "First"))];

        let html = renderer.render_index(&site, &cards, true).unwrap();
        assert!(html.contains("My Blog"));
        assert!(html.contains("First"));
        assert!(html.contains("/post/p1/"));
        assert!(html.contains("15 Apr 2021"));
        assert!(html.contains(r#"id="load-more""#));
        assert!(html.contains("Load more posts"));
        assert!(html.contains("js/feed.js"));
    }

    #[test]
    fn test_render_index_exhausted_offers_no_control() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::from_config(&config());
        let cards = vec![PostCard::from_summary(&config(), &summary("p1", "First"))];

        let html = renderer.render_index(&site, &cards, false).unwrap();
        assert!(!html.contains(r#"id="load-more""#));
        assert!(!html.contains("js/feed.js"));
    }

    #[test]
    fn test_cards_escape_cms_text() {
        let renderer = TemplateRenderer::new().unwrap();
        let cards = vec![PostCard::from_summary(
            &config(),
            &summary("p1", "<script>alert(1)</script>"),
        )];

        let html = renderer.render_cards(&cards).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::from_config(&config());
        let post = Post {
            uid: "p1".to_string(),
            publication_date: None,
            title: "First".to_string(),
            author: "Ada".to_string(),
            banner_url: Some("https://images.example.com/banner.png".to_string()),
            sections: vec![Section {
                heading: Some("Intro".to_string()),
                body: vec![richtext::Block::Paragraph {
                    text: "Hello.".to_string(),
                    spans: vec![],
                }],
            }],
        };

        let html = renderer
            .render_post(&site, &PostView::from_post(&config(), &post))
            .unwrap();
        assert!(html.contains("<h1>First</h1>"));
        assert!(html.contains("https://images.example.com/banner.png"));
        assert!(html.contains("<h2>Intro</h2>"));
        assert!(html.contains("<p>Hello.</p>"));
        assert!(html.contains("1 min"));
    }

    #[test]
    fn test_render_not_found() {
        let renderer = TemplateRenderer::new().unwrap();
        let site = SiteData::from_config(&config());
        let html = renderer.render_not_found(&site).unwrap();
        assert!(html.contains("404"));
    }

    #[test]
    fn test_site_data_normalizes_root() {
        let mut cfg = config();
        cfg.root = "/blog".to_string();
        let site = SiteData::from_config(&cfg);
        assert_eq!(site.root, "/blog/");
        assert_eq!(site.feed_endpoint, "/blog/_feed/more");
    }

    #[test]
    fn test_card_without_date_renders_empty_date() {
        let mut post = summary("p1", "First");
        post.publication_date = None;
        let card = PostCard::from_summary(&config(), &post);
        assert!(card.date_html.is_empty());
    }
}
