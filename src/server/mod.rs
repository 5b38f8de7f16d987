//! Preview server with incremental revalidation
//!
//! Serves the generated tree, answers the load-more endpoint the index
//! page calls, and rebuilds the site in the background once the last
//! build is older than the configured revalidate interval. Requests
//! always get an answer from the pages already on disk; staleness only
//! schedules work, it never blocks.

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, Uri},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::ContentApi;
use crate::cache::{unix_now, BuildStamp};
use crate::config::SiteConfig;
use crate::content::PostPage;
use crate::feed::PostFeed;
use crate::generator::Generator;
use crate::helpers::url_for;
use crate::Comet;

/// Server state
struct ServerState {
    app: Comet,
    api: Option<ContentApi>,
    generator: Generator,
    /// Runtime feed the load-more endpoint appends to
    feed: RwLock<PostFeed>,
    /// Serializes feed merges and feed swaps from regeneration
    feed_lock: Mutex<()>,
    built_at: AtomicU64,
    revalidating: AtomicBool,
}

/// One chunk of rendered feed markup for the load-more script
#[derive(Serialize)]
struct FeedChunk {
    html: String,
    has_more: bool,
}

/// Start the preview server
pub async fn start(app: &Comet, ip: &str, port: u16, open: bool, static_only: bool) -> Result<()> {
    let api = if static_only { None } else { Some(app.api()?) };
    let generator = Generator::new(app)?;

    let feed = if let Some(api) = &api {
        generator.generate(api).await?
    } else {
        let stamp = BuildStamp::load(&app.base_dir).unwrap_or_default();
        if app.config.revalidate > 0 && stamp.is_stale(app.config.revalidate) {
            tracing::warn!(
                "Existing build is older than the revalidate interval ({}s)",
                app.config.revalidate
            );
        }
        tracing::info!("Serving the existing build ({} posts)", stamp.post_count);
        PostFeed::new(PostPage {
            next_cursor: None,
            posts: Vec::new(),
        })
    };

    let state = Arc::new(ServerState {
        app: app.clone(),
        api,
        generator,
        feed: RwLock::new(feed),
        feed_lock: Mutex::new(()),
        built_at: AtomicU64::new(unix_now()),
        revalidating: AtomicBool::new(false),
    });

    let router = build_router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    if !static_only && app.config.revalidate > 0 {
        println!(
            "Revalidating content every {} seconds.",
            app.config.revalidate
        );
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Build the router for the preview server
fn build_router(state: Arc<ServerState>) -> Router {
    let feed_path = url_for(&state.app.config, "_feed/more");

    Router::new()
        .route(&feed_path, get(feed_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for the load-more endpoint
///
/// Appends the next page to the runtime feed and returns the rendered
/// cards for just that page. Returns 204 once the feed is exhausted so
/// the browser script can drop the button. A failed upstream fetch
/// leaves the feed exactly as it was.
async fn feed_handler(State(state): State<Arc<ServerState>>) -> Response {
    let Some(api) = &state.api else {
        return StatusCode::NO_CONTENT.into_response();
    };

    // One merge at a time; concurrent clicks line up here and each one
    // sees the feed its predecessor left behind
    let _guard = state.feed_lock.lock().await;

    let before = state.feed.read().await.clone();
    if !before.has_more() {
        return StatusCode::NO_CONTENT.into_response();
    }

    match before.load_more(api).await {
        Ok(merged) => {
            let html = match state.generator.render_new_cards(&merged, before.posts().len()) {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Failed to render feed chunk: {:#}", e);
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            let has_more = merged.has_more();
            *state.feed.write().await = merged;

            Json(FeedChunk { html, has_more }).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to load more posts: {:#}", e);
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

/// Fallback handler that serves the generated tree
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    maybe_revalidate(&state);

    let path = request.uri().path().to_string();
    let Some(rel) = strip_root(&state.app.config, &path) else {
        return not_found_page(&state).await;
    };
    let rel = rel.to_string();

    let file_path = resolve(&state.app.public_dir, &rel);

    if !file_path.exists() {
        // A post the build never saw may still exist upstream
        if request.method() == Method::GET {
            if let Some(uid) = post_uid_for(&state.app.config, &rel) {
                if let Some(api) = &state.api {
                    return on_demand_post(&state, api, &uid).await;
                }
            }
        }
        return not_found_page(&state).await;
    }

    serve_file(&state, request, &file_path).await
}

/// Kick off a background rebuild when the last build has gone stale
fn maybe_revalidate(state: &Arc<ServerState>) {
    let Some(api) = state.api.clone() else {
        return;
    };
    let interval = state.app.config.revalidate;
    if interval == 0 {
        return;
    }

    let age = unix_now().saturating_sub(state.built_at.load(Ordering::Relaxed));
    if age < interval {
        return;
    }

    // Only one rebuild in flight
    if state.revalidating.swap(true, Ordering::SeqCst) {
        return;
    }

    let state = state.clone();
    tokio::spawn(async move {
        tracing::info!("Content is stale, regenerating in the background");

        let result = async {
            let generator = Generator::new(&state.app)?;
            let feed = generator.generate(&api).await?;

            // Wait for any in-flight merge before swapping the feed
            let _guard = state.feed_lock.lock().await;
            *state.feed.write().await = feed;
            Ok::<_, anyhow::Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                state.built_at.store(unix_now(), Ordering::Relaxed);
                tracing::info!("Regenerated site");
            }
            Err(e) => {
                // Keep serving the previous build; the next request retries
                tracing::error!("Background regeneration failed: {:#}", e);
            }
        }
        state.revalidating.store(false, Ordering::SeqCst);
    });
}

/// Build a missing post page straight from the API
async fn on_demand_post(state: &Arc<ServerState>, api: &ContentApi, uid: &str) -> Response {
    tracing::info!("Post page not built yet, fetching '{}'", uid);

    let post = match api.fetch_post(uid).await {
        Ok(post) => post,
        Err(e) if e.is_not_found() => return not_found_page(state).await,
        Err(e) => {
            tracing::error!("Failed to fetch post '{}': {:#}", uid, e);
            return StatusCode::BAD_GATEWAY.into_response();
        }
    };

    if let Err(e) = state.generator.generate_post_page(&post) {
        tracing::error!("Failed to generate post page '{}': {:#}", uid, e);
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    let page = state
        .app
        .public_dir
        .join(state.app.config.post_dir.trim_matches('/'))
        .join(uid)
        .join("index.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(content) => Html(content).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Serve a resolved file out of the public directory
async fn serve_file(state: &ServerState, request: Request<Body>, file_path: &Path) -> Response {
    let rel = match file_path.strip_prefix(&state.app.public_dir) {
        Ok(rel) => format!("/{}", rel.to_string_lossy()),
        Err(_) => return not_found_page(state).await,
    };

    // Point the request at the resolved file so ServeDir picks the
    // right content type
    let mut request = request;
    match rel.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return not_found_page(state).await,
    }

    let mut service = ServeDir::new(&state.app.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Serve the generated 404 page
async fn not_found_page(state: &ServerState) -> Response {
    match tokio::fs::read_to_string(state.app.public_dir.join("404.html")).await {
        Ok(content) => (StatusCode::NOT_FOUND, Html(content)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Trim the configured root prefix from a request path
///
/// Returns the site-relative path, or None when the request falls
/// outside the root the site is mounted under.
fn strip_root<'a>(config: &SiteConfig, path: &'a str) -> Option<&'a str> {
    let root = config.root.trim_matches('/');
    if root.is_empty() {
        return Some(path);
    }

    let rest = path.trim_start_matches('/').strip_prefix(root)?;
    if rest.is_empty() {
        Some("/")
    } else if rest.starts_with('/') {
        Some(rest)
    } else {
        // "/blogx" must not match a root of "/blog/"
        None
    }
}

/// Map a site-relative request path onto the generated tree
fn resolve(public_dir: &Path, rel: &str) -> PathBuf {
    if rel == "/" {
        return public_dir.join("index.html");
    }

    let clean_path = rel.trim_start_matches('/');
    let candidate = public_dir.join(clean_path);

    // If it's a directory, look for index.html
    if candidate.is_dir() {
        candidate.join("index.html")
    } else if candidate.exists() {
        candidate
    } else {
        // Try adding .html extension
        let with_html = public_dir.join(format!("{}.html", clean_path));
        if with_html.exists() {
            with_html
        } else {
            candidate
        }
    }
}

/// Extract the post uid from a request path under the post directory
fn post_uid_for(config: &SiteConfig, rel: &str) -> Option<String> {
    let post_dir = config.post_dir.trim_matches('/');
    let rest = rel
        .trim_start_matches('/')
        .strip_prefix(post_dir)?
        .strip_prefix('/')?;
    let uid = rest.trim_end_matches("index.html").trim_end_matches('/');

    // Uids are plain slugs; refuse anything that could leave the
    // post directory
    if uid.is_empty()
        || !uid
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return None;
    }

    Some(uid.to_string())
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
