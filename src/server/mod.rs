//! Portfolio web server
//!
//! Server-rendered HTML pages, htmx partials and a small JSON API, all
//! backed by the asset store and the active theme.

mod api;
mod pages;
mod static_files;

use anyhow::Result;
use axum::{
    http::{header, HeaderMap},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tera::Context;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::assets::AssetStore;
use crate::config::SiteConfig;
use crate::content::AssetManager;
use crate::templates::{PageData, ThemeManager};
use crate::Portfolio;

/// Cookie holding the visitor's theme
pub const THEME_COOKIE: &str = "theme";
/// One year, in seconds
const THEME_COOKIE_MAX_AGE: u64 = 365 * 24 * 60 * 60;

const PAGE_CACHE: &str = "public, max-age=3600";
const PARTIAL_CACHE: &str = "public, max-age=600";
const STATIC_CACHE: &str = "public, max-age=86400";

const HX_REDIRECT: &str = "hx-redirect";

/// Everything a request handler needs
pub struct AppState {
    pub config: SiteConfig,
    pub assets: AssetManager,
    pub themes: ThemeManager,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: SiteConfig, store: Arc<dyn AssetStore>) -> crate::Result<Self> {
        let themes = ThemeManager::load(
            store.as_ref(),
            &config.default_theme,
            &config.valid_themes(),
        )?;
        Ok(Self {
            assets: AssetManager::new(store),
            themes,
            config,
        })
    }

    /// Theme named by the request's cookie, or the default
    fn theme_for(&self, headers: &HeaderMap) -> String {
        self.themes
            .resolve(cookie_value(headers, THEME_COOKIE))
            .to_string()
    }

    /// Context shared by every full page
    fn page_context(&self, theme: &str, title: &str) -> Context {
        let page = PageData {
            theme: theme.to_string(),
            themes: self.themes.names().into_iter().map(String::from).collect(),
            title: title.to_string(),
        };
        let mut context = Context::new();
        context.insert("page", &page);
        context
    }
}

/// Build the application router with all middleware applied
pub fn router(state: SharedState) -> Router {
    let timeout = state.config.request_timeout();

    Router::new()
        .route("/", get(pages::index))
        .route("/posts", get(pages::posts))
        .route("/posts/:slug", get(pages::post))
        .route("/static/*path", get(static_files::serve))
        .route("/api/data", get(api::data))
        .route("/api/posts", get(api::posts))
        .route("/api/posts/partial", get(api::posts_partial))
        .route("/api/posts/:slug", get(api::post))
        .route("/api/experience/partial", get(api::experience_partial))
        .route("/api/skills/partial", get(api::skills_partial))
        .route("/api/theme", post(api::set_theme))
        .route("/health", get(api::health))
        .fallback(pages::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Start the portfolio server and run until Ctrl+C
pub async fn start(portfolio: &Portfolio) -> Result<()> {
    let config = portfolio.config.clone();
    let state = Arc::new(AppState::new(config.clone(), portfolio.store())?);
    tracing::info!(
        "Themes: {} (default {})",
        state.themes.names().join(", "),
        state.themes.default_theme()
    );

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.addr.as_str()).await?;
    println!("Server running at http://{}", listener.local_addr()?);
    println!("Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C
pub(crate) async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Find a cookie by name across all Cookie headers
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

fn theme_cookie(theme: &str) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        THEME_COOKIE, theme, THEME_COOKIE_MAX_AGE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::EmbeddedAssets;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response, StatusCode},
    };
    use tower::ServiceExt;

    pub(super) fn app() -> Router {
        let state = AppState::new(SiteConfig::default(), Arc::new(EmbeddedAssets::new())).unwrap();
        router(Arc::new(state))
    }

    pub(super) async fn fetch(uri: &str) -> Response<Body> {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub(super) async fn body_string(response: Response<Body>) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, "a=1; theme=paper; b=2".parse().unwrap());
        assert_eq!(cookie_value(&headers, "theme"), Some("paper"));
        assert_eq!(cookie_value(&headers, "missing"), None);

        headers.append(header::COOKIE, "other=x".parse().unwrap());
        assert_eq!(cookie_value(&headers, "other"), Some("x"));
    }

    #[test]
    fn test_theme_cookie_format() {
        assert_eq!(
            theme_cookie("paper"),
            "theme=paper; Path=/; Max-Age=31536000; HttpOnly; SameSite=Lax"
        );
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let response = fetch("/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_page() {
        let response = fetch("/nowhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_string(response).await;
        assert!(body.contains("<html"));
    }
}
