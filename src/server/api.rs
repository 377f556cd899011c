//! JSON API, htmx partials and the theme switch

use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{theme_cookie, SharedState, HX_REDIRECT, PAGE_CACHE, PARTIAL_CACHE};
use crate::content::{Metadata, Post};
use crate::data::Data;
use crate::error::Error;
use crate::templates::PostData;

/// Maps core errors to a JSON error body
pub(super) struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            tracing::error!("API request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// A post with its rendered body and raw metadata
#[derive(Serialize)]
struct PostDetail<'a> {
    slug: &'a str,
    title: String,
    description: String,
    content: &'a str,
    date: String,
    tags: Vec<String>,
    metadata: &'a Metadata,
}

impl<'a> From<&'a Post> for PostDetail<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            slug: &post.slug,
            title: post.title(),
            description: post.description(),
            content: &post.content,
            date: post.date().to_rfc3339(),
            tags: post.tags(),
            metadata: &post.metadata,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct PostFilter {
    tag: Option<String>,
    search: Option<String>,
}

impl PostFilter {
    fn matches(&self, post: &Post) -> bool {
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !post.has_tag(tag) {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            return post.title().to_lowercase().contains(&needle)
                || post.description().to_lowercase().contains(&needle);
        }
        true
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ThemeForm {
    theme: Option<String>,
}

#[derive(Serialize)]
struct SkillGroup<'a> {
    name: &'a str,
    skills: &'a [String],
}

pub(super) async fn data(State(state): State<SharedState>) -> ApiResult<Json<Data>> {
    Ok(Json(state.assets.get_data()?))
}

/// Post summaries, newest first
pub(super) async fn posts(State(state): State<SharedState>) -> Json<Vec<PostData>> {
    Json(state.assets.list_posts().iter().map(PostData::from).collect())
}

pub(super) async fn post(
    State(state): State<SharedState>,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    let post = state.assets.get_post(&slug)?;
    Ok(([(header::CACHE_CONTROL, PAGE_CACHE)], Json(PostDetail::from(&post))).into_response())
}

/// Post list fragment, filtered by `tag` and `search`
pub(super) async fn posts_partial(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(filter): Query<PostFilter>,
) -> ApiResult<Response> {
    let theme = state.theme_for(&headers);
    let posts: Vec<PostData> = state
        .assets
        .list_posts()
        .iter()
        .filter(|post| filter.matches(post))
        .map(PostData::from)
        .collect();

    let mut context = tera::Context::new();
    context.insert("posts", &posts);
    context.insert("tag", &filter.tag);
    context.insert("search", &filter.search);
    let html = state.themes.render(&theme, "partials/posts.html", &context)?;

    Ok(([(header::CACHE_CONTROL, PARTIAL_CACHE)], Html(html)).into_response())
}

pub(super) async fn experience_partial(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let theme = state.theme_for(&headers);
    let data = state.assets.get_data()?;

    let mut context = tera::Context::new();
    context.insert("experience", &data.experience);
    let html = state
        .themes
        .render(&theme, "partials/experience.html", &context)?;

    Ok(([(header::CACHE_CONTROL, PAGE_CACHE)], Html(html)).into_response())
}

pub(super) async fn skills_partial(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let theme = state.theme_for(&headers);
    let data = state.assets.get_data()?;
    let groups: Vec<SkillGroup> = data
        .skills
        .categories()
        .into_iter()
        .map(|(name, skills)| SkillGroup { name, skills })
        .collect();

    let mut context = tera::Context::new();
    context.insert("groups", &groups);
    let html = state.themes.render(&theme, "partials/skills.html", &context)?;

    Ok(([(header::CACHE_CONTROL, PAGE_CACHE)], Html(html)).into_response())
}

/// Store the chosen theme in a cookie and ask htmx to reload
pub(super) async fn set_theme(
    State(state): State<SharedState>,
    form: Result<Form<ThemeForm>, FormRejection>,
) -> Response {
    let requested = form.ok().and_then(|Form(form)| form.theme).unwrap_or_default();
    let requested = requested.trim();

    if requested.is_empty() {
        return (StatusCode::BAD_REQUEST, "missing theme").into_response();
    }
    if !state.themes.is_valid(requested) {
        return (
            StatusCode::BAD_REQUEST,
            format!("unknown theme {:?}", requested),
        )
            .into_response();
    }

    tracing::debug!("Switching theme to {:?}", requested);
    (
        [
            (header::SET_COOKIE, theme_cookie(requested)),
            (HeaderName::from_static(HX_REDIRECT), "/".to_string()),
        ],
        StatusCode::OK,
    )
        .into_response()
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::super::tests::{app, body_string, fetch};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = fetch(uri).await;
        let status = response.status();
        let body = body_string(response).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    async fn post_theme(body: &'static str) -> axum::http::Response<Body> {
        app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/theme")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_data() {
        let (status, body) = json("/api/data").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["name"].as_str().unwrap().is_empty());
        assert!(body["experience"].as_array().unwrap().len() > 0);
    }

    #[tokio::test]
    async fn test_post_detail() {
        let response = fetch("/api/posts/first-post").await;
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );

        let (status, body) = json("/api/posts/first-post").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slug"], "first-post");
        assert_eq!(body["title"], "Welcome to My Blog");
        assert_eq!(body["tags"], serde_json::json!(["introduction", "welcome"]));
        assert!(body["date"].as_str().unwrap().starts_with("2025-11-17T00:00:00"));
        assert!(body["content"].as_str().unwrap().contains("<h2"));
        assert_eq!(body["metadata"]["title"], "Welcome to My Blog");
    }

    #[tokio::test]
    async fn test_missing_post_detail_is_404() {
        let (status, body) = json("/api/posts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_post_list_is_newest_first() {
        let (_, body) = json("/api/posts").await;
        let dates: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["date"].as_str().unwrap())
            .collect();
        assert!(dates.len() >= 3);
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_posts_partial_filters_by_tag() {
        let response = fetch("/api/posts/partial?tag=welcome").await;
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=600"
        );
        let body = body_string(response).await;
        assert!(body.contains("/posts/first-post"));
        assert!(!body.contains("/posts/rust-rewrite"));
    }

    #[tokio::test]
    async fn test_posts_partial_search_is_case_insensitive() {
        let body = body_string(fetch("/api/posts/partial?search=HTMX").await).await;
        assert!(body.contains("/posts/htmx-notes"));
        assert!(!body.contains("/posts/first-post"));
    }

    #[tokio::test]
    async fn test_resume_partials() {
        let response = fetch("/api/experience/partial").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );

        let response = fetch("/api/skills/partial").await;
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "public, max-age=3600"
        );
        let body = body_string(response).await;
        assert!(body.contains("Languages"));
    }

    #[tokio::test]
    async fn test_set_theme() {
        let response = post_theme("theme=paper").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::SET_COOKIE],
            "theme=paper; Path=/; Max-Age=31536000; HttpOnly; SameSite=Lax"
        );
        assert_eq!(response.headers()["hx-redirect"], "/");
    }

    #[tokio::test]
    async fn test_set_theme_rejects_bad_input() {
        assert_eq!(post_theme("theme=neon").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(post_theme("theme=").await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(post_theme("").await.status(), StatusCode::BAD_REQUEST);
    }
}
