//! Full HTML pages

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tera::Context;

use super::{AppState, SharedState, PAGE_CACHE};
use crate::error::Error;
use crate::templates::PostData;

/// Home page: résumé plus the most recent posts
pub(super) async fn index(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let theme = state.theme_for(&headers);

    let data = match state.assets.get_data() {
        Ok(data) => data,
        Err(e) => return error_page(&state, &theme, e),
    };
    let posts: Vec<PostData> = state
        .assets
        .list_posts()
        .iter()
        .take(state.config.recent_posts)
        .map(PostData::from)
        .collect();

    let mut context = state.page_context(&theme, &data.name);
    context.insert("data", &data);
    context.insert("posts", &posts);
    render(&state, &theme, "index.html", &context)
}

/// All posts, newest first
pub(super) async fn posts(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let theme = state.theme_for(&headers);
    let posts: Vec<PostData> = state.assets.list_posts().iter().map(PostData::from).collect();

    let mut tags: Vec<String> = posts.iter().flat_map(|p| p.tags.iter().cloned()).collect();
    tags.sort_unstable();
    tags.dedup();

    let mut context = state.page_context(&theme, "Posts");
    context.insert("posts", &posts);
    context.insert("tags", &tags);
    render(&state, &theme, "posts.html", &context)
}

/// A single post
pub(super) async fn post(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
) -> Response {
    let theme = state.theme_for(&headers);

    let post = match state.assets.get_post(&slug) {
        Ok(post) => post,
        Err(e) => return error_page(&state, &theme, e),
    };

    let data = PostData::from(&post);
    let mut context = state.page_context(&theme, &data.title);
    context.insert("post", &data);
    context.insert("content", &post.content);
    render(&state, &theme, "post.html", &context)
}

/// Fallback for unknown routes
pub(super) async fn not_found(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let theme = state.theme_for(&headers);
    not_found_page(&state, &theme)
}

fn render(state: &AppState, theme: &str, template: &str, context: &Context) -> Response {
    match state.themes.render(theme, template, context) {
        Ok(html) => ([(header::CACHE_CONTROL, PAGE_CACHE)], Html(html)).into_response(),
        Err(e) => error_page(state, theme, e),
    }
}

/// 404 page for missing content, bare 500 for everything else
fn error_page(state: &AppState, theme: &str, err: Error) -> Response {
    if err.is_not_found() {
        tracing::debug!("Not found: {}", err);
        return not_found_page(state, theme);
    }
    tracing::error!("Failed to render page: {}", err);
    (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error").into_response()
}

fn not_found_page(state: &AppState, theme: &str) -> Response {
    let context = state.page_context(theme, "Not Found");
    match state.themes.render(theme, "not_found.html", &context) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {}", e);
            (StatusCode::NOT_FOUND, "404 Not Found").into_response()
        }
    }
}
