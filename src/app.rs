use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::auth::gate_middleware;
use crate::handlers::{
    categories_handler, category_handler, create_post_handler, dashboard_handler,
    delete_post_handler, error_page_handler, get_post_handler, health_handler, home_handler,
    list_posts_handler, login_handler, login_page_handler, logout_handler, metrics_handler,
    post_handler, refresh_handler, session_handler, update_post_handler,
};
use crate::metrics::REQUEST_TOTAL;
use crate::rate_limit::{client_identifier, rate_limit_headers, throttled_response};
use crate::state::AppState;

/// Every route sits behind the authorization gate; the admin API is
/// additionally throttled per client with the api policy.
pub fn build_router(state: Arc<AppState>) -> Router {
    let admin_api = Router::new()
        .route(
            "/api/admin/posts",
            get(list_posts_handler)
                .post(create_post_handler)
                .put(update_post_handler)
                .delete(delete_post_handler),
        )
        .route("/api/admin/posts/{slug}", get(get_post_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), api_rate_limit));

    Router::new()
        .route("/", get(home_handler))
        .route("/categories", get(categories_handler))
        .route("/categories/{category}", get(category_handler))
        .route("/posts/{slug}", get(post_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .route("/api/auth/refresh", post(refresh_handler))
        .route("/api/auth/session", get(session_handler))
        .route("/admin", get(dashboard_handler))
        .route("/admin/login", get(login_page_handler))
        .route("/admin/error", get(error_page_handler))
        .merge(admin_api)
        .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
        .layer(middleware::from_fn(count_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn count_requests(request: Request, next: Next) -> Response {
    REQUEST_TOTAL.inc();
    next.run(request).await
}

async fn api_rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let policy = state.api_policy;
    let key = format!("api:{}", client_identifier(request.headers()));

    let decision = state.rate_limiter.check(&policy, &key);
    if !decision.allowed {
        return throttled_response(
            &policy,
            &decision,
            state.rate_limiter.now_ms(),
            "Too many requests. Please try again later.",
        );
    }

    let mut response = next.run(request).await;
    response.headers_mut().extend(rate_limit_headers(&policy, &decision));
    response
}
