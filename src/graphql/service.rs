//! HTTP routes for /graphql
//!
//! `POST /graphql` executes a request. A valid bearer token attaches an
//! [AuthUser] to the request; a missing or invalid token leaves the request
//! unauthenticated rather than rejecting it. `GET /graphql` serves GraphiQL
//! to browsers.

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Router;
use axum::extract::State;
use axum::http::header::{ACCEPT, AUTHORIZATION};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;

use crate::app::AppState;

use super::auth::{AuthConfig, AuthUser};

/// Return a router with /graphql. Merge this into the app and call
/// `.with_state(state)` on the combined router.
pub fn router() -> Router<AppState> {
    Router::new().route("/graphql", get(graphiql).post(graphql_handler))
}

fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the request's user from its Authorization header, if any.
fn authenticate(auth: &AuthConfig, headers: &HeaderMap) -> Option<AuthUser> {
    let Some(token) = extract_token(headers) else {
        tracing::debug!("No auth token in request headers");
        return None;
    };

    match auth.verify_token(token) {
        Ok(user) => {
            tracing::debug!(user_id = user.user_id, "Auth successful");
            Some(user)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token verification failed");
            None
        }
    }
}

async fn graphiql(headers: HeaderMap) -> impl IntoResponse {
    let accepts_html = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false);

    if accepts_html {
        Html(GraphiQLSource::build().endpoint("/graphql").finish()).into_response()
    } else {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            axum::Json(serde_json::json!({
                "error": "GET requests are not supported for GraphQL queries. Use POST with Content-Type: application/json"
            })),
        )
            .into_response()
    }
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(user) = authenticate(&state.auth, &headers) {
        request = request.data(user);
    }
    state.schema.execute(request).await.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{HeaderValue, Request};
    use tower::ServiceExt;

    use crate::app::build_app;
    use crate::db::CreateUser;

    fn auth() -> AuthConfig {
        AuthConfig::new("service-secret", chrono::Duration::hours(1), 4)
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_token(&headers("Basic abc")), None);
        assert_eq!(extract_token(&headers("Bearer ")), None);
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_authenticate_valid_token() {
        let auth = auth();
        let token = auth.issue_token(5).unwrap();
        assert_eq!(
            authenticate(&auth, &headers(&format!("Bearer {}", token))),
            Some(AuthUser { user_id: 5 })
        );
    }

    #[test]
    fn test_invalid_token_is_anonymous() {
        assert_eq!(authenticate(&auth(), &headers("Bearer garbage")), None);
    }

    #[tokio::test]
    async fn test_graphiql_requires_html() {
        let response = graphiql(HeaderMap::new()).await.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let mut browser = HeaderMap::new();
        browser.insert(ACCEPT, HeaderValue::from_static("text/html"));
        let response = graphiql(browser).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    async fn post_graphql(state: AppState, bearer: Option<&str>, query: &str) -> serde_json::Value {
        let mut request = Request::post("/graphql").header(CONTENT_TYPE, "application/json");
        if let Some(token) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = serde_json::json!({ "query": query }).to_string();

        let response = build_app(state)
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_bearer_token_reaches_resolvers() {
        let state = AppState::for_tests().await;
        let user = state
            .db
            .users()
            .create(CreateUser {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let token = state.auth.issue_token(user.id).unwrap();
        let post = r#"mutation { post(description: "d", url: "u") { id postedBy { name } } }"#;

        let body = post_graphql(state.clone(), Some(&token), post).await;
        assert!(body.get("errors").is_none(), "{}", body);
        assert_eq!(body["data"]["post"]["postedBy"]["name"], "Ada");

        let body = post_graphql(state.clone(), None, post).await;
        assert_eq!(
            body["errors"][0]["message"],
            "Cannot post without logging in."
        );

        let body = post_graphql(state, Some("garbage"), "{ me { id } }").await;
        assert!(body.get("errors").is_none(), "{}", body);
        assert!(body["data"]["me"].is_null());
    }
}
