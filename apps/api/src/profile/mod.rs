//! Developer profile pulled from GitHub and exposed as readable context.
//!
//! The profile is optional throughout: the upstream may omit any field, the
//! fetch may fail, or no token may be configured. None of these stop editing.

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::context::ContextExporter;

pub const GITHUB_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const REPOSITORY_COUNT: u32 = 3;

const USER_AND_REPOS_QUERY: &str = r#"
query($login: String!, $count: Int!) {
  user(login: $login) {
    name
    email
    company
    bio
    repositories(first: $count, orderBy: {field: CREATED_AT, direction: DESC}) {
      edges {
        node {
          name
          url
          description
          createdAt
          primaryLanguage { name }
          stargazers { totalCount }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("GitHub returned no user")]
    MissingUser,
}

// ────────────────────────────────────────────────────────────────────────────
// Profile shape
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub bio: Option<String>,
    pub repositories: Vec<Repository>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: Option<String>,
    pub url: Option<String>,
    pub created: Option<String>,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stars: Option<u64>,
}

// Raw GraphQL response. Every level is optional.

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQlData {
    user: Option<GithubUser>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    name: Option<String>,
    email: Option<String>,
    company: Option<String>,
    bio: Option<String>,
    repositories: Option<RepositoryConnection>,
}

#[derive(Debug, Deserialize)]
struct RepositoryConnection {
    #[serde(default)]
    edges: Vec<Option<RepositoryEdge>>,
}

#[derive(Debug, Deserialize)]
struct RepositoryEdge {
    node: Option<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryNode {
    name: Option<String>,
    url: Option<String>,
    description: Option<String>,
    created_at: Option<String>,
    primary_language: Option<Language>,
    stargazers: Option<Stargazers>,
}

#[derive(Debug, Deserialize)]
struct Language {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stargazers {
    total_count: Option<u64>,
}

/// Flattens a GraphQL response body into a [`Profile`].
///
/// GraphQL errors win over partial data; a response without a user is
/// `MissingUser`.
fn shape_profile(response: GraphQlResponse) -> Result<Profile, ProfileError> {
    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(ProfileError::GraphQl(messages.join("; ")));
    }

    let user = response
        .data
        .and_then(|d| d.user)
        .ok_or(ProfileError::MissingUser)?;

    let repositories = user
        .repositories
        .map(|conn| conn.edges)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .filter_map(|edge| edge.node)
        .map(|node| Repository {
            name: node.name,
            url: node.url,
            created: node.created_at,
            description: node.description,
            language: node.primary_language.and_then(|l| l.name),
            stars: node.stargazers.and_then(|s| s.total_count),
        })
        .collect();

    Ok(Profile {
        name: user.name,
        email: user.email,
        company: user.company,
        bio: user.bio,
        repositories,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Sources
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self) -> Result<Profile, ProfileError>;

    /// Short name for log lines.
    fn name(&self) -> &'static str;
}

/// Queries the GitHub GraphQL API for one login.
pub struct GithubProfileSource {
    client: Client,
    endpoint: String,
    token: String,
    login: String,
}

impl GithubProfileSource {
    pub fn new(
        token: impl Into<String>,
        login: impl Into<String>,
    ) -> Result<Self, ProfileError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: GITHUB_GRAPHQL_URL.to_string(),
            token: token.into(),
            login: login.into(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl ProfileSource for GithubProfileSource {
    async fn fetch(&self) -> Result<Profile, ProfileError> {
        let body = json!({
            "query": USER_AND_REPOS_QUERY,
            "variables": { "login": self.login, "count": REPOSITORY_COUNT },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProfileError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GraphQlResponse = response.json().await?;
        shape_profile(parsed)
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

/// Fixed profile, for offline runs and tests. `None` behaves like a missing user.
pub struct StaticProfileSource(pub Option<Profile>);

#[async_trait]
impl ProfileSource for StaticProfileSource {
    async fn fetch(&self) -> Result<Profile, ProfileError> {
        self.0.clone().ok_or(ProfileError::MissingUser)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Builds the configured source. Both a token and a login are needed.
pub fn source_from_config(config: &Config) -> Result<Option<Arc<dyn ProfileSource>>, ProfileError> {
    match (&config.github_token, &config.github_username) {
        (Some(token), Some(login)) => {
            let source: Arc<dyn ProfileSource> =
                Arc::new(GithubProfileSource::new(token.clone(), login.clone())?);
            Ok(Some(source))
        }
        _ => Ok(None),
    }
}

/// Fetches the profile once and hands it to the context exporter.
/// Failure leaves the profile absent.
pub async fn load_profile(source: Arc<dyn ProfileSource>, context: ContextExporter) {
    match source.fetch().await {
        Ok(profile) => {
            info!(
                source = source.name(),
                repositories = profile.repositories.len(),
                "Profile loaded"
            );
            context.set_profile(Some(profile));
        }
        Err(e) => {
            warn!(source = source.name(), error = %e, "Profile fetch failed; continuing without profile");
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentStore;

    fn parse(body: &str) -> Result<Profile, ProfileError> {
        shape_profile(serde_json::from_str(body).unwrap())
    }

    #[test]
    fn test_shape_full_response() {
        let profile = parse(
            r#"{"data":{"user":{
                "name":"Ada","email":"ada@example.com","company":null,"bio":"Engines",
                "repositories":{"edges":[
                    {"node":{"name":"engine","url":"https://github.com/ada/engine",
                             "description":"Difference engine","createdAt":"2024-01-02T00:00:00Z",
                             "primaryLanguage":{"name":"Rust"},
                             "stargazers":{"totalCount":7}}}
                ]}
            }}}"#,
        )
        .unwrap();

        assert_eq!(profile.name.as_deref(), Some("Ada"));
        assert_eq!(profile.company, None);
        assert_eq!(profile.repositories.len(), 1);
        let repo = &profile.repositories[0];
        assert_eq!(repo.language.as_deref(), Some("Rust"));
        assert_eq!(repo.created.as_deref(), Some("2024-01-02T00:00:00Z"));
        assert_eq!(repo.stars, Some(7));
    }

    #[test]
    fn test_shape_tolerates_missing_nested_fields() {
        let profile = parse(
            r#"{"data":{"user":{
                "name":null,"email":null,"company":null,"bio":null,
                "repositories":{"edges":[
                    {"node":{"name":"no-lang","primaryLanguage":null}},
                    null,
                    {"node":null}
                ]}
            }}}"#,
        )
        .unwrap();

        assert_eq!(profile.repositories.len(), 1);
        assert_eq!(profile.repositories[0].language, None);
        assert_eq!(profile.repositories[0].stars, None);
    }

    #[test]
    fn test_shape_missing_user() {
        assert!(matches!(
            parse(r#"{"data":{"user":null}}"#),
            Err(ProfileError::MissingUser)
        ));
        assert!(matches!(parse(r#"{}"#), Err(ProfileError::MissingUser)));
    }

    #[test]
    fn test_shape_graphql_errors() {
        let err = parse(r#"{"data":null,"errors":[{"message":"Bad credentials"}]}"#).unwrap_err();
        assert!(matches!(err, ProfileError::GraphQl(ref m) if m == "Bad credentials"));
    }

    #[tokio::test]
    async fn test_github_source_posts_query_with_bearer_token() {
        use axum::{http::HeaderMap, routing::post, Json, Router};
        use serde_json::Value;

        let app = Router::new().route(
            "/graphql",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer gh-token");
                let login = body["variables"]["login"].as_str().unwrap_or_default().to_string();
                if !authorized {
                    return Json(json!({"errors": [{"message": "Bad credentials"}]}));
                }
                Json(json!({"data": {"user": {
                    "name": login, "email": null, "company": null, "bio": null,
                    "repositories": {"edges": []}
                }}}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let source = GithubProfileSource::new("gh-token", "ada")
            .unwrap()
            .with_endpoint(format!("http://{addr}/graphql"));
        let profile = source.fetch().await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("ada"));
        assert!(profile.repositories.is_empty());

        let wrong = GithubProfileSource::new("other", "ada")
            .unwrap()
            .with_endpoint(format!("http://{addr}/graphql"));
        assert!(matches!(wrong.fetch().await, Err(ProfileError::GraphQl(_))));
    }

    #[tokio::test]
    async fn test_load_profile_sets_context() {
        let store = DocumentStore::new();
        let context = ContextExporter::attach(&store);
        let profile = Profile {
            name: Some("Ada".to_string()),
            ..Profile::default()
        };

        load_profile(
            Arc::new(StaticProfileSource(Some(profile.clone()))),
            context.clone(),
        )
        .await;

        assert_eq!(context.profile(), Some(profile));
    }

    #[tokio::test]
    async fn test_failed_load_leaves_profile_absent() {
        let store = DocumentStore::new();
        let context = ContextExporter::attach(&store);

        load_profile(Arc::new(StaticProfileSource(None)), context.clone()).await;

        assert_eq!(context.profile(), None);
    }
}
