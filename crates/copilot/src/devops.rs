//! Authenticated access to the Azure DevOps REST surface.
//!
//! Every request carries Basic authorization (empty username, the personal
//! access token as password) and an `Accept: application/json` header. A
//! non-success status is "absent data" (`Ok(None)`), not an error; only
//! transport failures and undecodable bodies surface as [`ClientError`].
//! There is no retry and no timeout override beyond reqwest's defaults.

pub mod types;

use std::fmt::{self, Display};

use base64::Engine as _;
use reqwest::{Client, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use types::{
    Build, CodeSearchFilters, CodeSearchRequest, GitItem, GitRef,
    GitRepository, ProcessTemplateCapability, ProjectCapabilities,
    ProjectCreate, ProjectId, RefUpdate, RepositoryCreate, TeamProject,
    ValueList, VersionControlCapability,
};

/// The object id of a nonexistent commit, used as the old (create) or new
/// (delete) side of a ref update.
pub const ZERO_OBJECT_ID: &str = "0000000000000000000000000000000000000000";

/// Process template id for Agile, used for every created project.
const AGILE_TEMPLATE_ID: &str = "6b724908-ef14-45cf-84f8-768b5384da45";

/// Error raised by the client for anything other than "no data".
#[derive(Debug)]
pub enum ClientError {
    /// The personal access token can't be carried in a header.
    InvalidToken,
    /// The HTTP client could not be built or the request did not complete.
    Transport(reqwest::Error),
    /// The response body was present but not the expected shape.
    Decode(serde_json::Error),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidToken => {
                write!(f, "personal access token is not a valid header value")
            }
            ClientError::Transport(err) => write!(f, "transport error: {err}"),
            ClientError::Decode(err) => {
                write!(f, "unexpected response shape: {err}")
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err)
    }
}

/// The three base URIs one organization exposes.
#[derive(Clone, Debug)]
pub struct DevOpsEndpoints {
    /// Main organization URI (`https://dev.azure.com/{org}`).
    pub org: String,
    /// Search ("ALM") URI (`https://almsearch.dev.azure.com/{org}`).
    pub search: String,
    /// Graph URI (`https://vssps.dev.azure.com/{org}`).
    pub graph: String,
}

/// Authenticated Azure DevOps REST client.
#[derive(Clone)]
pub struct DevOpsClient {
    http: Client,
    endpoints: DevOpsEndpoints,
}

impl DevOpsClient {
    /// Creates a client for the given organization endpoints.
    pub fn new(
        endpoints: DevOpsEndpoints,
        pat: &str,
    ) -> Result<Self, ClientError> {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!(":{pat}"));
        let mut auth =
            header::HeaderValue::from_str(&format!("Basic {encoded}"))
                .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(header::AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self { http, endpoints })
    }

    // --- Request plumbing ---

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<Option<T>, ClientError> {
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        if !resp.status().is_success() {
            debug!("GET {url} returned {}", resp.status());
            return Ok(None);
        }
        let body = resp.text().await.map_err(ClientError::Transport)?;
        serde_json::from_str(&body).map(Some).map_err(ClientError::Decode)
    }

    async fn get_text(&self, url: String) -> Result<Option<String>, ClientError> {
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        if !resp.status().is_success() {
            debug!("GET {url} returned {}", resp.status());
            return Ok(None);
        }
        resp.text().await.map(Some).map_err(ClientError::Transport)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        url: String,
        body: &B,
    ) -> Result<Option<T>, ClientError> {
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        if !resp.status().is_success() {
            debug!("POST {url} returned {}", resp.status());
            return Ok(None);
        }
        let body = resp.text().await.map_err(ClientError::Transport)?;
        serde_json::from_str(&body).map(Some).map_err(ClientError::Decode)
    }

    /// POST where only the success flag matters.
    async fn post_ok<B: Serialize>(
        &self,
        url: String,
        body: &B,
    ) -> Result<bool, ClientError> {
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Ok(resp.status().is_success())
    }

    async fn delete_ok(&self, url: String) -> Result<bool, ClientError> {
        let resp = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Ok(resp.status().is_success())
    }

    // --- Git refs ---

    /// Lists refs matching `filter` (e.g. `heads` or `heads/{branch}`).
    pub async fn list_refs(
        &self,
        project: &str,
        repository: &str,
        filter: &str,
    ) -> Result<Option<ValueList<GitRef>>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/git/repositories/{repository}/refs?filter={filter}&api-version=6.0",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    /// Resolves a branch head to its object id.
    pub async fn resolve_branch(
        &self,
        project: &str,
        repository: &str,
        branch: &str,
    ) -> Result<Option<GitRef>, ClientError> {
        let refs = self
            .list_refs(project, repository, &format!("heads/{branch}"))
            .await?;
        Ok(refs.and_then(|list| list.value.into_iter().next()))
    }

    /// Posts a ref update (branch creation or deletion).
    pub async fn update_refs(
        &self,
        project: &str,
        repository: &str,
        updates: &[RefUpdate],
    ) -> Result<bool, ClientError> {
        let url = format!(
            "{}/{project}/_apis/git/repositories/{repository}/refs?api-version=6.0",
            self.endpoints.org
        );
        self.post_ok(url, &updates).await
    }

    // --- Repositories ---

    pub async fn get_repository(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<Option<GitRepository>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/git/repositories/{repository}?api-version=6.0",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    pub async fn list_repositories(
        &self,
        project: &str,
    ) -> Result<Option<ValueList<GitRepository>>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/git/repositories?api-version=6.0",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    pub async fn create_repository(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<bool, ClientError> {
        let url = format!(
            "{}/_apis/git/repositories?api-version=7.1",
            self.endpoints.org
        );
        let payload = RepositoryCreate {
            name: name.to_owned(),
            project: ProjectId {
                id: project_id.to_owned(),
            },
        };
        self.post_ok(url, &payload).await
    }

    pub async fn delete_repository(
        &self,
        repository_id: &str,
    ) -> Result<bool, ClientError> {
        let url = format!(
            "{}/_apis/git/repositories/{repository_id}?api-version=6.0",
            self.endpoints.org
        );
        self.delete_ok(url).await
    }

    /// Lists every item in the repository, recursing from the root.
    pub async fn list_items(
        &self,
        project: &str,
        repository: &str,
    ) -> Result<Option<ValueList<GitItem>>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/git/repositories/{repository}/items?scopePath=/&recursionLevel=full&api-version=6.0",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    /// Fetches raw file contents from a branch via the source provider.
    pub async fn file_contents(
        &self,
        project: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/sourceProviders/tfsGit/fileContents?commitOrBranch={branch}&repository={repository}&path={path}&api-version=6.0-preview.1",
            self.endpoints.org
        );
        self.get_text(url).await
    }

    // --- Projects ---

    pub async fn list_projects(
        &self,
    ) -> Result<Option<ValueList<TeamProject>>, ClientError> {
        let url =
            format!("{}/_apis/projects?api-version=6.0", self.endpoints.org);
        self.get_json(url).await
    }

    pub async fn get_project(
        &self,
        name: &str,
    ) -> Result<Option<TeamProject>, ClientError> {
        let url = format!(
            "{}/_apis/projects/{name}?api-version=6.0",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    /// Creates a Git project on the fixed Agile process template.
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> Result<bool, ClientError> {
        let url =
            format!("{}/_apis/projects?api-version=6.0", self.endpoints.org);
        let payload = ProjectCreate {
            name: name.to_owned(),
            description: description.to_owned(),
            capabilities: ProjectCapabilities {
                versioncontrol: VersionControlCapability {
                    source_control_type: "Git",
                },
                process_template: ProcessTemplateCapability {
                    template_type_id: AGILE_TEMPLATE_ID,
                },
            },
        };
        self.post_ok(url, &payload).await
    }

    pub async fn delete_project(
        &self,
        project_id: &str,
    ) -> Result<bool, ClientError> {
        let url = format!(
            "{}/_apis/projects/{project_id}?api-version=6.0",
            self.endpoints.org
        );
        self.delete_ok(url).await
    }

    // --- Builds ---

    /// Lists builds of one repository, newest first as the service returns
    /// them.
    pub async fn list_builds(
        &self,
        project: &str,
        repository_id: &str,
    ) -> Result<Option<ValueList<Build>>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/build/builds?repositoryId={repository_id}&repositoryType=TfsGit&api-version=7.2-preview.7",
            self.endpoints.org
        );
        self.get_json(url).await
    }

    // --- Code search ---

    /// Searches code in a project; always the first 50 hits.
    pub async fn code_search(
        &self,
        project: &str,
        search_text: &str,
    ) -> Result<Option<Value>, ClientError> {
        let url = format!(
            "{}/{project}/_apis/search/codesearchresults?api-version=7.0",
            self.endpoints.search
        );
        let payload = CodeSearchRequest {
            search_text: search_text.to_owned(),
            skip: 0,
            top: 50,
            filters: CodeSearchFilters {
                project: vec![project.to_owned()],
            },
        };
        self.post_json(url, &payload).await
    }

    // --- Users ---

    /// Lists the organization's user graph. The endpoint offers no
    /// server-side filter in this call shape.
    pub async fn list_graph_users(
        &self,
    ) -> Result<Option<ValueList<Value>>, ClientError> {
        let url = format!(
            "{}/_apis/graph/users?api-version=7.1-preview.1",
            self.endpoints.graph
        );
        self.get_json(url).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use mockito::{Matcher, ServerGuard};
    use serde_json::json;

    use super::*;

    /// A client whose three endpoints all point at the mock server.
    pub(crate) fn test_client(server: &ServerGuard) -> DevOpsClient {
        DevOpsClient::new(
            DevOpsEndpoints {
                org: server.url(),
                search: server.url(),
                graph: server.url(),
            },
            "test-pat",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_requests_carry_basic_auth_and_accept() {
        let mut server = mockito::Server::new_async().await;
        // base64 of ":test-pat".
        let mock = server
            .mock("GET", "/_apis/projects")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "6.0".into(),
            ))
            .match_header("authorization", "Basic OnRlc3QtcGF0")
            .match_header("accept", "application/json")
            .with_body(json!({ "count": 0, "value": [] }).to_string())
            .create_async()
            .await;

        let client = test_client(&server);
        let projects = client.list_projects().await.unwrap().unwrap();
        assert!(projects.value.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let client = test_client(&server);
        let projects = client.list_projects().await.unwrap();
        assert!(projects.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = test_client(&server);
        let result = client.list_projects().await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn test_resolve_branch_picks_the_first_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter".into(), "heads/main".into()),
                Matcher::UrlEncoded("api-version".into(), "6.0".into()),
            ]))
            .with_body(
                json!({
                    "count": 1,
                    "value": [
                        { "name": "refs/heads/main", "objectId": "abc123" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = test_client(&server);
        let head = client.resolve_branch("P", "R", "main").await.unwrap();
        assert_eq!(head.unwrap().object_id, "abc123");
    }

    #[tokio::test]
    async fn test_update_refs_posts_the_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "6.0".into(),
            ))
            .match_body(Matcher::Json(json!([{
                "name": "refs/heads/dev",
                "oldObjectId": ZERO_OBJECT_ID,
                "newObjectId": "abc123"
            }])))
            .with_body("{}")
            .create_async()
            .await;

        let client = test_client(&server);
        let created = client
            .update_refs(
                "P",
                "R",
                &[RefUpdate {
                    name: "refs/heads/dev".to_owned(),
                    old_object_id: ZERO_OBJECT_ID.to_owned(),
                    new_object_id: "abc123".to_owned(),
                }],
            )
            .await
            .unwrap();
        assert!(created);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_code_search_pins_skip_and_top() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/P/_apis/search/codesearchresults")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "7.0".into(),
            ))
            .match_body(Matcher::Json(json!({
                "searchText": "TODO",
                "$skip": 0,
                "$top": 50,
                "filters": { "Project": ["P"] }
            })))
            .with_body(json!({ "count": 1, "results": [] }).to_string())
            .create_async()
            .await;

        let client = test_client(&server);
        let result = client.code_search("P", "TODO").await.unwrap();
        assert!(result.is_some());
        mock.assert_async().await;
    }
}
