use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::DevOpsClient;

#[derive(Deserialize, JsonSchema)]
pub struct ListRepositoriesParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
}

/// A tool for listing the repositories of a project.
pub struct ListRepositoriesTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl ListRepositoriesTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(ListRepositoriesParameters)
                .to_value(),
        }
    }
}

impl Tool for ListRepositoriesTool {
    type Input = ListRepositoriesParameters;

    fn name(&self) -> &str {
        "list_repositories"
    }

    fn description(&self) -> &str {
        "Lists the names of the repositories in a project."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ListRepositoriesParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let repositories = client
                .list_repositories(&input.project)
                .await
                .map_err(client_failure)?;
            let names: Vec<String> = repositories
                .map(|list| {
                    list.value.into_iter().map(|r| r.name).collect()
                })
                .unwrap_or_default();
            serde_json::to_string(&names)
                .map_err(|err| client_failure(err.into()))
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateRepositoryParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository to create.")]
    name: String,
}

/// A tool for creating a repository inside a project.
pub struct CreateRepositoryTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl CreateRepositoryTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(CreateRepositoryParameters)
                .to_value(),
        }
    }
}

impl Tool for CreateRepositoryTool {
    type Input = CreateRepositoryParameters;

    fn name(&self) -> &str {
        "create_repository"
    }

    fn description(&self) -> &str {
        "Creates a new Git repository in a project. Returns \"true\" on \
         success, \"false\" if the project does not exist."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: CreateRepositoryParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            // The creation endpoint is organization scoped and wants the
            // project id, not its name.
            let project = client
                .get_project(&input.project)
                .await
                .map_err(client_failure)?;
            let Some(project) = project else {
                return Ok("false".to_owned());
            };

            let created = client
                .create_repository(&project.id, &input.name)
                .await
                .map_err(client_failure)?;
            Ok(created.to_string())
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct DeleteRepositoryParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository to delete.")]
    name: String,
}

/// A tool for deleting a repository by name.
pub struct DeleteRepositoryTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl DeleteRepositoryTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(DeleteRepositoryParameters)
                .to_value(),
        }
    }
}

impl Tool for DeleteRepositoryTool {
    type Input = DeleteRepositoryParameters;

    fn name(&self) -> &str {
        "delete_repository"
    }

    fn description(&self) -> &str {
        "Deletes a repository from a project. Returns \"true\" on success, \
         \"false\" if no repository with that name exists."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: DeleteRepositoryParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let id = client
                .list_repositories(&input.project)
                .await
                .map_err(client_failure)?
                .and_then(|list| {
                    list.value
                        .into_iter()
                        .find(|r| r.name == input.name)
                        .map(|r| r.id)
                });
            let Some(id) = id else {
                return Ok("false".to_owned());
            };

            let deleted = client
                .delete_repository(&id)
                .await
                .map_err(client_failure)?;
            Ok(deleted.to_string())
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct ListFilesParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
}

/// A tool for listing every file path in a repository.
pub struct ListFilesTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl ListFilesTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(ListFilesParameters).to_value(),
        }
    }
}

impl Tool for ListFilesTool {
    type Input = ListFilesParameters;

    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "Lists the paths of all files and directories in a repository, \
         recursively from the root."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ListFilesParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let items = client
                .list_items(&input.project, &input.repository)
                .await
                .map_err(client_failure)?;
            let paths: Vec<String> = items
                .map(|list| {
                    list.value.into_iter().map(|item| item.path).collect()
                })
                .unwrap_or_default();
            serde_json::to_string(&paths)
                .map_err(|err| client_failure(err.into()))
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct GetReadmeParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
}

/// A tool for fetching the README of a repository's main branch.
pub struct GetReadmeTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl GetReadmeTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(GetReadmeParameters).to_value(),
        }
    }
}

impl Tool for GetReadmeTool {
    type Input = GetReadmeParameters;

    fn name(&self) -> &str {
        "get_readme"
    }

    fn description(&self) -> &str {
        "Gets the contents of the README.md file on the main branch of a \
         repository."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: GetReadmeParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let contents = client
                .file_contents(
                    &input.project,
                    &input.repository,
                    "main",
                    "/README.md",
                )
                .await
                .map_err(client_failure)?;
            Ok(contents.unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::devops::tests::test_client;

    #[tokio::test]
    async fn test_create_repository_resolves_the_project_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/_apis/projects/Alpha")
            .match_query(Matcher::Any)
            .with_body(json!({ "id": "p1", "name": "Alpha" }).to_string())
            .create_async()
            .await;
        let create = server
            .mock("POST", "/_apis/git/repositories")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "7.1".into(),
            ))
            .match_body(Matcher::Json(json!({
                "name": "tooling",
                "project": { "id": "p1" }
            })))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let tool = CreateRepositoryTool::new(test_client(&server));
        let result = tool
            .execute(CreateRepositoryParameters {
                project: "Alpha".to_owned(),
                name: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "true");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_repository_in_unknown_project_is_false() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let create = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tool = CreateRepositoryTool::new(test_client(&server));
        let result = tool
            .execute(CreateRepositoryParameters {
                project: "Ghost".to_owned(),
                name: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "false");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_repository_goes_by_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Alpha/_apis/git/repositories")
            .match_query(Matcher::Any)
            .with_body(
                json!({
                    "count": 1,
                    "value": [{ "id": "r1", "name": "tooling" }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/_apis/git/repositories/r1")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "6.0".into(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let tool = DeleteRepositoryTool::new(test_client(&server));
        let result = tool
            .execute(DeleteRepositoryParameters {
                project: "Alpha".to_owned(),
                name: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "true");
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_files_returns_paths() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Alpha/_apis/git/repositories/tooling/items")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("scopePath".into(), "/".into()),
                Matcher::UrlEncoded("recursionLevel".into(), "full".into()),
            ]))
            .with_body(
                json!({
                    "count": 2,
                    "value": [
                        { "path": "/README.md" },
                        { "path": "/src/main.rs" }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let tool = ListFilesTool::new(test_client(&server));
        let result = tool
            .execute(ListFilesParameters {
                project: "Alpha".to_owned(),
                repository: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, r#"["/README.md","/src/main.rs"]"#);
    }

    #[tokio::test]
    async fn test_get_readme_returns_raw_contents() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/Alpha/_apis/sourceProviders/tfsGit/fileContents")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("commitOrBranch".into(), "main".into()),
                Matcher::UrlEncoded("repository".into(), "tooling".into()),
                Matcher::UrlEncoded("path".into(), "/README.md".into()),
            ]))
            .with_body("# Tooling\n")
            .create_async()
            .await;

        let tool = GetReadmeTool::new(test_client(&server));
        let result = tool
            .execute(GetReadmeParameters {
                project: "Alpha".to_owned(),
                repository: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "# Tooling\n");
    }

    #[tokio::test]
    async fn test_missing_readme_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let tool = GetReadmeTool::new(test_client(&server));
        let result = tool
            .execute(GetReadmeParameters {
                project: "Alpha".to_owned(),
                repository: "tooling".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "");
    }
}
