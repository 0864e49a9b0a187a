use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::types::RefUpdate;
use crate::devops::{DevOpsClient, ZERO_OBJECT_ID};

const HEADS_PREFIX: &str = "refs/heads/";

#[derive(Deserialize, JsonSchema)]
pub struct ListBranchesParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
}

/// A tool for listing the branches of a repository.
pub struct ListBranchesTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl ListBranchesTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(ListBranchesParameters).to_value(),
        }
    }
}

impl Tool for ListBranchesTool {
    type Input = ListBranchesParameters;

    fn name(&self) -> &str {
        "list_branches"
    }

    fn description(&self) -> &str {
        "Lists the branch names of a repository in a project."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ListBranchesParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let refs = client
                .list_refs(&input.project, &input.repository, "heads")
                .await
                .map_err(client_failure)?;
            let names: Vec<String> = refs
                .map(|list| {
                    list.value
                        .into_iter()
                        .map(|r| {
                            r.name
                                .strip_prefix(HEADS_PREFIX)
                                .map(str::to_owned)
                                .unwrap_or(r.name)
                        })
                        .collect()
                })
                .unwrap_or_default();
            serde_json::to_string(&names)
                .map_err(|err| client_failure(err.into()))
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct GetBranchParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
    #[schemars(description = "The name of the branch.")]
    branch: String,
}

/// A tool for fetching one branch head with its metadata.
pub struct GetBranchTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl GetBranchTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(GetBranchParameters).to_value(),
        }
    }
}

impl Tool for GetBranchTool {
    type Input = GetBranchParameters;

    fn name(&self) -> &str {
        "get_branch"
    }

    fn description(&self) -> &str {
        "Gets a single branch of a repository, with its latest commit id."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: GetBranchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let head = client
                .resolve_branch(&input.project, &input.repository, &input.branch)
                .await
                .map_err(client_failure)?;
            match head {
                Some(head) => serde_json::to_string(&head)
                    .map_err(|err| client_failure(err.into())),
                None => Ok(String::new()),
            }
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateBranchParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
    #[schemars(description = "The name of the branch to create.")]
    branch: String,
    #[schemars(description = "The existing branch to branch off from.")]
    source_branch: String,
}

/// A tool for creating a branch from an existing one.
pub struct CreateBranchTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl CreateBranchTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(CreateBranchParameters).to_value(),
        }
    }
}

impl Tool for CreateBranchTool {
    type Input = CreateBranchParameters;

    fn name(&self) -> &str {
        "create_branch"
    }

    fn description(&self) -> &str {
        "Creates a new branch in a repository, pointing at the head of an \
         existing source branch. Returns \"true\" on success."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: CreateBranchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let source = client
                .resolve_branch(
                    &input.project,
                    &input.repository,
                    &input.source_branch,
                )
                .await
                .map_err(client_failure)?;
            let Some(source) = source else {
                return Ok("false".to_owned());
            };

            let created = client
                .update_refs(
                    &input.project,
                    &input.repository,
                    &[RefUpdate {
                        name: format!("{HEADS_PREFIX}{}", input.branch),
                        old_object_id: ZERO_OBJECT_ID.to_owned(),
                        new_object_id: source.object_id,
                    }],
                )
                .await
                .map_err(client_failure)?;
            Ok(created.to_string())
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct DeleteBranchParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
    #[schemars(description = "The name of the branch to delete.")]
    branch: String,
}

/// A tool for deleting a branch.
pub struct DeleteBranchTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl DeleteBranchTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(DeleteBranchParameters).to_value(),
        }
    }
}

impl Tool for DeleteBranchTool {
    type Input = DeleteBranchParameters;

    fn name(&self) -> &str {
        "delete_branch"
    }

    fn description(&self) -> &str {
        "Deletes a branch from a repository. Returns \"true\" on success."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: DeleteBranchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let head = client
                .resolve_branch(&input.project, &input.repository, &input.branch)
                .await
                .map_err(client_failure)?;
            let Some(head) = head else {
                return Ok("false".to_owned());
            };

            let deleted = client
                .update_refs(
                    &input.project,
                    &input.repository,
                    &[RefUpdate {
                        // The service expects the full ref name here, which
                        // the listing already carries.
                        name: head.name,
                        old_object_id: head.object_id,
                        new_object_id: ZERO_OBJECT_ID.to_owned(),
                    }],
                )
                .await
                .map_err(client_failure)?;
            Ok(deleted.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use serde_json::json;

    use super::*;
    use crate::devops::tests::test_client;

    fn heads_body() -> String {
        json!({
            "count": 2,
            "value": [
                { "name": "refs/heads/feature/x", "objectId": "aaa" },
                { "name": "refs/heads/main", "objectId": "bbb" }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_list_branches_strips_the_ref_prefix() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter".into(), "heads".into()),
                Matcher::UrlEncoded("api-version".into(), "6.0".into()),
            ]))
            .with_body(heads_body())
            .create_async()
            .await;

        let tool = ListBranchesTool::new(test_client(&server));
        let result = tool
            .execute(ListBranchesParameters {
                project: "P".to_owned(),
                repository: "R".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, r#"["feature/x","main"]"#);
    }

    #[tokio::test]
    async fn test_list_branches_of_missing_repository_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let tool = ListBranchesTool::new(test_client(&server));
        let result = tool
            .execute(ListBranchesParameters {
                project: "P".to_owned(),
                repository: "nope".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "[]");
    }

    #[tokio::test]
    async fn test_create_branch_posts_a_zero_to_head_update() {
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
                    "value": [{ "name": "refs/heads/main", "objectId": "bbb" }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let update = server
            .mock("POST", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "6.0".into(),
            ))
            .match_body(Matcher::Json(json!([{
                "name": "refs/heads/dev",
                "oldObjectId": ZERO_OBJECT_ID,
                "newObjectId": "bbb"
            }])))
            .with_body("{}")
            .create_async()
            .await;

        let tool = CreateBranchTool::new(test_client(&server));
        let result = tool
            .execute(CreateBranchParameters {
                project: "P".to_owned(),
                repository: "R".to_owned(),
                branch: "dev".to_owned(),
                source_branch: "main".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "true");
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_branch_from_unknown_source_does_not_post() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", Matcher::Any)
            .with_body(json!({ "count": 0, "value": [] }).to_string())
            .create_async()
            .await;
        let update = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let tool = CreateBranchTool::new(test_client(&server));
        let result = tool
            .execute(CreateBranchParameters {
                project: "P".to_owned(),
                repository: "R".to_owned(),
                branch: "dev".to_owned(),
                source_branch: "ghost".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "false");
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_branch_posts_a_head_to_zero_update() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("filter".into(), "heads/dev".into()),
                Matcher::UrlEncoded("api-version".into(), "6.0".into()),
            ]))
            .with_body(
                json!({
                    "count": 1,
                    "value": [{ "name": "refs/heads/dev", "objectId": "ccc" }]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let update = server
            .mock("POST", "/P/_apis/git/repositories/R/refs")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "6.0".into(),
            ))
            .match_body(Matcher::Json(json!([{
                "name": "refs/heads/dev",
                "oldObjectId": "ccc",
                "newObjectId": ZERO_OBJECT_ID
            }])))
            .with_body("{}")
            .create_async()
            .await;

        let tool = DeleteBranchTool::new(test_client(&server));
        let result = tool
            .execute(DeleteBranchParameters {
                project: "P".to_owned(),
                repository: "R".to_owned(),
                branch: "dev".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "true");
        update.assert_async().await;
    }
}
