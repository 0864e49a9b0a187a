use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::DevOpsClient;
use crate::devops::types::BuildSummary;

#[derive(Deserialize, JsonSchema)]
pub struct ListBuildsParameters {
    #[schemars(description = "The name of the project.")]
    project: String,
    #[schemars(description = "The name of the repository.")]
    repository: String,
}

/// A tool for listing the builds of a repository.
pub struct ListBuildsTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl ListBuildsTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(ListBuildsParameters).to_value(),
        }
    }
}

impl Tool for ListBuildsTool {
    type Input = ListBuildsParameters;

    fn name(&self) -> &str {
        "list_builds"
    }

    fn description(&self) -> &str {
        "Lists the builds of a repository with their status, result, \
         timing, source branch and requesting user."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: ListBuildsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            // The build endpoint filters by repository id.
            let repository = client
                .get_repository(&input.project, &input.repository)
                .await
                .map_err(client_failure)?;
            let Some(repository) = repository else {
                return Ok(String::new());
            };

            let builds = client
                .list_builds(&input.project, &repository.id)
                .await
                .map_err(client_failure)?;
            let summaries: Vec<BuildSummary> = builds
                .map(|list| {
                    list.value.into_iter().map(BuildSummary::from).collect()
                })
                .unwrap_or_default();
            if summaries.is_empty() {
                return Ok(String::new());
            }
            serde_json::to_string(&summaries)
                .map_err(|err| client_failure(err.into()))
        }
    }
}
