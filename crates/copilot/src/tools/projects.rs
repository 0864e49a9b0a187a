use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::DevOpsClient;

#[derive(Deserialize, JsonSchema)]
pub struct ListProjectsParameters {}

/// A tool for listing the projects of the organization.
pub struct ListProjectsTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl ListProjectsTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(ListProjectsParameters).to_value(),
        }
    }
}

impl Tool for ListProjectsTool {
    type Input = ListProjectsParameters;

    fn name(&self) -> &str {
        "list_projects"
    }

    fn description(&self) -> &str {
        "Lists the names of all projects in the organization."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        _input: ListProjectsParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let projects =
                client.list_projects().await.map_err(client_failure)?;
            let names: Vec<String> = projects
                .map(|list| {
                    list.value.into_iter().map(|p| p.name).collect()
                })
                .unwrap_or_default();
            serde_json::to_string(&names)
                .map_err(|err| client_failure(err.into()))
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct CreateProjectParameters {
    #[schemars(description = "The name of the project to create.")]
    name: String,
    #[schemars(description = "A short description of the project.")]
    description: String,
}

/// A tool for creating a project.
pub struct CreateProjectTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl CreateProjectTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(CreateProjectParameters).to_value(),
        }
    }
}

impl Tool for CreateProjectTool {
    type Input = CreateProjectParameters;

    fn name(&self) -> &str {
        "create_project"
    }

    fn description(&self) -> &str {
        "Creates a new project in the organization, backed by Git version \
         control. Returns \"true\" on success, \"false\" if a project with \
         that name already exists."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: CreateProjectParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            // An existing project with the same name must not be touched.
            // When the listing itself is unavailable the creation still
            // proceeds and the service has the final word.
            let exists = client
                .list_projects()
                .await
                .map_err(client_failure)?
                .is_some_and(|list| {
                    list.value.iter().any(|p| p.name == input.name)
                });
            if exists {
                return Ok("false".to_owned());
            }

            let created = client
                .create_project(&input.name, &input.description)
                .await
                .map_err(client_failure)?;
            Ok(created.to_string())
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct DeleteProjectParameters {
    #[schemars(description = "The name of the project to delete.")]
    name: String,
}

/// A tool for deleting a project by name.
pub struct DeleteProjectTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl DeleteProjectTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(DeleteProjectParameters).to_value(),
        }
    }
}

impl Tool for DeleteProjectTool {
    type Input = DeleteProjectParameters;

    fn name(&self) -> &str {
        "delete_project"
    }

    fn description(&self) -> &str {
        "Deletes a project from the organization. Returns \"true\" on \
         success, \"false\" if no project with that name exists."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: DeleteProjectParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            // Deletion goes by id, so resolve the name first.
            let id = client
                .list_projects()
                .await
                .map_err(client_failure)?
                .and_then(|list| {
                    list.value
                        .into_iter()
                        .find(|p| p.name == input.name)
                        .map(|p| p.id)
                });
            let Some(id) = id else {
                return Ok("false".to_owned());
            };

            let deleted =
                client.delete_project(&id).await.map_err(client_failure)?;
            Ok(deleted.to_string())
        }
    }
}
