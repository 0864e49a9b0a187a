use devops_copilot_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::client_failure;
use crate::devops::DevOpsClient;

#[derive(Deserialize, JsonSchema)]
pub struct CodeSearchParameters {
    #[schemars(description = "The name of the project to search in.")]
    project: String,
    #[schemars(description = "The text to search for.")]
    search_text: String,
}

/// A tool for searching code across the repositories of a project.
pub struct CodeSearchTool {
    client: DevOpsClient,
    parameter_schema: Value,
}

impl CodeSearchTool {
    #[inline]
    pub fn new(client: DevOpsClient) -> Self {
        Self {
            client,
            parameter_schema: schema_for!(CodeSearchParameters).to_value(),
        }
    }
}

impl Tool for CodeSearchTool {
    type Input = CodeSearchParameters;

    fn name(&self) -> &str {
        "code_search"
    }

    fn description(&self) -> &str {
        "Searches the code of a project for a piece of text and returns \
         the matching files with their hit positions."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: CodeSearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            let results = client
                .code_search(&input.project, &input.search_text)
                .await
                .map_err(client_failure)?;

            // The result document is passed through whole; the model reads
            // the file names and hit offsets out of it directly.
            let Some(results) = results else {
                return Ok(String::new());
            };
            let count = results
                .get("count")
                .and_then(Value::as_u64)
                .unwrap_or_default();
            if count == 0 {
                return Ok(String::new());
            }
            serde_json::to_string(&results)
                .map_err(|err| client_failure(err.into()))
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
    async fn test_code_search_passes_the_document_through() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "count": 1,
            "results": [{
                "fileName": "main.rs",
                "path": "/src/main.rs",
                "matches": { "content": [{ "charOffset": 10, "length": 4 }] }
            }]
        });
        server
            .mock("POST", "/Alpha/_apis/search/codesearchresults")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "searchText": "TODO",
                "$skip": 0,
                "$top": 50,
                "filters": { "Project": ["Alpha"] }
            })))
            .with_body(body.to_string())
            .create_async()
            .await;

        let tool = CodeSearchTool::new(test_client(&server));
        let result = tool
            .execute(CodeSearchParameters {
                project: "Alpha".to_owned(),
                search_text: "TODO".to_owned(),
            })
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, body);
    }

    #[tokio::test]
    async fn test_no_hits_is_empty() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", Matcher::Any)
            .with_body(json!({ "count": 0, "results": [] }).to_string())
            .create_async()
            .await;

        let tool = CodeSearchTool::new(test_client(&server));
        let result = tool
            .execute(CodeSearchParameters {
                project: "Alpha".to_owned(),
                search_text: "nonexistent".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(result, "");
    }
}
