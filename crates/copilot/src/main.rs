//! The console chat loop.

#[macro_use]
extern crate tracing;

use std::io::Write as _;

use devops_copilot::{Config, DevOpsClient, DevOpsEndpoints, SessionBuilder};
use devops_copilot_openai_model::{
    CompletionConfigBuilder, OpenAIChatProvider,
};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let completion_config =
        CompletionConfigBuilder::with_api_key(config.api_key)
            .with_model(config.model_name)
            .with_endpoint(config.endpoint)
            .build();
    let provider = OpenAIChatProvider::new(completion_config);

    let client = match DevOpsClient::new(
        DevOpsEndpoints {
            org: config.org_uri,
            search: config.org_alm_uri,
            graph: config.org_alt_uri,
        },
        &config.pat,
    ) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let mut session = SessionBuilder::new(provider, client).build();

    loop {
        print!("\n{} ", "User >".bright_white());
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        print!("\n{} ", "Assistant >".bright_green());
        std::io::stdout().flush().unwrap();

        let result = session
            .run_turn(line, |delta| {
                print!("{delta}");
                std::io::stdout().flush().unwrap();
            })
            .await;
        if let Err(err) = result {
            error!("turn failed: {err}");
            eprintln!("\nSomething went wrong, please try again.");
        }
        println!();
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
