//! Async example demonstrating the Value SDK's direct `send` API.
//!
//! Expects an OpenTelemetry collector on localhost:4317 and
//! `VALUE_AGENT_SECRET` in the environment (or a `.env` file).

use std::time::Duration;
use value_sdk::{Action, initialize_async, with_task_name_async};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = initialize_async("async-example-agent").await?;

    let scope = client.action_scope("anon456").user_id("user123").build()?;
    let result = scope
        .in_scope(with_task_name_async("async-agent", async {
            let data = "hello async world";
            println!("Processing data: {data}");
            tokio::time::sleep(Duration::from_millis(500)).await;
            let result = data.to_uppercase();

            scope.send(
                Action::new("transform_data")
                    .attribute("data_length", data.len())
                    .attribute("result_length", result.len()),
            )?;
            Ok::<_, value_sdk::ValueSdkError>(result)
        }))
        .await?;
    println!("Result: {result}");

    client.shutdown()?;
    Ok(())
}
