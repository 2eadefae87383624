//! Synchronous example demonstrating the Value SDK.
//!
//! Expects an OpenTelemetry collector on localhost:4317 and
//! `VALUE_AGENT_SECRET` in the environment (or a `.env` file).

use value_sdk::{Action, initialize_sync, with_task_name};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = initialize_sync("sync-example-agent")?;

    let result = with_task_name("sync-agent", || -> value_sdk::Result<String> {
        let data = "hello world";
        println!("Processing data: {data}");

        let scope = client.action_scope("anon456").user_id("user123").build()?;
        let _entered = scope.enter();

        let mut action_span = client
            .action()
            .start(Action::new("transform_data").attribute("data_length", data.len()))?;
        action_span.add_event("Starting transformation");
        let result = data.to_uppercase();
        action_span.set_attribute("result_length", result.len() as i64);
        action_span.add_event("Transformation complete");
        action_span.end();

        Ok(result)
    })?;
    println!("Result: {result}");

    client.shutdown()?;
    Ok(())
}
