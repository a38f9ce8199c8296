//! commonforms Lambda - Entry point

use commonforms_lambda::{
    configure_runtime_environment, CommandPreparer, FormHandler, HandlerConfig,
    InvocationContext,
};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Mutates the process environment, so it runs before any runtime thread exists
    let runtime_env = configure_runtime_environment();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commonforms_lambda=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::info!(
        sandboxed = runtime_env.sandboxed,
        redirected = ?runtime_env.applied,
        "Starting commonforms Lambda"
    );

    let preparer = CommandPreparer::from_env();
    tracing::info!(program = preparer.program(), "Using conversion command");

    let handler = Arc::new(FormHandler::new(HandlerConfig::from_env(), preparer));

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(handler))
}

async fn run(handler: Arc<FormHandler<CommandPreparer>>) -> anyhow::Result<()> {
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            let LambdaEvent { payload, context } = event;
            let invocation = InvocationContext {
                request_id: context.request_id,
            };

            // The conversion blocks on a child process for its whole duration
            let response =
                tokio::task::spawn_blocking(move || handler.handle(&payload, &invocation)).await?;

            Ok::<_, lambda_runtime::Error>(response)
        }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))
}
