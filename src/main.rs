use lambda_runtime::{service_fn, Error, LambdaEvent};
use memescout::{handle_event, HandlerResponse};
use memescout_core::AppConfig;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "memescout=info,memescout_core=info,reddit_client=info";

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting memescout search function with {:?}", config);

    let config = &config;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let (payload, context) = event.into_parts();
        tracing::info!("Handling invocation {}", context.request_id);
        Ok::<HandlerResponse, Error>(handle_event(config, payload).await)
    }))
    .await
}
