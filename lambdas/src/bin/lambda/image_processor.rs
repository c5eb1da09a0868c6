use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambdas::tracing::init();
    let app = lambdas::common::build_app().await?;
    let processor = &app.processor;
    run(service_fn(
        move |event: LambdaEvent<serde_json::Value>| async move {
            lambdas::entrypoint::dispatch(processor, event).await
        },
    ))
    .await
}
