use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambdas::tracing::init();
    let renderer = lambdas::common::build_renderer()?;
    let renderer = &renderer;
    run(service_fn(
        move |event: LambdaEvent<serde_json::Value>| async move {
            lambdas::entrypoint::render(renderer, event)
        },
    ))
    .await
}
