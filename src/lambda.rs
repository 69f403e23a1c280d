use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use parcel_valuation::core::service::{handle_batch_request, ServiceResponse};
use parcel_valuation::utils::{logger, validation::Validate};
use parcel_valuation::{load_valuator, LambdaConfig, S3Storage, Valuator};
use std::sync::Arc;

async fn function_handler(
    valuator: Arc<Valuator>,
    event: LambdaEvent<serde_json::Value>,
) -> Result<ServiceResponse, Error> {
    tracing::info!(request_id = %event.context.request_id, "Handling valuation request");
    let response = handle_batch_request(&valuator, event.payload);
    tracing::info!(status_code = response.status_code, "Valuation request finished");
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let lambda_config = LambdaConfig::from_env()?;
    lambda_config.validate()?;

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .region(Region::new(lambda_config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let storage = S3Storage::new(
        S3Client::from_conf(s3_config),
        lambda_config.s3_bucket.clone(),
    );

    // Loaded once per cold start and shared by every invocation.
    let valuator = Arc::new(
        load_valuator(
            &storage,
            &lambda_config.catalog_key,
            &lambda_config.territories_key,
        )
        .await?,
    );

    run(service_fn(move |event| {
        function_handler(Arc::clone(&valuator), event)
    }))
    .await
}
