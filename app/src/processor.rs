//! The `image-processor` function: text transforms for direct calls and a
//! simulated processing step for uploads landing in the bucket.

use std::{sync::Arc, time::Duration};

use lamp_core::{
    artifact::{describe_processing_time, ProcessedArtifact, ARTIFACT_CONTENT_TYPE},
    classify, keys, ApiGatewayResponse, DispatchResponse, EventError, InboundEvent,
    SkippedResponse, TextAction, TextRequest, UploadNotification,
};
use serde_json::{json, Value};

use crate::storage::{ObjectStore, PutObject, StoreError};

const TEXT_MESSAGE: &str = "¡Procesamiento de texto exitoso!";
const UPLOAD_MESSAGE: &str = "Procesamiento de imagen simulado exitoso";
const UNRECOGNIZED_MESSAGE: &str = "Evento no reconocido";
const UNRECOGNIZED_SUGGESTION: &str = "Usa {text: \"texto\"} para pruebas o sube archivos a S3";

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Event(#[from] EventError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("could not serialize processed artifact: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    pub uploads_prefix: String,
    pub processed_prefix: String,
    /// Stand-in for the time real image processing would take.
    pub processing_delay: Duration,
    /// Only used to build the object url handed back to callers.
    pub region: String,
    pub function_name: String,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        ProcessorSettings {
            uploads_prefix: keys::UPLOADS_PREFIX.to_string(),
            processed_prefix: keys::PROCESSED_PREFIX.to_string(),
            processing_delay: Duration::from_millis(500),
            region: "us-east-1".to_string(),
            function_name: "image-processor".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImageProcessor {
    store: Arc<dyn ObjectStore>,
    settings: ProcessorSettings,
}

impl ImageProcessor {
    pub fn new(store: Arc<dyn ObjectStore>, settings: ProcessorSettings) -> Self {
        log::debug!("image processor writing through {}", store.name());
        Self { store, settings }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    /// Handle one invocation. Every failure is reported as a 500 envelope,
    /// the invocation itself never errors.
    pub async fn handle(&self, event: &Value) -> DispatchResponse {
        log::info!("event received: {}", event);
        match self.dispatch(event).await {
            Ok(response) => response,
            Err(e) => {
                log::error!("{} failed: {}", self.settings.function_name, e);
                ApiGatewayResponse::json(
                    500,
                    &json!({
                        "success": false,
                        "error": e.to_string(),
                        "lambda_function": self.settings.function_name,
                    }),
                )
                .into()
            }
        }
    }

    async fn dispatch(&self, event: &Value) -> Result<DispatchResponse, ProcessError> {
        let inbound = classify(event)?;
        log::debug!("classified event as {}", inbound.kind());
        match inbound {
            InboundEvent::Text(request) => Ok(self.handle_text(&request).into()),
            InboundEvent::StorageUpload(notification) => self.handle_upload(&notification).await,
            InboundEvent::Unrecognized => {
                log::warn!("rejected: unrecognized event");
                Ok(ApiGatewayResponse::json(
                    400,
                    &json!({
                        "success": false,
                        "message": UNRECOGNIZED_MESSAGE,
                        "suggestion": UNRECOGNIZED_SUGGESTION,
                    }),
                )
                .into())
            }
        }
    }

    fn handle_text(&self, request: &TextRequest) -> ApiGatewayResponse {
        let action = TextAction::parse(&request.action);
        let result = action.apply(&request.text);
        log::info!("text handled: action={}", action);
        ApiGatewayResponse::json(
            200,
            &json!({
                "success": true,
                "input": request.text,
                "action": request.action,
                "result": result,
                "processed_by": format!("AWS Lambda {}", self.settings.function_name),
                "timestamp": lamp_core::iso_timestamp(),
                "message": TEXT_MESSAGE,
            }),
        )
        .with_cors()
    }

    async fn handle_upload(
        &self,
        notification: &UploadNotification,
    ) -> Result<DispatchResponse, ProcessError> {
        let UploadNotification { bucket, key } = notification;
        log::info!("processing s3://{}/{}", bucket, key);

        if !keys::is_upload(key, &self.settings.uploads_prefix) {
            log::info!(
                "storage skipped: {} is not under {}",
                key,
                self.settings.uploads_prefix
            );
            return Ok(DispatchResponse::Skipped(SkippedResponse::default()));
        }

        let new_key = keys::processed_key(key, &self.settings.processed_prefix);
        log::info!("processing {} into {}", key, new_key);

        tokio::time::sleep(self.settings.processing_delay).await;

        let artifact = ProcessedArtifact::new(
            key,
            &new_key,
            bucket,
            &self.settings.function_name,
            self.settings.processing_delay,
            lamp_core::iso_timestamp(),
        );
        self.store
            .put_object(PutObject {
                bucket: bucket.clone(),
                key: new_key.clone(),
                body: artifact.to_json()?.into_bytes(),
                content_type: ARTIFACT_CONTENT_TYPE.to_string(),
                metadata: artifact.metadata(),
            })
            .await?;
        log::info!("storage handled: wrote s3://{}/{}", bucket, new_key);

        Ok(ApiGatewayResponse::json(
            200,
            &json!({
                "success": true,
                "message": UPLOAD_MESSAGE,
                "original": key,
                "processed": new_key,
                "bucket": bucket,
                "processing_time": describe_processing_time(self.settings.processing_delay),
                "timestamp": lamp_core::iso_timestamp(),
                "lambda_function": self.settings.function_name,
                "s3_url": keys::object_url(bucket, &self.settings.region, &new_key),
            }),
        )
        .into())
    }
}
