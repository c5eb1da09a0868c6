use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};

pub const ARTIFACT_CONTENT_TYPE: &str = "application/json";
const ARTIFACT_MESSAGE: &str = "Procesamiento simulado exitoso";
const STATUS_COMPLETED: &str = "completed";

/// Descriptor written in place of a real processed image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessedArtifact {
    pub original_file: String,
    pub processed_file: String,
    pub processed_at: String,
    pub processing_time: String,
    pub simulation: bool,
    pub message: String,
    pub bucket: String,
    pub lambda_function: String,
    pub status: String,
}

impl ProcessedArtifact {
    pub fn new(
        original_file: &str,
        processed_file: &str,
        bucket: &str,
        lambda_function: &str,
        processing_time: Duration,
        processed_at: String,
    ) -> Self {
        ProcessedArtifact {
            original_file: original_file.to_string(),
            processed_file: processed_file.to_string(),
            processed_at,
            processing_time: describe_processing_time(processing_time),
            simulation: true,
            message: ARTIFACT_MESSAGE.to_string(),
            bucket: bucket.to_string(),
            lambda_function: lambda_function.to_string(),
            status: STATUS_COMPLETED.to_string(),
        }
    }

    /// Pretty JSON, two space indent.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// User metadata attached to the stored object.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("processed-by".to_string(), "aws-lambda".to_string()),
            ("original-file".to_string(), self.original_file.clone()),
            ("lambda-function".to_string(), self.lambda_function.clone()),
        ])
    }
}

/// `500ms` -> `0.5 segundos`
pub fn describe_processing_time(elapsed: Duration) -> String {
    format!("{} segundos", elapsed.as_secs_f64())
}
