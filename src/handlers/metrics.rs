use prometheus::{Encoder, TextEncoder};

use crate::error::AppError;

// Prometheus text exposition of the default registry
pub async fn metrics_handler() -> Result<String, AppError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| AppError::Internal(format!("metrics encoding failed: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| AppError::Internal(format!("metrics not utf-8: {}", e)))
}
