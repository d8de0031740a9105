// Metric sink service

use std::sync::Arc;

use playlytics_core::{coerce_metric_value, normalize_timestamp, Metric};
use playlytics_storage::{Database, MetricRow, NewMetric, StorageError};

use crate::common::ApiError;
use crate::metrics::{CreateMetricRequest, MetricBatchItem};
use crate::services::referenced_session_ids;

pub struct MetricService {
    db: Arc<Database>,
}

impl MetricService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateMetricRequest) -> Result<Metric, ApiError> {
        let metric_value = coerce_metric_value(&req.metric_value)
            .ok_or_else(|| ApiError::Validation("metric_value must be a number".to_string()))?;

        let row = self
            .db
            .create_metric(NewMetric {
                session_id: req.session_id,
                metric_name: req.metric_name,
                metric_value,
                timestamp: normalize_timestamp(req.timestamp.as_deref()),
                level_id: req.level_id,
            })
            .await?;

        Ok(Self::row_to_metric(row))
    }

    /// Batch ingestion with the same contract as the event sink. Items with
    /// a non-coercible metric_value are dropped like any other field-invalid
    /// item; the count reflects rows actually inserted.
    pub async fn create_batch(&self, items: Vec<MetricBatchItem>) -> Result<usize, ApiError> {
        let referenced =
            referenced_session_ids(items.iter().map(|item| item.session_id.as_deref()));

        let missing = self.db.missing_sessions(&referenced).await?;
        if !missing.is_empty() {
            return Err(StorageError::SessionsNotFound(missing).into());
        }

        let mut valid = Vec::with_capacity(items.len());
        for item in items {
            match validate_batch_item(item) {
                Some(metric) => valid.push(metric),
                None => tracing::debug!("Dropping batch metric with missing or invalid fields"),
            }
        }

        let created = self.db.create_metrics(&valid).await?;
        Ok(created)
    }

    fn row_to_metric(row: MetricRow) -> Metric {
        Metric {
            id: row.id,
            session_id: row.session_id,
            metric_name: row.metric_name,
            metric_value: row.metric_value,
            timestamp: row.timestamp,
            level_id: row.level_id,
        }
    }
}

fn validate_batch_item(item: MetricBatchItem) -> Option<NewMetric> {
    let (Some(session_id), Some(metric_name)) = (item.session_id, item.metric_name) else {
        return None;
    };
    let metric_value = coerce_metric_value(&item.metric_value)?;

    Some(NewMetric {
        session_id,
        metric_name,
        metric_value,
        timestamp: normalize_timestamp(item.timestamp.as_deref()),
        level_id: item.level_id,
    })
}
