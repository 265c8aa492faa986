use std::sync::Arc;

use axum::extract::{Form, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqslite_queue::QueueConfig;

use crate::api::{err, ok, parse_i64, require_field};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
#[allow(non_snake_case)]
pub struct QueueConfigForm {
    #[serde(default)]
    pub QueueName: Option<String>,
    #[serde(default)]
    pub VisibilityTimeout: Option<String>,
    #[serde(default)]
    pub MessageRetentionPeriod: Option<String>,
    #[serde(default)]
    pub DelaySeconds: Option<String>,
}

/// Fields validated as present, but not yet parsed as integers — parsing
/// a non-numeric value is a separate, already-handled concern
/// ([`parse_i64`]'s coerce-to-zero).
struct QueueConfigFields {
    queue_name: String,
    visibility_timeout: String,
    message_retention_period: String,
    delay_seconds: String,
}

impl QueueConfigForm {
    fn require_fields(self) -> Result<QueueConfigFields, sqslite_queue::BrokerError> {
        Ok(QueueConfigFields {
            queue_name: require_field(self.QueueName, "QueueName")?,
            visibility_timeout: require_field(self.VisibilityTimeout, "VisibilityTimeout")?,
            message_retention_period: require_field(
                self.MessageRetentionPeriod,
                "MessageRetentionPeriod",
            )?,
            delay_seconds: require_field(self.DelaySeconds, "DelaySeconds")?,
        })
    }
}

impl QueueConfigFields {
    fn into_config(&self) -> QueueConfig {
        QueueConfig {
            name: self.queue_name.clone(),
            visibility_timeout_s: parse_i64(&self.visibility_timeout),
            retention_s: parse_i64(&self.message_retention_period),
            default_delay_s: parse_i64(&self.delay_seconds),
        }
    }

    fn echo(&self) -> Value {
        json!({
            "QueueName": self.queue_name,
            "VisibilityTimeout": self.visibility_timeout,
            "MessageRetentionPeriod": self.message_retention_period,
            "DelaySeconds": self.delay_seconds,
        })
    }
}

pub async fn create_queue(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QueueConfigForm>,
) -> Json<Value> {
    let fields = match form.require_fields() {
        Ok(f) => f,
        Err(e) => return err(e),
    };
    let echo = fields.echo();
    match state.dispatcher.create_queue(fields.into_config()).await {
        Ok(()) => ok(echo),
        Err(e) => err(e),
    }
}

pub async fn update_queue(
    State(state): State<Arc<AppState>>,
    Form(form): Form<QueueConfigForm>,
) -> Json<Value> {
    let fields = match form.require_fields() {
        Ok(f) => f,
        Err(e) => return err(e),
    };
    let echo = fields.echo();
    match state.dispatcher.update_queue(fields.into_config()).await {
        Ok(()) => ok(echo),
        Err(e) => err(e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DeleteQueueForm {
    #[serde(rename = "queueName", default)]
    pub queue_name: Option<String>,
}

pub async fn delete_queue(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteQueueForm>,
) -> Json<Value> {
    let queue_name = match require_field(form.queue_name, "queueName") {
        Ok(n) => n,
        Err(e) => return err(e),
    };
    match state.dispatcher.delete_queue(&queue_name).await {
        Ok(()) => ok(json!({ "queueName": queue_name })),
        Err(e) => err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_converts_into_config() {
        let form = QueueConfigForm {
            QueueName: Some("q1".to_string()),
            VisibilityTimeout: Some("30".to_string()),
            MessageRetentionPeriod: Some("0".to_string()),
            DelaySeconds: Some("5".to_string()),
        };
        let fields = form.require_fields().unwrap();
        let cfg = fields.into_config();
        assert_eq!(cfg.name, "q1");
        assert_eq!(cfg.visibility_timeout_s, 30);
        assert_eq!(cfg.default_delay_s, 5);
    }

    #[test]
    fn non_numeric_field_coerces_to_zero() {
        let form = QueueConfigForm {
            QueueName: Some("q1".to_string()),
            VisibilityTimeout: Some("not-a-number".to_string()),
            MessageRetentionPeriod: Some("0".to_string()),
            DelaySeconds: Some("0".to_string()),
        };
        let fields = form.require_fields().unwrap();
        assert_eq!(fields.into_config().visibility_timeout_s, 0);
    }

    #[test]
    fn missing_field_is_rejected_before_dispatch() {
        let form = QueueConfigForm {
            QueueName: None,
            ..Default::default()
        };
        assert!(matches!(
            form.require_fields(),
            Err(sqslite_queue::BrokerError::InvalidArgument(_))
        ));
    }
}
