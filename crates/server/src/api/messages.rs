use std::sync::Arc;

use axum::extract::{Form, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqslite_queue::ready::clamp_wait_seconds;

use crate::api::{err, ok, parse_i64, require_field};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct PushForm {
    #[serde(rename = "queueName", default)]
    pub queue_name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "delaySeconds", default)]
    pub delay_seconds: Option<String>,
}

pub async fn push(State(state): State<Arc<AppState>>, Form(form): Form<PushForm>) -> Json<Value> {
    let queue_name = match require_field(form.queue_name, "queueName") {
        Ok(n) => n,
        Err(e) => return err(e),
    };
    let body = match require_field(form.body, "body") {
        Ok(b) => b,
        Err(e) => return err(e),
    };
    let delay_seconds = form.delay_seconds.unwrap_or_default();
    let delay = if delay_seconds.is_empty() {
        None
    } else {
        Some(parse_i64(&delay_seconds))
    };

    match state.dispatcher.push(&queue_name, &body, delay).await {
        Ok(()) => ok(json!({
            "queueName": queue_name,
            "body": body,
            "delaySeconds": delay_seconds,
        })),
        Err(e) => err(e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct PopForm {
    #[serde(rename = "queueName", default)]
    pub queue_name: Option<String>,
    #[serde(rename = "waitSeconds", default)]
    pub wait_seconds: Option<String>,
}

pub async fn pop(State(state): State<Arc<AppState>>, Form(form): Form<PopForm>) -> Json<Value> {
    let queue_name = match require_field(form.queue_name, "queueName") {
        Ok(n) => n,
        Err(e) => return err(e),
    };
    let wait_s = clamp_wait_seconds(parse_i64(&form.wait_seconds.unwrap_or_default()));
    match state.dispatcher.pop(&queue_name, wait_s).await {
        Ok(body) => ok(json!({ "body": body })),
        Err(e) => err(e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct DelMessageForm {
    #[serde(rename = "queueName", default)]
    pub queue_name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

pub async fn del_message(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DelMessageForm>,
) -> Json<Value> {
    let queue_name = match require_field(form.queue_name, "queueName") {
        Ok(n) => n,
        Err(e) => return err(e),
    };
    let body = match require_field(form.body, "body") {
        Ok(b) => b,
        Err(e) => return err(e),
    };
    match state.dispatcher.delete_message(&queue_name, &body).await {
        Ok(()) => ok(json!({ "body": body })),
        Err(e) => err(e),
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SetVisibilityForm {
    #[serde(rename = "queueName", default)]
    pub queue_name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "visibilityTime", default)]
    pub visibility_time: Option<String>,
}

pub async fn set_visibility_time(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SetVisibilityForm>,
) -> Json<Value> {
    let queue_name = match require_field(form.queue_name, "queueName") {
        Ok(n) => n,
        Err(e) => return err(e),
    };
    let body = match require_field(form.body, "body") {
        Ok(b) => b,
        Err(e) => return err(e),
    };
    // A missing/empty visibilityTime coerces to 0, which `Dispatcher::extend_visibility`
    // treats as "use the queue's configured visibility timeout" (SPEC_FULL §4.4).
    let visibility_time = form.visibility_time.unwrap_or_default();
    let extra = parse_i64(&visibility_time);
    match state
        .dispatcher
        .extend_visibility(&queue_name, &body, extra)
        .await
    {
        Ok(()) => ok(json!({
            "queueName": queue_name,
            "visibilityTime": visibility_time,
        })),
        Err(e) => err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_queue_name_is_rejected_before_dispatch() {
        let result = require_field(None, "queueName");
        assert!(matches!(
            result,
            Err(sqslite_queue::BrokerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn empty_delay_seconds_means_use_default_delay() {
        let form = PushForm {
            queue_name: Some("q1".to_string()),
            body: Some("hello".to_string()),
            delay_seconds: None,
        };
        assert_eq!(form.delay_seconds.unwrap_or_default(), "");
    }
}
