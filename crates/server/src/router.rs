use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::{messages, ping, queues};
use crate::middleware::catch_panics;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/createQueue", post(queues::create_queue))
        .route("/updateQueue", post(queues::update_queue))
        .route("/delQueue", post(queues::delete_queue))
        .route("/push", post(messages::push))
        .route("/pop", get(messages::pop).post(messages::pop))
        .route("/delMessage", post(messages::del_message))
        .route("/setVisibilityTime", post(messages::set_visibility_time))
        .route("/ping", get(ping::ping).post(ping::ping))
        .layer(axum::middleware::from_fn(catch_panics))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
