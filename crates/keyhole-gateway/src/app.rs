use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{
    create_url_handler, delete_url_handler, health_handler, redirect_handler, update_url_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/short", post(create_url_handler))
            .route(
                "/{short_id}",
                get(redirect_handler)
                    .put(update_url_handler)
                    .delete(delete_url_handler),
            )
            .with_state(state)
    }
}
