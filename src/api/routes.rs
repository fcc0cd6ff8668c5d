use axum::http::HeaderValue;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::auth;
use crate::config::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let board_routes = Router::new()
        .route(
            "/",
            get(handlers::boards::list_boards).post(handlers::boards::create_board),
        )
        .route(
            "/{id}",
            get(handlers::boards::get_board)
                .patch(handlers::boards::update_board)
                .delete(handlers::boards::delete_board),
        )
        .route("/{id}/lists", post(handlers::lists::create_list));

    let list_routes = Router::new()
        .route(
            "/{id}",
            patch(handlers::lists::update_list).delete(handlers::lists::delete_list),
        )
        .route("/{id}/reorder", patch(handlers::lists::reorder_list));

    let card_routes = Router::new()
        .route(
            "/",
            get(handlers::cards::board_cards).post(handlers::cards::create_card),
        )
        .route(
            "/{id}",
            get(handlers::cards::get_card)
                .patch(handlers::cards::update_card)
                .delete(handlers::cards::delete_card),
        )
        .route("/{id}/move", patch(handlers::cards::move_card))
        .route("/{id}/complete", put(handlers::cards::toggle_complete));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .route("/ws", get(handlers::ws::ws_handler));

    let protected_routes = Router::new()
        .nest("/api/boards", board_routes)
        .nest("/api/lists", list_routes)
        .nest("/api/cards", card_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
