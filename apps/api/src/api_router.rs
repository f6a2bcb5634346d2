use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use vitrine_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    cors_origins: &[&str],
    identity_header: &str,
) -> Result<Router, AppError> {
    let store_routes = Router::new()
        .route(
            "/api/stores",
            get(handlers::stores::list_stores_handler).post(handlers::stores::create_store_handler),
        )
        .route(
            "/api/stores/{store_id}",
            get(handlers::stores::get_store_handler)
                .patch(handlers::stores::rename_store_handler)
                .delete(handlers::stores::delete_store_handler),
        )
        .route(
            "/api/stores/{store_id}/overview",
            get(handlers::stores::store_overview_handler),
        );

    let resource_routes = Router::new()
        .route(
            "/api/{store_id}/{resource}",
            get(handlers::resources::list_resources_handler)
                .post(handlers::resources::create_resource_handler),
        )
        .route(
            "/api/{store_id}/{resource}/{id}",
            get(handlers::resources::get_resource_handler)
                .patch(handlers::resources::update_resource_handler)
                .delete(handlers::resources::delete_resource_handler),
        );

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(store_routes)
        .merge(resource_routes)
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::resolve_principal,
        ))
        .layer(from_fn_with_state(
            app_state.clone(),
            middleware::legacy_status_codes,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(cors_origins, identity_header)?)
        .with_state(app_state))
}
