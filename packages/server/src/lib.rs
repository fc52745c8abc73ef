pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod rules;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Catalog API",
        version = "1.0.0",
        description = "Catalog administration API: categories, genres, cast members and videos with their files"
    ),
    tags(
        (name = "Categories", description = "Category CRUD operations"),
        (name = "Genres", description = "Genre CRUD operations and their categories"),
        (name = "Cast Members", description = "Cast member CRUD operations"),
        (name = "Videos", description = "Video CRUD operations with relations and file uploads"),
        (name = "Files", description = "Stored video files"),
    ),
)]
struct ApiDoc;

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
