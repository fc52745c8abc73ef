use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers::{cast_member, category, files, genre, video};
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/categories", category_routes())
        .nest("/genres", genre_routes())
        .nest("/cast_members", cast_member_routes())
        .nest("/videos", video_routes(config))
        .nest("/files", file_routes())
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(category::list_categories, category::create_category))
        .routes(routes!(
            category::get_category,
            category::update_category,
            category::delete_category
        ))
}

fn genre_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(genre::list_genres, genre::create_genre))
        .routes(routes!(genre::get_genre, genre::update_genre, genre::delete_genre))
}

fn cast_member_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            cast_member::list_cast_members,
            cast_member::create_cast_member
        ))
        .routes(routes!(
            cast_member::get_cast_member,
            cast_member::update_cast_member,
            cast_member::delete_cast_member
        ))
}

fn video_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(video::list_videos, video::create_video))
        .routes(routes!(video::get_video, video::update_video, video::delete_video))
        .layer(video::video_body_limit(config.storage.max_upload_size))
}

fn file_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(files::get_file))
}
