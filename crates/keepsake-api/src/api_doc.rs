//! OpenAPI documentation, served at `/api/openapi.json` and rendered under `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use keepsake_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Keepsake API",
        version = "0.1.0",
        description = "Wedding photo albums: album management, photo and video uploads, and media serving."
    ),
    paths(
        handlers::health::health_check,
        handlers::albums::create_album,
        handlers::albums::list_albums,
        handlers::albums::get_album,
        handlers::albums::update_album,
        handlers::albums::delete_album,
        handlers::photos::upload_photo,
        handlers::photos::list_album_photos,
        handlers::photos::get_photo,
        handlers::photos::delete_photo,
        handlers::uploads::serve_upload,
    ),
    components(schemas(
        models::Album,
        models::CoupleNames,
        models::CreateAlbumRequest,
        models::UpdateAlbumRequest,
        models::MediaRecord,
        error::ErrorResponse,
        error::FileNotFoundResponse,
        handlers::health::HealthResponse,
    )),
    tags(
        (name = "albums", description = "Wedding albums"),
        (name = "photos", description = "Photos and videos inside albums"),
        (name = "uploads", description = "Stored media bytes"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;
