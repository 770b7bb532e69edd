//! OpenAPI documentation.
//! Served at /api/openapi.json and rendered by RapiDoc under /docs.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use clipshare_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Registers the bearer scheme guarding the sweep trigger.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "sweep_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipshare API",
        version = "0.1.0",
        description = "Ephemeral file sharing: upload files, get a short code, fetch them with the code until the retention window passes and a sweep removes them."
    ),
    paths(
        handlers::upload::create_upload,
        handlers::manifest::get_upload,
        handlers::manifest::receive,
        handlers::file_download::download_file,
        handlers::sweep::trigger_sweep,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::ManifestResponse,
            models::SharedFile,
            models::SweepReport,
            error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "uploads", description = "Upload a batch of files and look it up by code"),
        (name = "files", description = "File content of a live upload"),
        (name = "maintenance", description = "Expiration sweep trigger")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_public_paths() {
        let spec = get_openapi_spec();
        for path in [
            "/api/v0/uploads",
            "/api/v0/uploads/{code}",
            "/api/v0/receive",
            "/files/{key}",
            "/internal/sweep",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("sweep_token"));
    }
}
