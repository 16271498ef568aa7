//! OpenAPI documentation configuration

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation for the Marketplace API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "Classified-ad marketplace: product listings and user accounts",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_products::ApiDoc),
        (path = "/api/users", api = domain_users::handlers::ApiDoc)
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "products", description = "Product listing endpoints"),
        (name = "users", description = "Registration and login")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
