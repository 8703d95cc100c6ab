//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
///
/// Products and users document paths relative to their mount point; the
/// other domains carry their own `context_path` and nest directly under `/api`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tornado Watches API",
        version = "0.1.0",
        description = "Storefront backend: catalog, accounts, cart and checkout, editorial content and customer support",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/products", api = domain_products::ApiDoc),
        (path = "/api/users", api = domain_users::ApiDoc),
        (path = "/api", api = domain_cart::ApiDoc),
        (path = "/api", api = domain_catalog::ApiDoc),
        (path = "/api", api = domain_content::ApiDoc),
        (path = "/api", api = domain_support::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_domain_is_documented() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/products",
            "/api/users/login",
            "/api/cart/checkout",
            "/api/admin/carts/mark-abandoned",
            "/api/categories",
            "/api/brands",
            "/api/blogs",
            "/api/faqs",
            "/api/testimonials/featured",
            "/api/contact",
            "/api/newsletter/subscribe",
            "/api/warranty/mine",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }
}
