use utoipa::OpenApi;

/// Root API documentation; domain docs are nested under their mount points.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo API",
        description = "CRUD service for todos with unique titles"
    ),
    nest(
        (path = "/api/v1/todos", api = domain_todos::ApiDoc)
    )
)]
pub struct ApiDoc;
