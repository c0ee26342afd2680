use crate::routes::{chat, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "krishi-server",
    description = "Agricultural assistant chat API",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root
}
