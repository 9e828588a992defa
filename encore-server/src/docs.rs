use std::borrow::BorrowMut;

use axum::{response::IntoResponse, Json};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{auth, queue, schemas, serialized};

#[derive(OpenApi)]
#[openapi(
    modifiers(&Security),
    info(
        description = "encore-server exposes endpoints to interact with this encore instance"
    ),
    paths(
        auth::login,
        auth::user,
        auth::logout,
        queue::submit,
        queue::list,
        queue::vote,
        queue::retract_vote,
        queue::advance,
    ),
    components(schemas(
        schemas::LoginSchema,
        schemas::SubmitSchema,
        serialized::User,
        serialized::LoginResult,
        serialized::QueueItem,
        serialized::RankedQueueItem,
        serialized::QueueView,
        serialized::SubmitResult,
    ))
)]
pub struct ApiDoc;

struct Security;

impl Modify for Security {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.borrow_mut() {
            let scheme = HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("Bearer <token>")
                .build();

            components.add_security_scheme("BearerAuth", SecurityScheme::Http(scheme))
        }
    }
}

pub async fn docs() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
