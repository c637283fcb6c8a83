//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every board endpoint, the health probes, and the
//! schema wrappers from [`crate::inbound::http::schemas`]. The document backs
//! Swagger UI in debug builds and is printed by `cargo run --bin openapi-dump`.

use crate::inbound::http::board_dto::{
    AnswerNoticeResponse, AnswerRequest, AnswerResponse, NoticeResponse, QuestionNoticeResponse,
    QuestionPatchRequest, QuestionRequest, QuestionResponse, QuestionThreadResponse,
    RegisterRequest, SearchHitResponse, SearchResponse, UserResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie carrying the signed-in user id.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Q&A board API",
        description = "Questions, answers, best-answer selection, and full-text search."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::questions::list_questions,
        crate::inbound::http::questions::show_question,
        crate::inbound::http::questions::create_question,
        crate::inbound::http::questions::update_question,
        crate::inbound::http::questions::destroy_question,
        crate::inbound::http::questions::search_questions,
        crate::inbound::http::answers::create_answer,
        crate::inbound::http::answers::update_answer,
        crate::inbound::http::answers::destroy_answer,
        crate::inbound::http::answers::select_best_answer,
        crate::inbound::http::users::register_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        QuestionRequest,
        QuestionPatchRequest,
        QuestionResponse,
        QuestionThreadResponse,
        QuestionNoticeResponse,
        AnswerRequest,
        AnswerResponse,
        AnswerNoticeResponse,
        NoticeResponse,
        SearchHitResponse,
        SearchResponse,
        RegisterRequest,
        UserResponse,
    )),
    tags(
        (name = "questions", description = "Asking, editing, and searching questions"),
        (name = "answers", description = "Answering and best-answer selection"),
        (name = "users", description = "Development sign-in"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
