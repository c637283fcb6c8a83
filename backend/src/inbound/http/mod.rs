//! HTTP inbound adapter exposing the board's REST endpoints.

pub mod answers;
pub mod board_dto;
pub mod error;
pub mod health;
pub mod questions;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every board endpoint on a service config.
///
/// Callers mount this under `/api/v1` and provide [`state::HttpState`] as
/// application data.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use backend::inbound::http::configure_board;
///
/// let app = App::new().service(web::scope("/api/v1").configure(configure_board));
/// ```
pub fn configure_board(cfg: &mut web::ServiceConfig) {
    error::configure_extractors(cfg);
    cfg.service(questions::list_questions)
        .service(questions::search_questions)
        .service(questions::create_question)
        .service(questions::show_question)
        .service(questions::update_question)
        .service(questions::destroy_question)
        .service(answers::create_answer)
        .service(answers::update_answer)
        .service(answers::select_best_answer)
        .service(answers::destroy_answer)
        .service(users::register_user);
}
