//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ServerConfig};

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};

use backend::Trace;
#[cfg(debug_assertions)]
use backend::doc::ApiDoc;
use backend::domain::{
    BoardService, BoardServiceConfig, BoardServicePorts, SearchIndexSynchronizer,
    SearchSyncConfig, SearchSyncPorts,
};
use backend::inbound::http::configure_board;
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::InMemoryEntityRepository;
use backend::outbound::search::InMemorySearchIndex;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// The board service and its index worker, wired to the in-memory adapters.
pub struct Board {
    pub service: Arc<BoardService>,
    pub synchronizer: SearchIndexSynchronizer,
}

impl Board {
    /// Wire the board. The synchronizer is created but not started.
    pub fn in_memory(board: BoardServiceConfig, sync: SearchSyncConfig) -> Self {
        let repository = Arc::new(InMemoryEntityRepository::new());
        let index = Arc::new(InMemorySearchIndex::new());
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let synchronizer = SearchIndexSynchronizer::new(
            SearchSyncPorts::new(index.clone(), repository.clone()),
            clock.clone(),
            sync,
        );
        let service = Arc::new(BoardService::new(
            BoardServicePorts {
                repository,
                index,
                outbox: Arc::new(synchronizer.clone()),
            },
            clock,
            board,
        ));
        Self {
            service,
            synchronizer,
        }
    }

    /// HTTP state serving every driving port from the board service.
    pub fn http_state(&self) -> HttpState {
        HttpState::from_service(self.service.clone())
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api/v1")
        .wrap(session)
        .configure(configure_board);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the HTTP server and mark the process ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
