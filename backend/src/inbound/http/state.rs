//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{BoardCommand, BoardQuery, UserRegistration};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub command: Arc<dyn BoardCommand>,
    pub query: Arc<dyn BoardQuery>,
    pub registration: Arc<dyn UserRegistration>,
}

impl HttpState {
    /// Bundle the driving ports.
    pub fn new(
        command: Arc<dyn BoardCommand>,
        query: Arc<dyn BoardQuery>,
        registration: Arc<dyn UserRegistration>,
    ) -> Self {
        Self {
            command,
            query,
            registration,
        }
    }

    /// Serve every port from one implementation, such as the board service.
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: BoardCommand + BoardQuery + UserRegistration + 'static,
    {
        Self {
            command: service.clone(),
            query: service.clone(),
            registration: service,
        }
    }
}
