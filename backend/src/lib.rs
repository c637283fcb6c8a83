//! Question-and-answer board backend.
//!
//! Hexagonal layout: `domain` holds entities, policy, and services behind
//! ports; `inbound` adapts HTTP onto the driving ports; `outbound` supplies
//! the in-memory persistence and search adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
