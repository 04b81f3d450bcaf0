pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::AuditError;
pub use models::{AuditAction, AuditEntry, NewAuditEntry};
pub use router::audit_routes;
pub use services::AuditService;
