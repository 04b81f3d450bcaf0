pub mod eligibility;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod token;

pub use error::SosError;
pub use models::{DocumentationBundle, RiskLevel, SosAssessment, SosStatus, SosToken};
pub use router::sos_routes;
pub use services::{SosService, SosWebhook};
