pub mod sos;
pub mod webhook;

pub use sos::SosService;
pub use webhook::SosWebhook;
