pub mod postgrest;
pub mod state;

pub use postgrest::PostgrestClient;
pub use state::AppState;
