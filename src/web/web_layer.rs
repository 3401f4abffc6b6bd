// The web module is the HTTP adapter: axum routes over the core services.

#[path = "error.rs"]
pub mod error;

#[path = "state.rs"]
pub mod state;

#[path = "routes/mod.rs"]
pub mod routes;

pub use routes::router;
pub use state::AppState;
