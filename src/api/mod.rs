pub mod handlers;
pub mod routes;
pub mod security;

pub use handlers::*;
pub use routes::*;
