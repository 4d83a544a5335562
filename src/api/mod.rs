pub mod dictionary_handlers;
pub mod handlers;
pub mod person_handlers;
pub mod routes;

pub use handlers::*;
pub use routes::*;
