pub mod handlers;
pub mod routes;

pub use routes::{create_counter_router, VISIT_PATH};
