pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod satellites;
pub mod sources;
pub mod tle;

pub use response::ApiResponse;
pub use routes::create_router;
