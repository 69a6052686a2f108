pub mod anime;
pub mod cache;
pub mod handlers;
pub mod middleware;
pub mod reviews;
pub mod routes;
pub mod users;
pub mod watchlist;

pub use routes::create_router;
