//! HTTP API handlers for songscout

pub mod health;
pub mod recognize;
pub mod recommend;

pub use health::health_routes;
pub use recognize::recognize_routes;
pub use recommend::recommend_routes;
