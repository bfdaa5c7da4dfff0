//! Application services: the batch request handler and response projection.

pub mod play_service;
pub mod projection;

pub use play_service::PlayService;
