//! Playlist orchestration on top of `tunehost-db`.
//!
//! [`PlaylistService`] validates input, reconciles membership and applies
//! the resulting diff inside one locked transaction. [`TrackService`]
//! covers validated track CRUD.

pub mod config;
pub mod error;
pub mod playlist_service;
pub mod telemetry;
pub mod track_service;

pub use config::{AppConfig, ConfigError, ServiceConfig};
pub use error::{ServiceError, ServiceResult};
pub use playlist_service::{PlaylistService, PlaylistUpdate};
pub use track_service::TrackService;
