//! AgroFuturo configuration layer
//!
//! All environment variable reads are centralised here; the rest of the
//! workspace receives typed structs instead of calling `std::env::var`.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading
//! - `schema`: `LaunchConfig`, `ProjectLayout`, `PortConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, load_dotenv_from_dir};
pub use schema::{
    DatasetRef, LaunchConfig, Mode, ObservabilityConfig, PortConfig, ProjectLayout,
    DEFAULT_BACKEND_PORT, DEFAULT_FRONTEND_PORT,
};
