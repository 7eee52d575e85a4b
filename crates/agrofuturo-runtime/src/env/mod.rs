//! Isolated Python environment: interpreter layout and provisioning.
//!
//! `resolver` is pure path arithmetic; `provisioner` creates the venv and
//! converges it on the dependency manifest.

pub mod provisioner;
pub mod resolver;

pub use resolver::{venv_python, PlatformFamily, Venv};
