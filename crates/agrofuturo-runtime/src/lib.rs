//! Environment bootstrap and process orchestration for AgroFuturo.
//!
//! Every child process goes through [`step::StepCommand`], so the mapping
//! from a child's exit status to [`BootstrapError`] is the same for venv
//! creation, pip, byte-compilation, the sanity probe and the servers.

pub mod env;
pub mod error;
pub mod launcher;
pub mod log;
pub mod sanity;
pub mod step;

pub use env::provisioner::ensure_environment;
pub use error::BootstrapError;
pub use launcher::{launch, LaunchTarget};
pub use sanity::{run_sanity, SanityOutcome, SanityReport};
pub use step::{Step, StepCommand};
