//! Environment variable key constants.
//!
//! The two port variables keep their conventional unprefixed names so the
//! launcher behaves like any other PaaS-style process; everything else is
//! namespaced under `AGROFUTURO_*`.

/// Ports
pub mod ports {
    /// Backend bind port
    pub const PORT: &str = "PORT";
    /// Frontend bind port
    pub const FRONTEND_PORT: &str = "FRONTEND_PORT";
}

/// Project layout
pub mod paths {
    /// Project root override (skips discovery)
    pub const AGROFUTURO_ROOT: &str = "AGROFUTURO_ROOT";

    /// venv directory, relative to the project root unless absolute
    pub const AGROFUTURO_VENV_DIR: &str = "AGROFUTURO_VENV_DIR";

    /// Seed interpreter used to create the venv
    pub const AGROFUTURO_PYTHON: &str = "AGROFUTURO_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["PYTHON"];
}

/// Observability and logging
pub mod observability {
    pub const AGROFUTURO_QUIET: &str = "AGROFUTURO_QUIET";
    pub const AGROFUTURO_LOG_LEVEL: &str = "AGROFUTURO_LOG_LEVEL";
    pub const AGROFUTURO_LOG_JSON: &str = "AGROFUTURO_LOG_JSON";
    pub const AGROFUTURO_AUDIT_LOG: &str = "AGROFUTURO_AUDIT_LOG";
}
