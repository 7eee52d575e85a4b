//! Observability: tracing init and the JSONL audit log.
//!
//! Uses `config::ObservabilityConfig` for AGROFUTURO_QUIET, LOG_LEVEL,
//! LOG_JSON and AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::{Mode, ObservabilityConfig, PortConfig};

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup.
/// With AGROFUTURO_QUIET=1 only WARN and above are logged.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "agrofuturo=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // Logs go to stderr; stdout is reserved for the messages users act on.
    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = ObservabilityConfig::from_env().audit_log.clone()?;
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl<T: Serialize>(path: &str, record: &T) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now_ts() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// One line of the audit log.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditRecord<'a> {
    InvocationStarted {
        ts: String,
        mode: Mode,
        ports: PortConfig,
        root: &'a str,
    },
    StepStarted {
        ts: String,
        step: &'a str,
        cmd: &'a str,
        args: &'a [String],
        cwd: &'a str,
    },
    StepCompleted {
        ts: String,
        step: &'a str,
        exit_code: Option<i32>,
        duration_ms: u64,
        success: bool,
    },
}

/// Audit: invocation_started (after config resolution)
pub fn audit_invocation_started(mode: Mode, ports: PortConfig, root: &Path) {
    if let Some(path) = get_audit_path() {
        let root = root.to_string_lossy();
        append_jsonl(
            &path,
            &AuditRecord::InvocationStarted {
                ts: now_ts(),
                mode,
                ports,
                root: &root,
            },
        );
    }
}

/// Audit: step_started (right before spawn)
pub fn audit_step_started(step: &str, cmd: &str, args: &[String], cwd: &str) {
    if let Some(path) = get_audit_path() {
        append_jsonl(
            &path,
            &AuditRecord::StepStarted {
                ts: now_ts(),
                step,
                cmd,
                args,
                cwd,
            },
        );
    }
}

/// Audit: step_completed
pub fn audit_step_completed(step: &str, exit_code: Option<i32>, duration_ms: u64) {
    if let Some(path) = get_audit_path() {
        append_jsonl(
            &path,
            &AuditRecord::StepCompleted {
                ts: now_ts(),
                step,
                exit_code,
                duration_ms,
                success: exit_code == Some(0),
            },
        );
    }
}
