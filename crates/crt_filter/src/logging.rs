//! Where the filter's diagnostics go.
//!
//! The library itself only talks to the [`log`] facade. Hosts that already install a logger
//! don't need any of this.

use std::{path::Path, sync::Once};

static INIT: Once = Once::new();

/// Install a process-wide logger for hosts that don't have one.
///
/// * With a `log_path` the log is appended to that file.
/// * Without one it goes to the platform sink: logcat on Android, stderr elsewhere.
///
/// The level can be changed with `RUST_LOG` and defaults to `info`.
/// Only the first call does anything; later ones leave the installed logger and its file alone.
pub fn init(log_path: Option<&Path>) {
    INIT.call_once(|| install(log_path));
}

fn install(log_path: Option<&Path>) {
    let Some(path) = log_path else {
        init_platform_sink();
        return;
    };

    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    {
        Ok(file) => {
            let installed = builder()
                .target(env_logger::Target::Pipe(Box::new(file)))
                .try_init()
                .is_ok();
            if installed {
                log::debug!("Logging to {}", path.display());
            }
        }
        Err(err) => {
            init_platform_sink();
            log::warn!("Failed to open log file {}: {err}", path.display());
        }
    }
}

fn builder() -> env_logger::Builder {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
}

#[cfg(target_os = "android")]
fn init_platform_sink() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag("crtfilter"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_platform_sink() {
    builder().try_init().ok();
}
