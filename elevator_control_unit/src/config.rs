//! Configuration loading for the control unit.
//!
//! Wraps [`ElevatorConfig`] with the path it came from, so backends can read
//! their own tables from the same file. Without a file every table takes its
//! defaults.

use std::path::{Path, PathBuf};

use elevator_common::config::ConfigError;
use elevator_common::elevator::config::ElevatorConfig;
use elevator_common::hal::DriverContext;
use tracing::{info, warn};

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Validated configuration, ready for runtime use.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub elevator: ElevatorConfig,
    /// File the configuration was read from, `None` for built-in defaults.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Startup context handed to the actuator backend factory.
    pub fn driver_context(&self) -> DriverContext {
        DriverContext {
            actuators: self.elevator.actuators,
            config_path: self.source.clone(),
        }
    }

    /// Effective configuration rendered as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(&self.elevator).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the configuration.
///
/// `None` yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let loaded = match path {
        Some(path) => LoadedConfig {
            elevator: ElevatorConfig::load_validated(path)?,
            source: Some(path.to_path_buf()),
        },
        None => LoadedConfig {
            elevator: ElevatorConfig::default(),
            source: None,
        },
    };
    check_setpoint_order(&loaded.elevator);
    info!(
        source = %loaded.source.as_deref().map_or("<defaults>".into(), |p| p.display().to_string()),
        period_ms = loaded.elevator.cycle.period_ms,
        "configuration loaded"
    );
    Ok(loaded)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    let elevator = ElevatorConfig::from_toml(content)?;
    check_setpoint_order(&elevator);
    Ok(LoadedConfig {
        elevator,
        source: None,
    })
}

/// Warn when the named heights are not ordered bottom ≤ mid ≤ top.
fn check_setpoint_order(config: &ElevatorConfig) -> bool {
    let s = &config.setpoints;
    let ordered = s.bottom <= s.mid_cube.min(s.mid_cone) && s.mid_cube.max(s.mid_cone) <= s.top;
    if !ordered {
        warn!(
            bottom = s.bottom,
            mid_cube = s.mid_cube,
            mid_cone = s.mid_cone,
            top = s.top,
            "setpoints are not ordered bottom <= mid <= top"
        );
    }
    ordered
}

// ─── Tests ──────────────────────────────────────────────────────────
