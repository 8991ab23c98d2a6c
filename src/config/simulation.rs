//! Simulation driver configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which scheduling policy the auto-dispatch loop runs each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Per-office round-robin (one move per office per tick).
    Local,
    /// Global priority dispatch (at most one move per tick).
    Global,
}

/// Driver configuration: tick pacing, journal location, policy selection.
///
/// Pacing is a caller concern; the routing core itself has no notion of
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Delay between auto-dispatch ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Journal file path; `None` disables the file journal.
    pub journal_path: Option<PathBuf>,
    /// Policy the auto-dispatch loop runs.
    pub policy: DispatchPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 200,
            journal_path: Some(PathBuf::from("system_log.txt")),
            policy: DispatchPolicy::Global,
        }
    }
}

impl SimulationConfig {
    /// Load configuration from the environment, falling back to defaults.
    ///
    /// Reads a `.env` file if present (via dotenvy), then
    /// `MAILSIM_TICK_MS`, `MAILSIM_JOURNAL`, and `MAILSIM_POLICY`
    /// (`local` | `global`). Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut cfg = Self::default();
        if let Ok(tick) = std::env::var("MAILSIM_TICK_MS") {
            if let Ok(ms) = tick.parse() {
                cfg.tick_interval_ms = ms;
            }
        }
        if let Ok(path) = std::env::var("MAILSIM_JOURNAL") {
            cfg.journal_path = if path.is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Ok(policy) = std::env::var("MAILSIM_POLICY") {
            match policy.as_str() {
                "local" => cfg.policy = DispatchPolicy::Local,
                "global" => cfg.policy = DispatchPolicy::Global,
                _ => {}
            }
        }
        cfg
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be greater than 0".into());
        }
        if let Some(path) = &self.journal_path {
            if path.as_os_str().is_empty() {
                return Err("journal_path must not be empty".into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = SimulationConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.tick_interval_ms, 200);
        assert_eq!(cfg.policy, DispatchPolicy::Global);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let cfg = SimulationConfig {
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let cfg = SimulationConfig {
            tick_interval_ms: 50,
            journal_path: None,
            policy: DispatchPolicy::Local,
        };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"local\""));
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.tick_interval_ms, 50);
        assert_eq!(back.policy, DispatchPolicy::Local);
        assert!(back.journal_path.is_none());
    }
}
