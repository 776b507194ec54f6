//! Protocol configuration, covering every option named in spec §6.
//!
//! Mirrors the teacher's `NodeState`/`Args` split: a plain `serde`-derived
//! struct with documented defaults, loadable from a JSON file and then
//! overridden by CLI flags, validated once at startup the way the teacher
//! validates nothing but `clap` validates flag shapes -- here `validate()`
//! plays that role for the floating point ranges the derive can't express.

use crate::address::Duration;
use crate::error::{Result, RoutingError};
use serde::{Deserialize, Serialize};

/// UDP port carrying all AntHocNet control traffic (`ANTHOCNET_PORT` in the
/// original ns-3 module).
pub const ANTHOCNET_PORT: u16 = 5555;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hello_interval: Duration,
    pub pr_ant_interval: Duration,
    pub nb_expire: Duration,
    pub dst_expire: Duration,
    pub session_expire: Duration,
    pub dcache_expire: Duration,
    pub no_broadcast: Duration,

    /// Per-destination cap on buffered datagrams awaiting route discovery;
    /// overflow evicts the oldest entry for that destination.
    pub dcache_capacity: usize,

    /// Evaporation factor, applied to every neighbor not being reinforced.
    pub alpha: f64,
    /// Reinforcement smoothing factor for the pheromone EMA.
    pub gamma: f64,
    /// Smoothing factor for the hop-count EMA.
    pub alpha_pheromone: f64,
    /// Smoothing factor for the per-send cost EMA (`avr_T_send`).
    pub eta_value: f64,

    /// Per-hop cost constant used in the backward-ant cost function.
    pub t_hop: f64,
    /// Pheromone values at or below this are treated as absent/unusable.
    pub min_pheromone: f64,

    /// Selection exponent for conservative (data-path) route selection.
    pub cons_beta: f64,
    /// Selection exponent for progressive (discovery) route selection.
    pub prog_beta: f64,

    pub initial_ttl: u8,
    pub reactive_bcast_count: u8,
    pub proactive_bcast_count: u8,

    pub snr_cost_metric: bool,
    pub snr_threshold: f64,
    pub bad_snr_cost: f64,

    pub fuzzy_mode: bool,

    pub blackhole: bool,
    pub blackhole_amount: f64,

    /// Number of diffusion entries piggybacked on each hello message.
    pub hello_diffusion_count: usize,

    pub ant_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hello_interval: Duration::from_secs(1),
            pr_ant_interval: Duration::from_secs(5),
            nb_expire: Duration::from_secs(3),
            dst_expire: Duration::from_secs(30),
            session_expire: Duration::from_secs(10),
            dcache_expire: Duration::from_secs(5),
            no_broadcast: Duration::from_millis(500),
            dcache_capacity: 64,

            alpha: 0.9,
            gamma: 0.7,
            alpha_pheromone: 0.7,
            eta_value: 0.7,

            t_hop: 20.0,
            min_pheromone: 0.001,

            cons_beta: 1.0,
            prog_beta: 2.0,

            initial_ttl: 32,
            reactive_bcast_count: 2,
            proactive_bcast_count: 1,

            snr_cost_metric: false,
            snr_threshold: 10.0,
            bad_snr_cost: 4.0,

            fuzzy_mode: false,

            blackhole: false,
            blackhole_amount: 0.0,

            hello_diffusion_count: 10,

            ant_port: ANTHOCNET_PORT,
        }
    }
}

impl Config {
    pub fn from_json_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| RoutingError::Config(e.to_string()))
    }

    /// Validates the documented ranges. Called once at startup; `core`
    /// modules trust a `Config` that has passed this.
    pub fn validate(&self) -> Result<()> {
        let in_unit = |name: &str, v: f64| -> Result<()> {
            if v > 0.0 && v < 1.0 {
                Ok(())
            } else {
                Err(RoutingError::Config(format!(
                    "{name} must be in (0,1), got {v}"
                )))
            }
        };
        in_unit("alpha", self.alpha)?;
        in_unit("gamma", self.gamma)?;
        in_unit("alpha_pheromone", self.alpha_pheromone)?;
        in_unit("eta_value", self.eta_value)?;

        if self.min_pheromone < 0.0 {
            return Err(RoutingError::Config("min_pheromone must be >= 0".into()));
        }
        if self.cons_beta <= 0.0 || self.prog_beta <= 0.0 {
            return Err(RoutingError::Config("beta exponents must be > 0".into()));
        }
        if self.blackhole_amount < 0.0 || self.blackhole_amount > 1.0 {
            return Err(RoutingError::Config(
                "blackhole_amount must be in [0,1]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_alpha() {
        let mut c = Config::default();
        c.alpha = 1.5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn round_trips_through_json() {
        let c = Config::default();
        let s = serde_json::to_string(&c).unwrap();
        let back: Config = serde_json::from_str(&s).unwrap();
        assert_eq!(back.ant_port, c.ant_port);
    }
}
