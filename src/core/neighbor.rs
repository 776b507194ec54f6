//! Per-neighbor bookkeeping (`NeighborInfo` in the original rtable).

use crate::address::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct NeighborInfo {
    pub last_active: Instant,
    /// Interface this neighbor was last heard on.
    pub iface: u32,
    /// EMA of the per-send delay to this neighbor, used as the data-path
    /// cost when `snr_cost_metric` is off.
    pub avr_t_send: f64,
    /// Most recent SNR sample from `ProcessMonitorSnifferRx`, used as the
    /// cost when `snr_cost_metric` is on.
    pub last_snr: Option<f64>,
}

impl NeighborInfo {
    pub fn new(now: Instant, iface: u32) -> Self {
        NeighborInfo {
            last_active: now,
            iface,
            avr_t_send: 0.0,
            last_snr: None,
        }
    }

    pub fn touch(&mut self, now: Instant, iface: u32) {
        self.last_active = now;
        self.iface = iface;
    }

    pub fn is_expired(&self, now: Instant, nb_expire: Duration) -> bool {
        now.saturating_sub(self.last_active) >= nb_expire
    }

    /// Updates the send-delay EMA the way `ProcessAck` does:
    /// `avr = eta * avr + (1 - eta) * sample`, with the first sample taken
    /// verbatim.
    pub fn record_send_delay(&mut self, sample_ns: f64, eta_value: f64) {
        if self.avr_t_send == 0.0 {
            self.avr_t_send = sample_ns;
        } else {
            self.avr_t_send = eta_value * self.avr_t_send + (1.0 - eta_value) * sample_ns;
        }
    }

    /// Cost used when selecting routes via SNR rather than send-delay.
    pub fn snr_cost(&self, snr_threshold: f64, bad_snr_cost: f64) -> f64 {
        match self.last_snr {
            Some(snr) if snr >= snr_threshold => 1.0 / snr.max(1e-9),
            Some(_) => bad_snr_cost,
            None => bad_snr_cost,
        }
    }
}
