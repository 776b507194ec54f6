//! Pheromone arithmetic: evaporation, reinforcement and the hello-diffusion
//! bootstrap formula, grounded in `anthocnet-rtable.cc`'s `EvaporatePheromone`,
//! `IncressPheromone` and `Bootstrap`.

/// One neighbor's pheromone value toward one destination. `virtual_pheromone`
/// is populated only by hello-diffusion (never by a real backward ant) and
/// is used as a tie-breaker / bootstrap estimate, never as ground truth.
#[derive(Debug, Clone, Copy, Default)]
pub struct PheromoneEntry {
    pub pheromone: f64,
    pub virtual_pheromone: f64,
    /// EMA of hop count to the destination via this neighbor, used to scale
    /// route-discovery cost independent of absolute pheromone magnitude.
    pub avr_hops: f64,
    pub has_real: bool,
}

impl PheromoneEntry {
    pub fn new() -> Self {
        PheromoneEntry::default()
    }

    /// The value route selection should weigh: real pheromone if this
    /// neighbor has ever carried a backward ant, otherwise the diffusion
    /// bootstrap estimate.
    pub fn effective(&self) -> f64 {
        if self.has_real {
            self.pheromone
        } else {
            self.virtual_pheromone
        }
    }

    /// `ph <- ph - (1 - alpha) * ph`, applied to every neighbor not being
    /// reinforced in a routing-table update pass.
    pub fn evaporate(&mut self, alpha: f64) {
        self.pheromone -= (1.0 - alpha) * self.pheromone;
    }

    /// `ph <- gamma * ph + (1 - gamma) * reinforcement`, applied to the
    /// neighbor a backward ant arrived through. The first real sample is
    /// taken verbatim rather than blended against a stale zero.
    pub fn reinforce(&mut self, reinforcement: f64, gamma: f64) {
        if !self.has_real {
            self.pheromone = reinforcement;
            self.has_real = true;
        } else {
            self.pheromone = gamma * self.pheromone + (1.0 - gamma) * reinforcement;
        }
    }

    /// `avr_hops <- alpha_pheromone * avr_hops + (1 - alpha_pheromone) * hops`,
    /// with first-sample initialization.
    pub fn update_avr_hops(&mut self, hops: f64, alpha_pheromone: f64) {
        if self.avr_hops == 0.0 {
            self.avr_hops = hops;
        } else {
            self.avr_hops = alpha_pheromone * self.avr_hops + (1.0 - alpha_pheromone) * hops;
        }
    }

    /// Folds an advertised pheromone `ph` into the virtual pheromone via
    /// `1 / (1/t_id + ph)`, where `t_id` is the local one-hop cost estimate
    /// to the advertising neighbor -- `Bootstrap()` in the original:
    /// convert pheromone into an implicit delay, add one hop, invert. This
    /// overwrites rather than blends; a hello's diffusion entries are a
    /// fresh snapshot each time, not an accumulating sample.
    pub fn bootstrap_virtual(&mut self, ph: f64, t_id: f64) {
        if t_id <= 0.0 || ph < 0.0 {
            return;
        }
        self.virtual_pheromone = 1.0 / (1.0 / t_id + ph);
    }
}
