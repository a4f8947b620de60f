use mindweave_core::ViewerConfig;

/// Tunables for the force-directed organize run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    pub initial_temperature: f64,
    /// Per-frame temperature multiplier, strictly inside `(0, 1)`.
    pub cooling_rate: f64,
    pub min_temperature: f64,
    pub gravity: f64,
    pub repulsion: f64,
    pub attraction: f64,
    pub ideal_edge_length: f64,
    pub damping: f64,
    pub time_step: f64,
    /// Pins the placement PRNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            initial_temperature: 40.0,
            cooling_rate: 0.97,
            min_temperature: 0.5,
            gravity: 0.02,
            repulsion: 120_000.0,
            attraction: 0.05,
            ideal_edge_length: 9.0 * 16.0,
            damping: 0.85,
            time_step: 1.0,
            seed: None,
        }
    }
}

impl LayoutSettings {
    /// Reads `layout.*` keys; out-of-range values keep their defaults.
    pub fn from_config(config: &ViewerConfig) -> Self {
        let d = Self::default();
        let positive = |key: &str, fallback: f64| config.get_positive_f64(key).unwrap_or(fallback);
        let non_negative = |key: &str, fallback: f64| {
            config
                .get_f64(key)
                .filter(|v| *v >= 0.0)
                .unwrap_or(fallback)
        };

        let initial_temperature = positive("layout.initialTemperature", d.initial_temperature);
        let mut min_temperature = positive("layout.minTemperature", d.min_temperature);
        if min_temperature >= initial_temperature {
            tracing::warn!(
                min_temperature,
                initial_temperature,
                "layout.minTemperature must be below the initial temperature; using defaults"
            );
            min_temperature = d.min_temperature.min(initial_temperature / 2.0);
        }

        Self {
            initial_temperature,
            cooling_rate: config
                .get_f64("layout.coolingRate")
                .filter(|v| *v > 0.0 && *v < 1.0)
                .unwrap_or(d.cooling_rate),
            min_temperature,
            gravity: non_negative("layout.gravity", d.gravity),
            repulsion: non_negative("layout.repulsion", d.repulsion),
            attraction: non_negative("layout.attraction", d.attraction),
            ideal_edge_length: positive("layout.idealEdgeLength", 9.0 * config.font_size()),
            damping: config
                .get_f64("layout.damping")
                .filter(|v| (0.0..=1.0).contains(v))
                .unwrap_or(d.damping),
            time_step: positive("layout.timeStep", d.time_step),
            seed: config.get_u64("layout.seed"),
        }
    }

    /// Upper bound on the frames an un-boosted run takes to converge.
    pub fn max_frames(&self) -> usize {
        let ratio = self.min_temperature / self.initial_temperature;
        if !(ratio > 0.0 && ratio < 1.0) {
            return 1;
        }
        let steps = (ratio.ln() / self.cooling_rate.ln()).ceil();
        if steps.is_finite() && steps >= 0.0 {
            steps as usize + 1
        } else {
            1
        }
    }
}
