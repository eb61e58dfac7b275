// Wind state - drives the sway of finished branches
// A cheap sine approximation, not a fluid model

use crate::config::ForestConfig;

/// Global wind clock and intensity shared by every path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wind {
    // Monotonic phase, advanced once per frame
    pub clock: f32,
    pub intensity: f32,
    pub step: f32,
    pub min_intensity: f32,
    pub max_intensity: f32,
    pub increment: f32,
    // Phase offset between neighbouring segments
    pub stagger: f32,
}

impl Wind {
    pub fn new(config: &ForestConfig) -> Self {
        Self {
            clock: 0.0,
            intensity: config
                .wind_intensity
                .clamp(config.wind_min, config.wind_max),
            step: config.wind_step,
            min_intensity: config.wind_min,
            max_intensity: config.wind_max,
            increment: config.wind_increment,
            stagger: config.phase_stagger,
        }
    }

    /// Advance the wind clock by one frame.
    pub fn advance(&mut self) {
        self.clock += self.step;
    }

    pub fn increase(&mut self) {
        self.set_intensity(self.intensity + self.increment);
    }

    pub fn decrease(&mut self) {
        self.set_intensity(self.intensity - self.increment);
    }

    pub fn set_intensity(&mut self, value: f32) {
        self.intensity = value.clamp(self.min_intensity, self.max_intensity);
    }

    /// Horizontal displacement of segment `index`.
    ///
    /// `height_factor` is 0 at the canvas bottom and 1 at the top, so tips
    /// move more than the base. `response` is the per-path multiplier.
    pub fn sway_offset(&self, index: usize, height_factor: f32, response: f32) -> f32 {
        (self.clock + index as f32 * self.stagger).sin() * self.intensity * height_factor * response
    }
}
