use crate::canvas::Canvas;
use crate::config::ForestConfig;
use crate::path::{Environment, Growth, Path};
use crate::random::RandomSource;
use crate::wind::Wind;

/// Summary counters for the HUD and the HTTP API.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ForestStats {
    pub path_count: usize,
    pub trunk_count: usize,
    pub fork_count: usize,
    pub finished_count: usize,
    pub stalled_count: usize,
    pub segment_count: usize,
    pub growth_ticks: u64,
    pub frame_index: u64,
    pub wind_clock: f32,
    pub wind_intensity: f32,
    // No path can grow any further
    pub settled: bool,
}

// Forest - owns every path plus the global wind and counters
pub struct Forest {
    pub config: ForestConfig,
    pub paths: Vec<Path>,
    pub wind: Wind,
    // Growth steps taken by all paths since the last reset (diagnostic)
    pub growth_ticks: u64,
    pub frame_index: u64,
    pub paused: bool,
}

impl Forest {
    pub fn new<R: RandomSource + ?Sized>(config: ForestConfig, rng: &mut R) -> Self {
        let wind = Wind::new(&config);
        let mut forest = Self {
            config,
            paths: Vec::new(),
            wind,
            growth_ticks: 0,
            frame_index: 0,
            paused: false,
        };
        forest.reset_simulation(rng);
        forest
    }

    /// Discard every path and plant a fresh row of trunks along the bottom edge.
    ///
    /// Wind clock and intensity carry over.
    pub fn reset_simulation<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        let num = self.config.initial_branch_count;
        let width = self.config.canvas_width;
        let spacing = width / (num + 1) as f32;
        let jitter = self.config.anchor_jitter;

        self.paths = Vec::with_capacity(num);
        self.growth_ticks = 0;
        self.frame_index = 0;

        for i in 0..num {
            let base_x = spacing * (i + 1) as f32;
            let x = (base_x + rng.uniform(-jitter, jitter)).clamp(0.0, width);
            self.paths.push(Path::new_trunk(x, &self.config, rng));
        }
        log::info!("planted {} trunks across {} px", num, width);
    }

    /// One frame: advance the wind, then draw and update every path.
    ///
    /// Forks appended during the pass are visited later in the same pass.
    pub fn step<R, C>(&mut self, rng: &mut R, canvas: &mut C)
    where
        R: RandomSource + ?Sized,
        C: Canvas + ?Sized,
    {
        self.frame_index = self.frame_index.wrapping_add(1);
        self.wind.advance();

        let env = Environment {
            config: &self.config,
            wind: self.wind,
        };

        // Index loop: the length is re-read as forks are pushed
        let mut i = 0;
        while i < self.paths.len() {
            let path = &mut self.paths[i];
            path.draw(canvas);
            if let Growth::Grew { fork } = path.update(&env, rng) {
                self.growth_ticks += 1;
                if let Some(fork) = fork {
                    self.paths.push(fork);
                }
            }
            i += 1;
        }
    }

    pub fn increase_wind(&mut self) {
        self.wind.increase();
        log::info!("wind intensity {:.1}", self.wind.intensity);
    }

    pub fn decrease_wind(&mut self) {
        self.wind.decrease();
        log::info!("wind intensity {:.1}", self.wind.intensity);
    }

    pub fn set_wind_intensity(&mut self, value: f32) {
        self.wind.set_intensity(value);
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn environment(&self) -> Environment<'_> {
        Environment {
            config: &self.config,
            wind: self.wind,
        }
    }

    pub fn stats(&self) -> ForestStats {
        let env = self.environment();
        let mut stats = ForestStats {
            path_count: self.paths.len(),
            growth_ticks: self.growth_ticks,
            frame_index: self.frame_index,
            wind_clock: self.wind.clock,
            wind_intensity: self.wind.intensity,
            settled: self.is_settled(),
            ..ForestStats::default()
        };
        for p in &self.paths {
            if p.is_trunk() {
                stats.trunk_count += 1;
            } else {
                stats.fork_count += 1;
            }
            if p.finished {
                stats.finished_count += 1;
            } else if p.is_stalled(&env) {
                stats.stalled_count += 1;
            }
            stats.segment_count += p.segments.len();
        }
        stats
    }

    /// True once no path can grow any further.
    pub fn is_settled(&self) -> bool {
        let env = self.environment();
        self.paths.iter().all(|p| p.finished || p.is_stalled(&env))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{NullCanvas, RecordingCanvas};
    use crate::random::Midpoint;
    use ::rand::rngs::StdRng;
    use ::rand::SeedableRng;
    use pretty_assertions::assert_eq;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn reset_plants_evenly_spaced_trunks() {
        let mut rng = seeded(1);
        let forest = Forest::new(ForestConfig::default(), &mut rng);
        assert_eq!(forest.paths.len(), 25);
        let spacing = 465.0 / 26.0;
        for (i, p) in forest.paths.iter().enumerate() {
            assert!(p.is_trunk());
            assert_eq!(p.diameter, 5.0);
            assert!(!p.finished);
            assert_eq!(p.position.y, 584.0);
            let anchor = spacing * (i + 1) as f32;
            assert!((p.position.x - anchor).abs() <= 10.0 + 1e-3);
            assert!((0.0..=465.0).contains(&p.position.x));
        }
        assert_eq!(forest.growth_ticks, 0);
    }

    #[test]
    fn reset_replaces_everything() {
        let mut rng = seeded(2);
        let mut forest = Forest::new(ForestConfig::default(), &mut rng);
        for _ in 0..80 {
            forest.step(&mut rng, &mut NullCanvas);
        }
        assert!(forest.paths.len() > 25);
        assert!(forest.growth_ticks > 0);

        forest.reset_simulation(&mut rng);
        assert!(!forest.stats().settled);
        assert_eq!(forest.paths.len(), 25);
        assert!(forest.paths.iter().all(|p| p.is_trunk() && p.segments.is_empty()));
        assert_eq!(forest.growth_ticks, 0);
    }

    #[test]
    fn anchors_clamp_into_canvas() {
        let config = ForestConfig {
            canvas_width: 20.0,
            initial_branch_count: 1,
            anchor_jitter: 50.0,
            ..ForestConfig::default()
        };
        let mut rng = seeded(9);
        for _ in 0..50 {
            let forest = Forest::new(config.clone(), &mut rng);
            let x = forest.paths[0].position.x;
            assert!((0.0..=20.0).contains(&x), "{x} escaped the canvas");
        }
    }

    #[test]
    fn step_advances_wind_clock() {
        let mut forest = Forest::new(ForestConfig::default(), &mut Midpoint);
        forest.step(&mut Midpoint, &mut NullCanvas);
        forest.step(&mut Midpoint, &mut NullCanvas);
        assert!((forest.wind.clock - 0.16).abs() < 1e-6);
        assert_eq!(forest.frame_index, 2);
    }

    #[test]
    fn each_step_draws_before_growing() {
        let config = ForestConfig {
            initial_branch_count: 1,
            ..ForestConfig::default()
        };
        let mut forest = Forest::new(config, &mut Midpoint);

        let mut canvas = RecordingCanvas::default();
        forest.step(&mut Midpoint, &mut canvas);
        // nothing grown yet when the first draw happened
        assert!(canvas.lines.is_empty());
        assert_eq!(forest.paths[0].segments.len(), 1);

        let mut canvas = RecordingCanvas::default();
        forest.step(&mut Midpoint, &mut canvas);
        assert_eq!(canvas.lines.len(), 1);
        assert_eq!(forest.paths[0].segments.len(), 2);
    }

    #[test]
    fn forks_are_visited_in_the_same_pass() {
        // Every roll at the low end: forks whenever above the fork line
        struct Low;
        impl RandomSource for Low {
            fn uniform(&mut self, min: f32, _max: f32) -> f32 {
                min
            }
        }

        let config = ForestConfig {
            initial_branch_count: 1,
            ..ForestConfig::default()
        };
        let mut forest = Forest::new(config, &mut Low);
        forest.paths[0].position.y = 300.0;
        forest.step(&mut Low, &mut NullCanvas);

        // trunk forks, the fork grows and forks, and so on down to min_diameter
        assert!(forest.paths.len() > 2);
        let last = forest.paths.last().unwrap();
        assert!(last.diameter <= 0.2 || !last.segments.is_empty());
        for p in &forest.paths[1..forest.paths.len() - 1] {
            assert!(!p.segments.is_empty(), "fork skipped in the pass that created it");
        }
    }

    #[test]
    fn diameters_never_grow_and_finished_sticks() {
        let mut rng = seeded(42);
        let mut forest = Forest::new(ForestConfig::default(), &mut rng);
        let mut diameters: Vec<f32> = Vec::new();
        let mut finished: Vec<bool> = Vec::new();

        for _ in 0..400 {
            forest.step(&mut rng, &mut NullCanvas);
            for (i, p) in forest.paths.iter().enumerate() {
                if let Some(&d) = diameters.get(i) {
                    assert!(p.diameter <= d, "path {i} grew from {d} to {}", p.diameter);
                    diameters[i] = p.diameter;
                } else {
                    diameters.push(p.diameter);
                }
                if let Some(&f) = finished.get(i) {
                    assert!(!f || p.finished, "path {i} unfinished itself");
                    finished[i] = p.finished;
                } else {
                    finished.push(p.finished);
                }
                if p.finished {
                    assert!(p.diameter <= 0.2);
                    assert_eq!(p.segments.len(), p.base_segments.len());
                }
            }
        }
    }

    #[test]
    fn finished_paths_never_change_shape() {
        let mut rng = seeded(5);
        let mut forest = Forest::new(ForestConfig::default(), &mut rng);
        for _ in 0..200 {
            forest.step(&mut rng, &mut NullCanvas);
        }
        let frozen: Vec<(usize, usize)> = forest
            .paths
            .iter()
            .enumerate()
            .filter(|(_, p)| p.finished)
            .map(|(i, p)| (i, p.segments.len()))
            .collect();
        assert!(!frozen.is_empty());

        for _ in 0..50 {
            forest.step(&mut rng, &mut NullCanvas);
            for &(i, n) in &frozen {
                let p = &forest.paths[i];
                assert_eq!(p.segments.len(), n);
                assert_eq!(p.base_segments.len(), n);
                for (seg, base) in p.segments.iter().zip(&p.base_segments) {
                    assert_eq!(seg.start.y, base.start.y);
                    assert_eq!(seg.end.y, base.end.y);
                }
            }
        }
    }

    #[test]
    fn forks_only_originate_above_fork_line() {
        for seed in 0..5 {
            let mut rng = seeded(seed);
            let mut forest = Forest::new(ForestConfig::default(), &mut rng);
            for _ in 0..300 {
                forest.step(&mut rng, &mut NullCanvas);
            }
            let line = forest.config.fork_line();
            let stats = forest.stats();
            assert!(stats.fork_count > 0);
            for p in forest.paths.iter().filter(|p| !p.is_trunk()) {
                assert!(p.origin.y < line, "fork at y={} below {line}", p.origin.y);
            }
        }
    }

    #[test]
    fn midpoint_trunk_only_stops_at_the_edge() {
        let config = ForestConfig {
            initial_branch_count: 1,
            ..ForestConfig::default()
        };
        let mut forest = Forest::new(config, &mut Midpoint);
        let start_x = forest.paths[0].position.x;
        assert!((start_x - 232.5).abs() < 1e-3);

        let mut steps = 0;
        while !forest.is_settled() {
            forest.step(&mut Midpoint, &mut NullCanvas);
            steps += 1;
            assert!(steps < 1000, "trunk never stopped");
        }

        assert_eq!(forest.paths.len(), 1);
        let trunk = &forest.paths[0];
        assert_eq!(trunk.diameter, 5.0);
        assert!(trunk.segments.iter().all(|s| s.diameter == 5.0));
        assert!(!trunk.finished);
        assert!(trunk.position.y <= -10.0);
        assert!(trunk.is_stalled(&forest.environment()));

        // further frames change nothing
        let snapshot = trunk.segments.clone();
        forest.step(&mut Midpoint, &mut NullCanvas);
        assert_eq!(forest.paths[0].segments, snapshot);
        assert_eq!(forest.stats().stalled_count, 1);
    }

    #[test]
    fn growth_ticks_count_growth_steps_only() {
        let config = ForestConfig {
            initial_branch_count: 2,
            ..ForestConfig::default()
        };
        let mut forest = Forest::new(config, &mut Midpoint);
        for _ in 0..3 {
            forest.step(&mut Midpoint, &mut NullCanvas);
        }
        assert_eq!(forest.growth_ticks, 6);
        assert_eq!(forest.stats().segment_count, 6);
    }

    #[test]
    fn wind_controls_clamp() {
        let mut forest = Forest::new(ForestConfig::default(), &mut Midpoint);
        for _ in 0..20 {
            forest.increase_wind();
        }
        assert_eq!(forest.wind.intensity, 5.0);
        for _ in 0..20 {
            forest.decrease_wind();
        }
        assert_eq!(forest.wind.intensity, 0.5);
    }

    #[test]
    fn eventually_settles_with_finished_paths() {
        let mut rng = seeded(77);
        let mut forest = Forest::new(ForestConfig::default(), &mut rng);
        let mut steps = 0;
        while !forest.is_settled() && steps < 5000 {
            forest.step(&mut rng, &mut NullCanvas);
            steps += 1;
        }
        assert!(forest.is_settled());
        let stats = forest.stats();
        assert_eq!(stats.finished_count + stats.stalled_count, stats.path_count);
        assert_eq!(stats.trunk_count, 25);
        assert!(stats.settled);
    }
}
