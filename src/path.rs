// A single branch: grows by a damped random walk, forks, then sways

use glam::Vec2;

use crate::canvas::Canvas;
use crate::config::ForestConfig;
use crate::random::RandomSource;
use crate::wind::Wind;

/// One drawn piece of a branch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    pub diameter: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    Trunk,
    Fork,
}

/// Per-frame view of the forest that a path needs to update itself.
#[derive(Clone, Copy, Debug)]
pub struct Environment<'a> {
    pub config: &'a ForestConfig,
    pub wind: Wind,
}

impl Environment<'_> {
    /// Growth only happens inside the canvas expanded by the bounds margin.
    pub fn in_bounds(&self, p: Vec2) -> bool {
        let m = self.config.bounds_margin;
        p.x > -m
            && p.x < self.config.canvas_width + m
            && p.y > -m
            && p.y < self.config.canvas_height + m
    }
}

/// Result of one [`Path::update`].
#[derive(Debug)]
pub enum Growth {
    /// Grew one segment, possibly spawning a fork the caller must keep.
    Grew { fork: Option<Path> },
    /// Became too thin this frame and froze its geometry.
    Finished,
    /// Already frozen; segments were re-swayed.
    Swayed,
    /// Head is outside the growth bounds; nothing happened.
    OutOfBounds,
}

#[derive(Clone, Debug)]
pub struct Path {
    pub kind: PathKind,
    pub origin: Vec2,
    pub position: Vec2,
    pub previous_position: Vec2,
    pub velocity: Vec2,
    pub diameter: f32,
    pub finished: bool,
    // Display geometry, displaced by sway once finished
    pub segments: Vec<Segment>,
    // Geometry as grown; sway is always computed from this
    pub base_segments: Vec<Segment>,
    pub wind_response: f32,
    // Reserved tuning hook, not used by sway yet
    pub flexibility: f32,
}

impl Path {
    /// A trunk rooted on the bottom edge at `x`, heading straight up.
    pub fn new_trunk<R: RandomSource + ?Sized>(x: f32, config: &ForestConfig, rng: &mut R) -> Self {
        let position = Vec2::new(x, config.canvas_height);
        Self {
            kind: PathKind::Trunk,
            origin: position,
            position,
            previous_position: position,
            velocity: Vec2::new(0.0, -config.trunk_speed),
            diameter: config.trunk_diameter,
            finished: false,
            segments: Vec::new(),
            base_segments: Vec::new(),
            wind_response: rng.uniform(config.wind_response_min, config.wind_response_max),
            flexibility: rng.uniform(config.flexibility_min, config.flexibility_max),
        }
    }

    /// A fork continuing from `parent`'s head. The parent thins to the
    /// fork's diameter.
    pub fn new_fork<R: RandomSource + ?Sized>(
        parent: &mut Path,
        config: &ForestConfig,
        rng: &mut R,
    ) -> Self {
        let diameter = parent.diameter * config.shrink_factor;
        parent.diameter = diameter;
        Self {
            kind: PathKind::Fork,
            origin: parent.position,
            position: parent.position,
            previous_position: parent.previous_position,
            velocity: parent.velocity,
            diameter,
            finished: parent.finished,
            segments: Vec::new(),
            base_segments: Vec::new(),
            wind_response: rng.uniform(config.wind_response_min, config.wind_response_max),
            flexibility: rng.uniform(config.flexibility_min, config.flexibility_max),
        }
    }

    pub fn is_trunk(&self) -> bool {
        self.kind == PathKind::Trunk
    }

    /// Left the growth bounds before finishing; it will never grow again.
    pub fn is_stalled(&self, env: &Environment) -> bool {
        !self.finished && !env.in_bounds(self.position)
    }

    /// Advance by one frame: grow a step, freeze, or sway if frozen.
    pub fn update<R: RandomSource + ?Sized>(&mut self, env: &Environment, rng: &mut R) -> Growth {
        if self.finished {
            self.apply_sway(env);
            return Growth::Swayed;
        }
        if !env.in_bounds(self.position) {
            return Growth::OutOfBounds;
        }

        self.previous_position = self.position;

        if self.diameter <= env.config.min_diameter {
            self.finished = true;
            log::debug!(
                "path from ({:.1}, {:.1}) finished with {} segments",
                self.origin.x,
                self.origin.y,
                self.segments.len()
            );
            return Growth::Finished;
        }

        let fork = self.grow(env.config, rng);
        Growth::Grew { fork }
    }

    fn grow<R: RandomSource + ?Sized>(&mut self, config: &ForestConfig, rng: &mut R) -> Option<Path> {
        // Damped random walk with an upward pull
        let bump = Vec2::new(rng.uniform(-1.0, 1.0), rng.uniform(-1.0, 1.0)) * config.bump_scale;
        self.velocity = self.velocity.normalize_or_zero() * config.damping + bump;
        self.velocity += Vec2::new(0.0, -config.upward_bias);
        self.velocity *= rng.uniform(config.step_min, config.step_max);
        self.position += self.velocity;

        let segment = Segment {
            start: self.previous_position,
            end: self.position,
            diameter: self.diameter,
        };
        self.segments.push(segment);
        self.base_segments.push(segment);

        if self.position.y < config.fork_line() && rng.uniform(0.0, 1.0) < config.fork_probability {
            let fork = Path::new_fork(self, config, rng);
            log::trace!(
                "fork at ({:.1}, {:.1}), diameter {:.3}",
                fork.origin.x,
                fork.origin.y,
                fork.diameter
            );
            return Some(fork);
        }
        None
    }

    /// Recompute display x-coordinates from the base geometry.
    pub fn apply_sway(&mut self, env: &Environment) {
        let height = env.config.canvas_height;
        for (i, (seg, base)) in self
            .segments
            .iter_mut()
            .zip(self.base_segments.iter())
            .enumerate()
        {
            let height_factor = 1.0 - base.start.y / height;
            let offset = env.wind.sway_offset(i, height_factor, self.wind_response);
            seg.start.x = base.start.x + offset;
            seg.end.x = base.end.x + offset;
        }
    }

    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for seg in &self.segments {
            canvas.draw_line(seg.start, seg.end, seg.diameter);
        }
    }
}
