use macroquad::prelude::*;

use crate::forest::Forest;
use crate::random::RandomSource;

/// What the frame loop should do after input handling.
#[derive(Default)]
pub struct FrameRequests {
    pub screenshot: bool,
    pub toggle_hud: bool,
}

pub fn handle_controls<R: RandomSource + ?Sized>(forest: &mut Forest, rng: &mut R) -> FrameRequests {
    let mut requests = FrameRequests::default();

    if is_key_pressed(KeyCode::Space) {
        forest.reset_simulation(rng);
    }

    // '+' shares a key with '=' on most layouts
    if is_key_pressed(KeyCode::Equal) || is_key_pressed(KeyCode::KpAdd) {
        forest.increase_wind();
    }
    if is_key_pressed(KeyCode::Minus) || is_key_pressed(KeyCode::KpSubtract) {
        forest.decrease_wind();
    }

    if is_key_pressed(KeyCode::P) {
        requests.screenshot = true;
    }
    if is_key_pressed(KeyCode::H) {
        requests.toggle_hud = true;
    }

    requests
}
