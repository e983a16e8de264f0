use std::collections::HashSet;

/// Keys the controllers react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    W,
    A,
    S,
    D,
    Space,
}

impl Action {
    /// Maps a DOM `keyCode` to an action.
    pub fn from_key_code(code: u32) -> Option<Self> {
        match code {
            37 => Some(Action::Left),
            38 => Some(Action::Up),
            39 => Some(Action::Right),
            40 => Some(Action::Down),
            87 => Some(Action::W),
            65 => Some(Action::A),
            83 => Some(Action::S),
            68 => Some(Action::D),
            32 => Some(Action::Space),
            _ => None,
        }
    }
}

/// Tracks which actions are held and which changed this frame.
///
/// The host forwards key events with [`key_down`](Self::key_down) /
/// [`key_up`](Self::key_up) and calls [`begin_frame`](Self::begin_frame)
/// once per frame.
#[derive(Debug, Default)]
pub struct Keyboard {
    held: HashSet<Action>,
    pressed: HashSet<Action>,
    released: HashSet<Action>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Handles a key-down event. Unmapped codes are ignored.
    pub fn key_down(&mut self, code: u32) {
        if let Some(action) = Action::from_key_code(code) {
            self.press(action);
        }
    }

    pub fn key_up(&mut self, code: u32) {
        if let Some(action) = Action::from_key_code(code) {
            self.release(action);
        }
    }

    pub fn press(&mut self, action: Action) {
        if self.held.insert(action) {
            self.pressed.insert(action);
        }
    }

    pub fn release(&mut self, action: Action) {
        if self.held.remove(&action) {
            self.released.insert(action);
        }
    }

    /// Returns true while the action is held down.
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Returns true if the action went down this frame.
    pub fn was_pressed(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }

    /// Returns true if the action was released this frame.
    pub fn was_released(&self, action: Action) -> bool {
        self.released.contains(&action)
    }

    /// `1.0` if only `positive` is held, `-1.0` if only `negative`, else `0.0`.
    pub fn axis(&self, negative: Action, positive: Action) -> f32 {
        let mut value = 0.0;
        if self.is_held(positive) {
            value += 1.0;
        }
        if self.is_held(negative) {
            value -= 1.0;
        }
        value
    }
}
