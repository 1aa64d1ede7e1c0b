//! Keyboard input drain.
//!
//! Everything in this game is a discrete press (menu choice, cursor
//! move, card toggle), so there is no held-key tracking: each frame we
//! drain pending terminal events and keep the presses.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, poll};

pub struct InputState {
    presses: Vec<KeyCode>,
    ctrl_c: bool,
    resized: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            presses: Vec::with_capacity(8),
            ctrl_c: false,
            resized: false,
        }
    }

    /// Drain all pending terminal events. Call once per frame.
    pub fn drain_events(&mut self) {
        self.presses.clear();
        self.ctrl_c = false;
        self.resized = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(Event::Key(key)) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        self.ctrl_c = true;
                        continue;
                    }
                    self.presses.push(key.code);
                }
                Ok(Event::Resize(_, _)) => self.resized = true,
                _ => {}
            }
        }
    }

    /// Key presses captured by the last drain, in arrival order.
    pub fn presses(&self) -> &[KeyCode] {
        &self.presses
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.ctrl_c
    }

    /// Did the terminal report a resize since the last drain?
    pub fn resized(&self) -> bool {
        self.resized
    }
}
