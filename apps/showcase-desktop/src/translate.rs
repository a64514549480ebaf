use std::collections::HashMap;

use glam::Vec2;
use showcase_input::InputKind;
use winit::event::{MouseScrollDelta, TouchPhase};

/// Pixel scroll distance treated as one wheel notch.
const PIXELS_PER_NOTCH: f32 = 100.0;

/// Turns window-system pointer traffic into the canvas input vocabulary.
///
/// Positions are logical pixels. Moves while the primary button or a touch
/// is held also produce a `Drag` carrying the delta since the last move.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    cursor: Option<Vec2>,
    button_held: bool,
    touches: HashMap<u64, Vec2>,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn cursor_moved(&mut self, at: Vec2) -> Vec<InputKind> {
        let mut out = Vec::with_capacity(2);
        if self.button_held {
            if let Some(prev) = self.cursor {
                out.push(InputKind::Drag(at - prev));
            }
        }
        self.cursor = Some(at);
        out.push(InputKind::PointerMove(at));
        out
    }

    pub fn primary_button(&mut self, pressed: bool) -> Option<InputKind> {
        if pressed == self.button_held {
            return None;
        }
        self.button_held = pressed;
        Some(if pressed {
            InputKind::PointerDown
        } else {
            InputKind::PointerUp
        })
    }

    pub fn touch(&mut self, id: u64, phase: TouchPhase, at: Vec2) -> Vec<InputKind> {
        match phase {
            TouchPhase::Started => {
                self.touches.insert(id, at);
                self.cursor = Some(at);
                vec![InputKind::PointerMove(at), InputKind::TouchStart]
            }
            TouchPhase::Moved => {
                let Some(prev) = self.touches.insert(id, at) else {
                    return Vec::new();
                };
                self.cursor = Some(at);
                vec![InputKind::Drag(at - prev), InputKind::PointerMove(at)]
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                if self.touches.remove(&id).is_some() {
                    vec![InputKind::TouchEnd]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn wheel(&self, delta: MouseScrollDelta) -> Option<InputKind> {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_NOTCH,
        };
        (notches != 0.0).then_some(InputKind::Wheel(notches))
    }
}
