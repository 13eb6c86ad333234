//! Positionable render node with an attachable chain of visual overlays
//!
//! Every drawable object in the game sits on a `RenderNode`: it owns the
//! world position, the display size, the mirror flags, and an ordered set of
//! `RenderAction` overlays (blink, tint) that wrap the object's draw call.
//!
//! Actions are keyed by a small integer handle. Handles are recycled: the
//! smallest free slot is reused before the slot vector grows, so handles stay
//! small no matter how often effects toggle on and off.

use crate::geometry::{Position, Rect, Size};
use crate::renderer::Renderer;
use std::time::Instant;

/// A time-scoped visual overlay applied around an entity's draw call.
///
/// `push` runs before the entity draws, `pop` after, `update` once per tick.
pub trait RenderAction {
    fn push(&self, renderer: &mut dyn Renderer);
    fn pop(&self, renderer: &mut dyn Renderer);
    fn update(&mut self, now: Instant);
}

pub struct RenderNode {
    position: Position,
    size: Size,
    pub flip_x: bool,
    pub flip_y: bool,
    actions: Vec<Option<Box<dyn RenderAction>>>,
}

impl RenderNode {
    pub fn new(size: Size) -> Self {
        RenderNode {
            position: Position::default(),
            size,
            flip_x: false,
            flip_y: false,
            actions: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// World-space bounding rectangle at the current position.
    pub fn area(&self) -> Rect {
        Rect::from_parts(self.position, self.size)
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.position.x = x;
        self.position.y = y;
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn move_by(&mut self, dx: f32, dy: f32) {
        self.position.x += dx;
        self.position.y += dy;
    }

    /// Attaches an action and returns its handle.
    ///
    /// The smallest free slot is reused before a new one is allocated, so a
    /// handle freed by `remove_action` comes back before the vector grows.
    pub fn add_action(&mut self, action: Box<dyn RenderAction>) -> usize {
        for (index, slot) in self.actions.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(action);
                return index;
            }
        }

        self.actions.push(Some(action));
        self.actions.len() - 1
    }

    /// Detaches the action behind `handle`. Returns false if the slot was
    /// already empty or the handle was never allocated.
    pub fn remove_action(&mut self, handle: usize) -> bool {
        match self.actions.get_mut(handle) {
            Some(slot) if slot.is_some() => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn action_count(&self) -> usize {
        self.actions.iter().filter(|slot| slot.is_some()).count()
    }

    /// Ticks every attached action. Call once per update pass.
    pub fn update_actions(&mut self, now: Instant) {
        for slot in self.actions.iter_mut() {
            if let Some(action) = slot {
                action.update(now);
            }
        }
    }

    /// Applies every attached action's pre-draw state, in handle order.
    pub fn push_actions(&self, renderer: &mut dyn Renderer) {
        for slot in self.actions.iter() {
            if let Some(action) = slot {
                action.push(renderer);
            }
        }
    }

    /// Reverts every attached action's state, in handle order.
    pub fn pop_actions(&self, renderer: &mut dyn Renderer) {
        for slot in self.actions.iter() {
            if let Some(action) = slot {
                action.pop(renderer);
            }
        }
    }
}
