//! Stock render actions and the chained enable/disable state machine
//!
//! A `RenderAction` only knows how to wrap one draw call. The lifecycle around
//! it ("turn the blink on for two seconds, and when it ends, keep tint-
//! blinking while energy is still critical") lives in `RenderActionState`:
//! an enable/disable wrapper with an optional auto-disable deadline and a
//! one-way chain of successor states, each guarded by a predicate that is
//! evaluated at the moment the predecessor goes dark.

use crate::render_node::{RenderAction, RenderNode};
use crate::renderer::Renderer;
use sdl2::pixels::Color;
use std::time::{Duration, Instant};

/// Blinks the wrapped draw between two alpha levels at a fixed interval.
pub struct AlphaBlinkAction {
    off_alpha: u8,
    on_alpha: u8,
    delay: Duration,
    alpha: u8,
    last_blink: Option<Instant>,
}

impl AlphaBlinkAction {
    pub fn new(off_alpha: u8, on_alpha: u8, delay: Duration) -> Self {
        AlphaBlinkAction {
            off_alpha,
            on_alpha,
            delay,
            alpha: off_alpha,
            last_blink: None,
        }
    }

    fn toggle(&mut self) {
        self.alpha = if self.alpha == self.off_alpha {
            self.on_alpha
        } else {
            self.off_alpha
        };
    }
}

impl RenderAction for AlphaBlinkAction {
    fn push(&self, renderer: &mut dyn Renderer) {
        renderer.set_alpha(self.alpha);
    }

    fn pop(&self, renderer: &mut dyn Renderer) {
        renderer.clear_alpha();
    }

    fn update(&mut self, now: Instant) {
        match self.last_blink {
            None => self.last_blink = Some(now),
            Some(mut last) => {
                // Catch up whole intervals so a slow frame cannot stall the blink phase
                while now.duration_since(last) >= self.delay {
                    self.toggle();
                    last += self.delay;
                }
                self.last_blink = Some(last);
            }
        }
    }
}

/// Blinks a color tint over the wrapped draw at a fixed interval.
pub struct TintBlinkAction {
    color: Color,
    delay: Duration,
    tinted: bool,
    last_blink: Option<Instant>,
}

impl TintBlinkAction {
    pub fn new(color: Color, delay: Duration) -> Self {
        TintBlinkAction {
            color,
            delay,
            tinted: true,
            last_blink: None,
        }
    }
}

impl RenderAction for TintBlinkAction {
    fn push(&self, renderer: &mut dyn Renderer) {
        if self.tinted {
            renderer.set_tint(self.color);
        }
    }

    fn pop(&self, renderer: &mut dyn Renderer) {
        if self.tinted {
            renderer.clear_tint();
        }
    }

    fn update(&mut self, now: Instant) {
        match self.last_blink {
            None => self.last_blink = Some(now),
            Some(mut last) => {
                while now.duration_since(last) >= self.delay {
                    self.tinted = !self.tinted;
                    last += self.delay;
                }
                self.last_blink = Some(last);
            }
        }
    }
}

/// Builds a fresh action instance each time the state is enabled.
///
/// A plain function pointer: blink parameters are compile-time constants, so
/// no captures are needed, and states stay `'static` without boxing.
pub type ActionFactory = fn() -> Box<dyn RenderAction>;

/// A successor in an effect chain, activated only if its predicate holds at
/// the moment the predecessor is disabled.
pub struct ChainedState<C> {
    predicate: fn(&C) -> bool,
    state: RenderActionState<C>,
}

/// Enable/disable lifecycle around one render action, with an optional
/// auto-disable deadline and a one-way successor chain.
///
/// `C` is the context type the chain predicates inspect (for the player, a
/// snapshot of its vitals). Disabling, explicitly or via the deadline,
/// evaluates the chain head's predicate; if it holds, the *entire remaining
/// chain* is spliced onto the successor before the successor is enabled with
/// its own configured ttl. Predicates are therefore always evaluated in chain
/// order at disable time, never retroactively.
pub struct RenderActionState<C> {
    factory: ActionFactory,
    ttl: Option<Duration>,
    handle: Option<usize>,
    deadline: Option<Instant>,
    chain: Vec<ChainedState<C>>,
}

impl<C> RenderActionState<C> {
    /// `ttl` is the auto-disable timeout applied every time this state is
    /// enabled; `None` keeps the action attached until explicitly disabled.
    pub fn new(factory: ActionFactory, ttl: Option<Duration>) -> Self {
        RenderActionState {
            factory,
            ttl,
            handle: None,
            deadline: None,
            chain: Vec::new(),
        }
    }

    /// Appends a successor to the chain.
    pub fn chain(&mut self, predicate: fn(&C) -> bool, state: RenderActionState<C>) {
        self.chain.push(ChainedState { predicate, state });
    }

    #[allow(dead_code)] // Exposed for tests
    pub fn is_enabled(&self) -> bool {
        self.handle.is_some()
    }

    /// Attaches a fresh action instance to `node` and arms the deadline.
    /// Enabling an already enabled state only re-arms the deadline.
    pub fn enable(&mut self, node: &mut RenderNode, now: Instant) {
        if self.handle.is_none() {
            self.handle = Some(node.add_action((self.factory)()));
        }
        self.deadline = self.ttl.map(|ttl| now + ttl);
    }

    /// Detaches the action and runs the chain check.
    ///
    /// If the chain head's predicate holds against `ctx`, this state is
    /// replaced by the successor (already enabled, remaining chain carried
    /// over). A failed predicate consumes the chain: a successor skipped now
    /// is never activated retroactively.
    pub fn disable(&mut self, node: &mut RenderNode, ctx: &C, now: Instant) {
        if let Some(handle) = self.handle.take() {
            node.remove_action(handle);
        }
        self.deadline = None;

        let mut rest = std::mem::take(&mut self.chain);
        if rest.is_empty() {
            return;
        }

        let head = rest.remove(0);
        if !(head.predicate)(ctx) {
            return;
        }

        let mut next = head.state;
        rest.extend(next.chain.drain(..));
        next.chain = rest;
        next.enable(node, now);
        *self = next;
    }

    /// Detaches the action and drops the whole chain without evaluating any
    /// predicate. For tearing an effect down before replacing it; `disable`
    /// would hand the node to a successor nothing owns anymore.
    pub fn cancel(&mut self, node: &mut RenderNode) {
        if let Some(handle) = self.handle.take() {
            node.remove_action(handle);
        }
        self.deadline = None;
        self.chain.clear();
    }

    /// Per-tick check: disables (and chains) once the deadline has passed.
    pub fn update(&mut self, node: &mut RenderNode, ctx: &C, now: Instant) {
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.disable(node, ctx, now);
            }
        }
    }
}
