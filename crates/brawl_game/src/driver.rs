//! Fixed-cadence frame loop.
//!
//! Per tick: drain input, step the world, build and present a frame, then
//! sleep off the rest of the tick. There is no accumulator; the simulation
//! runs once per loop iteration, so a slow frame simply makes the game slow.

use brawl_core::input::{InputState, Key};
use brawl_core::time::{Clock, FrameTimer};

use crate::choices::KeyBindings;
use crate::physics::ControllerInput;
use crate::render::{build_frame, FrameView};
use crate::world::{RoundResult, StepOutcome, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseMotion { x: i32, y: i32 },
    Quit,
}

/// Non-blocking source of this tick's events.
pub trait InputSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

pub trait Presenter {
    fn present(&mut self, frame: &FrameView);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Quit,
    RoundOver(RoundResult),
}

pub struct FrameLoop<C: Clock> {
    pub world: World,
    input: InputState,
    bindings: KeyBindings,
    timer: FrameTimer,
    clock: C,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(world: World, bindings: KeyBindings, tick_ms: u64, clock: C) -> Self {
        Self {
            world,
            input: InputState::new(),
            bindings,
            timer: FrameTimer::new(tick_ms),
            clock,
        }
    }

    pub fn run(
        &mut self,
        source: &mut impl InputSource,
        presenter: &mut impl Presenter,
    ) -> LoopExit {
        loop {
            if let Some(exit) = self.run_tick(source, presenter) {
                log::info!(
                    "Frame loop exited after {} frames (~{:.1} fps)",
                    self.timer.frame_count,
                    self.timer.smoothed_fps
                );
                return exit;
            }
        }
    }

    /// One loop iteration. Returns `Some` when the loop should stop.
    pub fn run_tick(
        &mut self,
        source: &mut impl InputSource,
        presenter: &mut impl Presenter,
    ) -> Option<LoopExit> {
        let now = self.clock.now_ms();
        self.timer.begin_frame(now);

        let Some(movement) = self.drain_events(source) else {
            return Some(LoopExit::Quit);
        };

        let intent = self.bindings.intent(&self.input, movement);
        let outcome = self.world.step(intent, now);
        self.input.end_frame();

        presenter.present(&build_frame(&self.world));

        if let StepOutcome::RoundOver(result) = outcome {
            return Some(LoopExit::RoundOver(result));
        }

        let remaining = self.timer.end_frame(self.clock.now_ms());
        if !remaining.is_zero() {
            self.clock.sleep(remaining);
        }
        None
    }

    /// Feed pending events into the input state and fold direction edges in
    /// arrival order. Returns `None` on quit.
    fn drain_events(&mut self, source: &mut impl InputSource) -> Option<ControllerInput> {
        let bounds = (
            self.world.config.viewport.width.max(0) as u32,
            self.world.config.viewport.height.max(0) as u32,
        );
        let mut movement = ControllerInput::default();
        for event in source.poll() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Key::Escape) => {
                    log::info!("Quit requested");
                    return None;
                }
                InputEvent::KeyDown(key) => {
                    // Repeats of a held key are not new edges.
                    if !self.input.is_held(key) {
                        self.bindings.fold_edge(&mut movement, key, true);
                    }
                    self.input.key_down(key);
                }
                InputEvent::KeyUp(key) => {
                    if self.input.is_held(key) {
                        self.bindings.fold_edge(&mut movement, key, false);
                    }
                    self.input.key_up(key);
                }
                InputEvent::MouseMotion { x, y } => {
                    self.input.mouse_moved(x, y, bounds);
                }
            }
        }
        Some(movement)
    }
}
