//! Level phase sequencing.
//!
//! ```text
//! Active --timer hits 0--> FadingOut --alpha 255--> TransitionHold --hold over-->
//!     next phase exists: FadingIn --alpha 0--> Active(next)
//!     final phase:       RoundOver
//! ```
//!
//! The countdown is driven by the wall clock, one decrement per elapsed
//! second, and only runs while `Active`. Fades move a fixed alpha step per
//! tick. The sequencer only reports what happened; the world reacts to
//! `PhaseEvent::PhaseLoaded` by resetting the roster.

use brawl_core::time::SecondTimer;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PhaseConfig {
    pub label: String,
    pub timer_secs: u32,
    #[serde(default = "default_max_enemies")]
    pub max_enemies: usize,
    #[serde(default = "default_enemy_hp")]
    pub enemy_hp: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FadeConfig {
    /// Alpha change per tick.
    pub step: u8,
    /// Pause at full black before the next phase loads.
    pub hold_ms: u64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            step: 5,
            hold_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    Active,
    FadingOut { alpha: u8 },
    TransitionHold { until_ms: u64 },
    FadingIn { alpha: u8 },
    RoundOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseEvent {
    TimerTick { remaining: u32 },
    FadeOutStarted,
    HoldStarted,
    PhaseLoaded { index: usize },
    FadeInFinished,
    RoundOver,
}

#[derive(Debug, Clone)]
pub struct PhaseSequencer {
    phases: Vec<PhaseConfig>,
    fade: FadeConfig,
    index: usize,
    timer_secs: u32,
    state: PhaseState,
    countdown: SecondTimer,
}

impl PhaseSequencer {
    /// `phases` must be non-empty; the config validator guarantees it.
    pub fn new(phases: Vec<PhaseConfig>, fade: FadeConfig, now_ms: u64) -> Self {
        let timer_secs = phases.first().map(|p| p.timer_secs).unwrap_or(0);
        Self {
            phases,
            fade,
            index: 0,
            timer_secs,
            state: PhaseState::Active,
            countdown: SecondTimer::new(now_ms),
        }
    }

    /// Resume an `Active` phase with a given countdown.
    pub fn resume(&mut self, index: usize, timer_secs: u32, now_ms: u64) -> Result<(), String> {
        if index >= self.phases.len() {
            return Err(format!(
                "Cannot resume phase {}: round has {} phases",
                index,
                self.phases.len()
            ));
        }
        self.index = index;
        self.timer_secs = timer_secs.min(self.phases[index].timer_secs);
        self.state = PhaseState::Active;
        self.countdown.reset(now_ms);
        Ok(())
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &PhaseConfig {
        &self.phases[self.index]
    }

    pub fn timer_secs(&self) -> u32 {
        self.timer_secs
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    pub fn is_final_phase(&self) -> bool {
        self.index + 1 >= self.phases.len()
    }

    /// False while the screen is held black and after the round ended.
    pub fn is_simulating(&self) -> bool {
        !matches!(
            self.state,
            PhaseState::TransitionHold { .. } | PhaseState::RoundOver
        )
    }

    pub fn spawning_enabled(&self) -> bool {
        self.timer_secs > 0 && matches!(self.state, PhaseState::Active | PhaseState::FadingIn { .. })
    }

    pub fn fade_alpha(&self) -> u8 {
        match self.state {
            PhaseState::Active => 0,
            PhaseState::FadingOut { alpha } | PhaseState::FadingIn { alpha } => alpha,
            PhaseState::TransitionHold { .. } | PhaseState::RoundOver => u8::MAX,
        }
    }

    /// Text drawn over the fade: the label of the phase being entered.
    pub fn banner(&self) -> Option<&str> {
        match self.state {
            PhaseState::FadingOut { .. } | PhaseState::TransitionHold { .. } => self
                .phases
                .get(self.index + 1)
                .map(|phase| phase.label.as_str()),
            PhaseState::FadingIn { .. } => Some(self.current().label.as_str()),
            PhaseState::Active | PhaseState::RoundOver => None,
        }
    }

    pub fn update(&mut self, now_ms: u64) -> Option<PhaseEvent> {
        match self.state {
            PhaseState::Active => {
                if self.timer_secs == 0 {
                    return Some(self.start_fade_out());
                }
                if !self.countdown.poll(now_ms) {
                    return None;
                }
                self.timer_secs -= 1;
                if self.timer_secs == 0 {
                    Some(self.start_fade_out())
                } else {
                    Some(PhaseEvent::TimerTick {
                        remaining: self.timer_secs,
                    })
                }
            }
            PhaseState::FadingOut { alpha } => {
                let alpha = alpha.saturating_add(self.fade.step);
                if alpha == u8::MAX {
                    self.state = PhaseState::TransitionHold {
                        until_ms: now_ms + self.fade.hold_ms,
                    };
                    Some(PhaseEvent::HoldStarted)
                } else {
                    self.state = PhaseState::FadingOut { alpha };
                    None
                }
            }
            PhaseState::TransitionHold { until_ms } => {
                if now_ms < until_ms {
                    return None;
                }
                if self.is_final_phase() {
                    self.state = PhaseState::RoundOver;
                    log::info!("Round over after '{}'", self.current().label);
                    return Some(PhaseEvent::RoundOver);
                }
                self.index += 1;
                self.timer_secs = self.phases[self.index].timer_secs;
                self.state = PhaseState::FadingIn { alpha: u8::MAX };
                log::info!(
                    "Entering phase {} '{}' ({}s)",
                    self.index + 1,
                    self.current().label,
                    self.timer_secs
                );
                Some(PhaseEvent::PhaseLoaded { index: self.index })
            }
            PhaseState::FadingIn { alpha } => {
                let alpha = alpha.saturating_sub(self.fade.step);
                if alpha == 0 {
                    self.state = PhaseState::Active;
                    self.countdown.reset(now_ms);
                    Some(PhaseEvent::FadeInFinished)
                } else {
                    self.state = PhaseState::FadingIn { alpha };
                    None
                }
            }
            PhaseState::RoundOver => None,
        }
    }

    fn start_fade_out(&mut self) -> PhaseEvent {
        self.state = PhaseState::FadingOut { alpha: 0 };
        log::info!("Phase '{}' timer expired", self.current().label);
        PhaseEvent::FadeOutStarted
    }
}

const fn default_max_enemies() -> usize {
    1
}

const fn default_enemy_hp() -> u32 {
    1
}
