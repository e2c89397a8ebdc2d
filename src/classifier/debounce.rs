use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::Level;

#[derive(Clone, Copy, Debug)]
enum DebounceEvent {
    Sample { level: Level, now_ms: u64 },
    Reset { level: Level, now_ms: u64 },
}

#[derive(Default)]
struct DispatchContext {
    event: Option<TriggerEvent>,
}

/// A press that survived debouncing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerEvent {
    pub at_ms: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DebounceStateId {
    #[default]
    Released,
    Pressed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceOutput {
    pub event: Option<TriggerEvent>,
    pub stable: Level,
    pub state_id: DebounceStateId,
}

pub struct TriggerDebouncer {
    machine: statig::blocking::StateMachine<DebounceHsm>,
}

impl TriggerDebouncer {
    /// `active` is the level a press drives the pin to: `Low` for a button with a
    /// pull-up, `High` for an interrupt line.
    pub fn new(active: Level, delay_ms: u64) -> Self {
        Self {
            machine: DebounceHsm::new(active, delay_ms).state_machine(),
        }
    }

    pub fn poll(&mut self, level: Level, now_ms: u64) -> DebounceOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&DebounceEvent::Sample { level, now_ms }, &mut context);
        self.finish(context)
    }

    /// Forgets any half-seen press, e.g. after the trigger hardware was re-armed.
    pub fn reset(&mut self, level: Level, now_ms: u64) -> DebounceOutput {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&DebounceEvent::Reset { level, now_ms }, &mut context);
        self.finish(context)
    }

    pub fn stable_level(&self) -> Level {
        self.machine.inner().stable
    }

    fn finish(&self, context: DispatchContext) -> DebounceOutput {
        let hsm = self.machine.inner();
        DebounceOutput {
            event: context.event,
            stable: hsm.stable,
            state_id: hsm.state_id,
        }
    }
}

struct DebounceHsm {
    active: Level,
    delay_ms: u64,
    stable: Level,
    last_observed: Level,
    last_transition_ms: u64,
    state_id: DebounceStateId,
}

impl DebounceHsm {
    fn new(active: Level, delay_ms: u64) -> Self {
        let idle = active.inverse();
        Self {
            active,
            delay_ms,
            stable: idle,
            last_observed: idle,
            last_transition_ms: 0,
            state_id: DebounceStateId::Released,
        }
    }

    fn observe(&mut self, level: Level, now_ms: u64) {
        if level != self.last_observed {
            self.last_observed = level;
            self.last_transition_ms = now_ms;
        }
    }

    fn settled(&self, now_ms: u64) -> bool {
        self.last_observed != self.stable
            && now_ms.saturating_sub(self.last_transition_ms) >= self.delay_ms
    }
}

#[state_machine(initial = "State::released()")]
impl DebounceHsm {
    #[state(superstate = "sampling")]
    fn released(&mut self, context: &mut DispatchContext, event: &DebounceEvent) -> Outcome<State> {
        match event {
            DebounceEvent::Sample { level, now_ms } => {
                self.observe(*level, *now_ms);
                if self.settled(*now_ms) && self.last_observed == self.active {
                    self.stable = self.active;
                    self.state_id = DebounceStateId::Pressed;
                    context.event = Some(TriggerEvent { at_ms: *now_ms });
                    return Transition(State::pressed());
                }
                Handled
            }
            DebounceEvent::Reset { .. } => Super,
        }
    }

    #[state(superstate = "sampling")]
    fn pressed(&mut self, context: &mut DispatchContext, event: &DebounceEvent) -> Outcome<State> {
        let _ = context;
        match event {
            DebounceEvent::Sample { level, now_ms } => {
                self.observe(*level, *now_ms);
                if self.settled(*now_ms) {
                    self.stable = self.last_observed;
                    self.state_id = DebounceStateId::Released;
                    return Transition(State::released());
                }
                Handled
            }
            DebounceEvent::Reset { .. } => Super,
        }
    }

    #[superstate]
    fn sampling(&mut self, context: &mut DispatchContext, event: &DebounceEvent) -> Outcome<State> {
        let _ = context;
        match event {
            DebounceEvent::Reset { level, now_ms } => {
                // Whatever the pin shows now becomes the baseline; no edge is emitted.
                self.stable = *level;
                self.last_observed = *level;
                self.last_transition_ms = *now_ms;
                if *level == self.active {
                    self.state_id = DebounceStateId::Pressed;
                    Transition(State::pressed())
                } else {
                    self.state_id = DebounceStateId::Released;
                    Transition(State::released())
                }
            }
            _ => Handled,
        }
    }
}
