use crate::{event_log::LogMessage, settings::TapCount};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerShape {
    /// LIS3DH click interrupt latched from INT1.
    Knock,
    /// Debounced push button.
    Button,
    /// Deep-sleep wake pin, classified by hold duration.
    WakeHold,
}

/// What differs between device variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Profile {
    pub trigger: TriggerShape,
    pub default_max_log_lines: u32,
    pub sensitivity_max: u8,
    pub default_sensitivity: u8,
    pub default_tap_count: TapCount,
}

impl Profile {
    pub const KNOCK: Self = Self {
        trigger: TriggerShape::Knock,
        default_max_log_lines: 30,
        sensitivity_max: 127,
        default_sensitivity: 80,
        default_tap_count: TapCount::Single,
    };

    pub const BUTTON: Self = Self {
        trigger: TriggerShape::Button,
        default_max_log_lines: 50,
        sensitivity_max: 200,
        default_sensitivity: 100,
        default_tap_count: TapCount::Single,
    };

    pub const WAKE: Self = Self {
        trigger: TriggerShape::WakeHold,
        default_max_log_lines: 30,
        sensitivity_max: 127,
        default_sensitivity: 80,
        default_tap_count: TapCount::Single,
    };

    pub const fn event_message(&self) -> LogMessage<'static> {
        match self.trigger {
            TriggerShape::Knock => LogMessage::KnockDetected,
            TriggerShape::Button => LogMessage::Triggered,
            TriggerShape::WakeHold => LogMessage::TrapActivation,
        }
    }
}
