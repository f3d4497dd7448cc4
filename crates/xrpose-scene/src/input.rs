//! Controller action readings reduced to per-hand gamepad snapshots.

use serde::{Deserialize, Serialize};

pub const STICK_DEADZONE: f32 = 0.05;

/// One action's state for one hand, as synced from the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionReading<T> {
    pub is_active: bool,
    pub current_state: T,
}

impl<T> ActionReading<T> {
    pub fn active(current_state: T) -> Self {
        Self {
            is_active: true,
            current_state,
        }
    }
}

/// Everything read for one hand this frame. `None` means the read failed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawControllerState {
    pub trigger: Option<ActionReading<f32>>,
    pub trigger_click: Option<ActionReading<bool>>,
    pub grip: Option<ActionReading<f32>>,
    pub grip_click: Option<ActionReading<bool>>,
    pub stick: Option<ActionReading<[f32; 2]>>,
    pub primary: Option<ActionReading<bool>>,
    pub secondary: Option<ActionReading<bool>>,
}

impl RawControllerState {
    fn any_active(&self) -> bool {
        fn active<T>(reading: &Option<ActionReading<T>>) -> bool {
            reading.as_ref().map(|r| r.is_active).unwrap_or(false)
        }
        active(&self.trigger)
            || active(&self.trigger_click)
            || active(&self.grip)
            || active(&self.grip_click)
            || active(&self.stick)
            || active(&self.primary)
            || active(&self.secondary)
    }
}

/// Axes are `[stick_x, stick_y, trigger, grip]`, buttons `[primary, secondary]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ControllerSnapshot {
    pub axes: [f32; 4],
    pub buttons: [bool; 2],
    pub active: bool,
}

impl ControllerSnapshot {
    pub fn from_raw(raw: &RawControllerState) -> Self {
        let active = raw.any_active();
        if !active {
            return Self::default();
        }

        let click = |r: Option<ActionReading<bool>>| {
            if r.map(|s| s.current_state).unwrap_or(false) {
                1.0
            } else {
                0.0
            }
        };
        let trigger = raw
            .trigger
            .map(|s| s.current_state)
            .unwrap_or(0.0)
            .max(click(raw.trigger_click));
        let grip = raw
            .grip
            .map(|s| s.current_state)
            .unwrap_or(0.0)
            .max(click(raw.grip_click));

        let [stick_x, stick_y] = raw.stick.map(|s| s.current_state).unwrap_or([0.0, 0.0]);
        let deadzone = |v: f32| if v.abs() < STICK_DEADZONE { 0.0 } else { v };

        Self {
            axes: [deadzone(stick_x), deadzone(stick_y), trigger, grip],
            buttons: [
                raw.primary.map(|s| s.current_state).unwrap_or(false),
                raw.secondary.map(|s| s.current_state).unwrap_or(false),
            ],
            active,
        }
    }

    pub fn trigger(&self) -> f32 {
        self.axes[2]
    }
}
