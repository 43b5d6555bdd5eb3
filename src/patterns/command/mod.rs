//! Command pattern: smart-home devices driven by undoable commands.

pub mod commands;
pub mod devices;

pub use commands::{
    Command, Invoker, MacroCommand, SetBrightness, SetChannel, SetTemperature, SetVolume,
    ToggleDoor, ToggleLight, ToggleLock, ToggleTelevision, ToggleThermostat, HISTORY_LIMIT,
};
pub use devices::{CommandError, Door, Light, SmartHome, Television, Thermostat};
