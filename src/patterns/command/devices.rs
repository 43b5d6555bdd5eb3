//! Smart-home receivers.
//!
//! Devices only change their own state and report it; they know nothing
//! about commands or history.

use crate::feedback::Feedback;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("no {kind} in {location}")]
    UnknownDevice { kind: &'static str, location: String },

    #[error("the door in {0} is locked; unlock it first")]
    DoorLocked(String),

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("macro '{name}' failed at step {step}: {source}")]
    MacroFailed {
        name: String,
        step: usize,
        source: Box<CommandError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Light {
    pub on: bool,
    /// Percent, 0..=100
    pub brightness: u8,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            on: false,
            brightness: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Door {
    pub open: bool,
    pub locked: bool,
}

impl Default for Door {
    fn default() -> Self {
        Self {
            open: false,
            locked: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thermostat {
    pub on: bool,
    /// Target in °C, 10..=30
    pub target: f64,
}

impl Default for Thermostat {
    fn default() -> Self {
        Self {
            on: false,
            target: 22.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Television {
    pub on: bool,
    /// Percent, 0..=100
    pub volume: u8,
    /// 1..=999
    pub channel: u16,
}

impl Default for Television {
    fn default() -> Self {
        Self {
            on: false,
            volume: 50,
            channel: 1,
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

/// Every device in the house, by location.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SmartHome {
    lights: BTreeMap<String, Light>,
    doors: BTreeMap<String, Door>,
    thermostats: BTreeMap<String, Thermostat>,
    televisions: BTreeMap<String, Television>,
}

macro_rules! device_access {
    ($field:ident, $ty:ty, $kind:literal, $add:ident, $get:ident, $get_mut:ident) => {
        pub fn $add(mut self, location: impl Into<String>) -> Self {
            self.$field.insert(location.into(), <$ty>::default());
            self
        }

        pub fn $get(&self, location: &str) -> Option<&$ty> {
            self.$field.get(location)
        }

        fn $get_mut(&mut self, location: &str) -> Result<&mut $ty, CommandError> {
            self.$field
                .get_mut(location)
                .ok_or_else(|| CommandError::UnknownDevice {
                    kind: $kind,
                    location: location.to_string(),
                })
        }
    };
}

impl SmartHome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Living room and kitchen lights, front and garage doors, a living
    /// room thermostat and television.
    pub fn demo() -> Self {
        Self::new()
            .with_light("living room")
            .with_light("kitchen")
            .with_door("front")
            .with_door("garage")
            .with_thermostat("living room")
            .with_television("living room")
    }

    device_access!(lights, Light, "light", with_light, light, light_mut);
    device_access!(doors, Door, "door", with_door, door, door_mut);
    device_access!(thermostats, Thermostat, "thermostat", with_thermostat, thermostat, thermostat_mut);
    device_access!(televisions, Television, "television", with_television, television, television_mut);

    pub fn set_light(&mut self, location: &str, on: bool, out: &mut dyn Feedback) -> Result<(), CommandError> {
        self.light_mut(location)?.on = on;
        out.say(&format!("{location} light {}", on_off(on)));
        Ok(())
    }

    /// Returns the brightness actually applied.
    pub fn set_brightness(&mut self, location: &str, level: i32, out: &mut dyn Feedback) -> Result<u8, CommandError> {
        let level = level.clamp(0, 100) as u8;
        self.light_mut(location)?.brightness = level;
        out.say(&format!("{location} light brightness {level}%"));
        Ok(level)
    }

    pub fn set_door_open(&mut self, location: &str, open: bool, out: &mut dyn Feedback) -> Result<(), CommandError> {
        let door = self.door_mut(location)?;
        if open && door.locked {
            return Err(CommandError::DoorLocked(location.to_string()));
        }
        door.open = open;
        out.say(&format!("{location} door {}", if open { "opened" } else { "closed" }));
        Ok(())
    }

    pub fn set_door_locked(&mut self, location: &str, locked: bool, out: &mut dyn Feedback) -> Result<(), CommandError> {
        self.door_mut(location)?.locked = locked;
        out.say(&format!("{location} door {}", if locked { "locked" } else { "unlocked" }));
        Ok(())
    }

    pub fn set_thermostat(&mut self, location: &str, on: bool, out: &mut dyn Feedback) -> Result<(), CommandError> {
        let thermostat = self.thermostat_mut(location)?;
        thermostat.on = on;
        out.say(&format!("{location} thermostat {} ({}°C)", on_off(on), thermostat.target));
        Ok(())
    }

    /// Returns the target actually applied, clamped to 10..=30.
    pub fn set_target(&mut self, location: &str, celsius: f64, out: &mut dyn Feedback) -> Result<f64, CommandError> {
        let thermostat = self.thermostat_mut(location)?;
        let celsius = celsius.clamp(10.0, 30.0);
        let old = std::mem::replace(&mut thermostat.target, celsius);
        out.say(&format!("{location} target {old}°C -> {celsius}°C"));
        Ok(celsius)
    }

    pub fn set_television(&mut self, location: &str, on: bool, out: &mut dyn Feedback) -> Result<(), CommandError> {
        let tv = self.television_mut(location)?;
        tv.on = on;
        out.say(&format!("{location} TV {} (channel {}, volume {}%)", on_off(on), tv.channel, tv.volume));
        Ok(())
    }

    pub fn set_volume(&mut self, location: &str, volume: i32, out: &mut dyn Feedback) -> Result<u8, CommandError> {
        let volume = volume.clamp(0, 100) as u8;
        self.television_mut(location)?.volume = volume;
        out.say(&format!("{location} TV volume {volume}%"));
        Ok(volume)
    }

    pub fn set_channel(&mut self, location: &str, channel: i32, out: &mut dyn Feedback) -> Result<u16, CommandError> {
        let channel = channel.clamp(1, 999) as u16;
        self.television_mut(location)?.channel = channel;
        out.say(&format!("{location} TV channel {channel}"));
        Ok(channel)
    }
}

impl fmt::Display for SmartHome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (location, light) in &self.lights {
            writeln!(f, "light {location}: {}, {}%", on_off(light.on), light.brightness)?;
        }
        for (location, door) in &self.doors {
            writeln!(
                f,
                "door {location}: {}, {}",
                if door.open { "open" } else { "closed" },
                if door.locked { "locked" } else { "unlocked" }
            )?;
        }
        for (location, t) in &self.thermostats {
            writeln!(f, "thermostat {location}: {}, {}°C", on_off(t.on), t.target)?;
        }
        for (location, tv) in &self.televisions {
            writeln!(f, "tv {location}: {}, channel {}, volume {}%", on_off(tv.on), tv.channel, tv.volume)?;
        }
        Ok(())
    }
}
