//! Undoable commands and the invoker that records them.

use super::devices::{CommandError, SmartHome};
use crate::feedback::Feedback;
use std::collections::VecDeque;

/// Most commands the invoker keeps for undo.
pub const HISTORY_LIMIT: usize = 10;

/// A reversible request against the house.
///
/// `execute` captures whatever `undo` needs to restore the previous state.
pub trait Command {
    fn execute(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError>;

    fn undo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError>;

    fn describe(&self) -> String;
}

/// Flips a two-state device and flips it back on undo.
macro_rules! toggle_command {
    ($name:ident, $label:literal, $get:ident, $field:ident, $set:ident) => {
        pub struct $name {
            location: String,
            previous: Option<bool>,
        }

        impl $name {
            pub fn new(location: impl Into<String>) -> Self {
                Self {
                    location: location.into(),
                    previous: None,
                }
            }
        }

        impl Command for $name {
            fn execute(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
                let current = home
                    .$get(&self.location)
                    .map(|d| d.$field)
                    .ok_or_else(|| CommandError::UnknownDevice {
                        kind: $label,
                        location: self.location.clone(),
                    })?;
                home.$set(&self.location, !current, out)?;
                self.previous = Some(current);
                Ok(())
            }

            fn undo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
                match self.previous {
                    Some(previous) => home.$set(&self.location, previous, out),
                    None => Ok(()),
                }
            }

            fn describe(&self) -> String {
                format!("toggle {} {}", self.location, $label)
            }
        }
    };
}

toggle_command!(ToggleLight, "light", light, on, set_light);
toggle_command!(ToggleDoor, "door", door, open, set_door_open);
toggle_command!(ToggleLock, "lock", door, locked, set_door_locked);
toggle_command!(ToggleThermostat, "thermostat", thermostat, on, set_thermostat);
toggle_command!(ToggleTelevision, "television", television, on, set_television);

/// Sets a numeric level and restores the old one on undo.
macro_rules! level_command {
    ($name:ident, $ty:ty, $what:literal, $unit:literal, $kind:literal, $get:ident, $field:ident, $set:ident) => {
        pub struct $name {
            location: String,
            level: $ty,
            previous: Option<$ty>,
        }

        impl $name {
            pub fn new(location: impl Into<String>, level: $ty) -> Self {
                Self {
                    location: location.into(),
                    level,
                    previous: None,
                }
            }
        }

        impl Command for $name {
            fn execute(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
                let current = home
                    .$get(&self.location)
                    .map(|d| d.$field)
                    .ok_or_else(|| CommandError::UnknownDevice {
                        kind: $kind,
                        location: self.location.clone(),
                    })?;
                home.$set(&self.location, self.level, out)?;
                self.previous = Some(current.into());
                Ok(())
            }

            fn undo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
                match self.previous {
                    Some(previous) => home.$set(&self.location, previous, out).map(|_| ()),
                    None => Ok(()),
                }
            }

            fn describe(&self) -> String {
                format!("set {} {} to {}{}", self.location, $what, self.level, $unit)
            }
        }
    };
}

level_command!(SetBrightness, i32, "brightness", "%", "light", light, brightness, set_brightness);
level_command!(SetTemperature, f64, "temperature", "°C", "thermostat", thermostat, target, set_target);
level_command!(SetVolume, i32, "volume", "%", "television", television, volume, set_volume);
level_command!(SetChannel, i32, "channel", "", "television", television, channel, set_channel);

/// Runs its steps in order and undoes them in reverse.
///
/// If a step fails, the steps that already ran are rolled back and the
/// macro reports which step broke.
pub struct MacroCommand {
    name: String,
    steps: Vec<Box<dyn Command>>,
}

impl MacroCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn then(mut self, step: impl Command + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl Command for MacroCommand {
    fn execute(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
        for index in 0..self.steps.len() {
            if let Err(error) = self.steps[index].execute(home, out) {
                for done in self.steps[..index].iter_mut().rev() {
                    done.undo(home, out)?;
                }
                return Err(CommandError::MacroFailed {
                    name: self.name.clone(),
                    step: index + 1,
                    source: Box::new(error),
                });
            }
        }
        Ok(())
    }

    fn undo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<(), CommandError> {
        for step in self.steps.iter_mut().rev() {
            step.undo(home, out)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("macro '{}' ({} steps)", self.name, self.steps.len())
    }
}

/// Executes commands and keeps bounded undo and redo stacks.
pub struct Invoker {
    done: VecDeque<Box<dyn Command>>,
    undone: Vec<Box<dyn Command>>,
    limit: usize,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            done: VecDeque::new(),
            undone: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Run a command. Failed commands are not recorded. A new command
    /// clears the redo stack; the oldest entry is dropped past the limit.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        home: &mut SmartHome,
        out: &mut dyn Feedback,
    ) -> Result<(), CommandError> {
        if let Err(error) = command.execute(home, out) {
            tracing::warn!(command = %command.describe(), %error, "command failed");
            return Err(error);
        }
        tracing::debug!(command = %command.describe(), "command executed");
        self.done.push_back(command);
        self.undone.clear();
        while self.done.len() > self.limit {
            self.done.pop_front();
        }
        Ok(())
    }

    /// Undo the latest command; returns its description.
    pub fn undo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<String, CommandError> {
        let mut command = self.done.pop_back().ok_or(CommandError::NothingToUndo)?;
        if let Err(error) = command.undo(home, out) {
            self.done.push_back(command);
            return Err(error);
        }
        let description = command.describe();
        self.undone.push(command);
        Ok(description)
    }

    /// Re-run the latest undone command; returns its description.
    pub fn redo(&mut self, home: &mut SmartHome, out: &mut dyn Feedback) -> Result<String, CommandError> {
        let mut command = self.undone.pop().ok_or(CommandError::NothingToRedo)?;
        if let Err(error) = command.execute(home, out) {
            self.undone.push(command);
            return Err(error);
        }
        let description = command.describe();
        self.done.push_back(command);
        Ok(description)
    }

    /// Descriptions of undoable commands, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.done.iter().map(|c| c.describe()).collect()
    }

    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Transcript;

    fn setup() -> (SmartHome, Invoker, Transcript) {
        (SmartHome::demo(), Invoker::new(), Transcript::new())
    }

    #[test]
    fn toggle_and_undo_restore_state() {
        let (mut home, mut invoker, mut out) = setup();
        invoker
            .execute(Box::new(ToggleLight::new("kitchen")), &mut home, &mut out)
            .unwrap();
        assert!(home.light("kitchen").unwrap().on);

        assert_eq!(invoker.undo(&mut home, &mut out).unwrap(), "toggle kitchen light");
        assert!(!home.light("kitchen").unwrap().on);

        invoker.redo(&mut home, &mut out).unwrap();
        assert!(home.light("kitchen").unwrap().on);
    }

    #[test]
    fn levels_are_clamped_and_undone() {
        let (mut home, mut invoker, mut out) = setup();
        invoker
            .execute(Box::new(SetVolume::new("living room", 140)), &mut home, &mut out)
            .unwrap();
        invoker
            .execute(Box::new(SetTemperature::new("living room", 5.0)), &mut home, &mut out)
            .unwrap();
        assert_eq!(home.television("living room").unwrap().volume, 100);
        assert_eq!(home.thermostat("living room").unwrap().target, 10.0);

        invoker.undo(&mut home, &mut out).unwrap();
        invoker.undo(&mut home, &mut out).unwrap();
        assert_eq!(home.television("living room").unwrap().volume, 50);
        assert_eq!(home.thermostat("living room").unwrap().target, 22.0);
    }

    #[test]
    fn locked_door_refuses_and_is_not_recorded() {
        let (mut home, mut invoker, mut out) = setup();
        let result = invoker.execute(Box::new(ToggleDoor::new("front")), &mut home, &mut out);

        assert_eq!(result, Err(CommandError::DoorLocked("front".into())));
        assert!(!invoker.can_undo());
    }

    #[test]
    fn unknown_devices_are_errors() {
        let (mut home, mut invoker, mut out) = setup();
        assert!(matches!(
            invoker.execute(Box::new(ToggleLight::new("attic")), &mut home, &mut out),
            Err(CommandError::UnknownDevice { kind: "light", .. })
        ));
    }

    #[test]
    fn history_is_bounded() {
        let (mut home, mut invoker, mut out) = setup();
        for level in 0..15 {
            invoker
                .execute(Box::new(SetChannel::new("living room", level + 1)), &mut home, &mut out)
                .unwrap();
        }
        let history = invoker.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0], "set living room channel to 6");
    }

    #[test]
    fn new_command_clears_redo() {
        let (mut home, mut invoker, mut out) = setup();
        invoker
            .execute(Box::new(ToggleLight::new("kitchen")), &mut home, &mut out)
            .unwrap();
        invoker.undo(&mut home, &mut out).unwrap();
        assert!(invoker.can_redo());

        invoker
            .execute(Box::new(ToggleTelevision::new("living room")), &mut home, &mut out)
            .unwrap();
        assert_eq!(invoker.redo(&mut home, &mut out), Err(CommandError::NothingToRedo));
        assert_eq!(Invoker::new().undo(&mut home, &mut out), Err(CommandError::NothingToUndo));
    }

    #[test]
    fn macro_runs_and_undoes_in_reverse() {
        let (mut home, mut invoker, mut out) = setup();
        let arrive = MacroCommand::new("arrive home")
            .then(ToggleLock::new("front"))
            .then(ToggleDoor::new("front"))
            .then(ToggleLight::new("living room"))
            .then(SetBrightness::new("living room", 40));
        invoker.execute(Box::new(arrive), &mut home, &mut out).unwrap();

        let door = home.door("front").unwrap();
        assert!(door.open && !door.locked);
        assert_eq!(home.light("living room").unwrap().brightness, 40);

        invoker.undo(&mut home, &mut out).unwrap();
        let door = home.door("front").unwrap();
        assert!(!door.open && door.locked);
        assert_eq!(home.light("living room").unwrap().brightness, 100);
    }

    #[test]
    fn failed_macro_rolls_back() {
        let (mut home, mut invoker, mut out) = setup();
        let broken = MacroCommand::new("movie night")
            .then(ToggleLight::new("living room"))
            .then(ToggleDoor::new("garage"));

        let err = invoker.execute(Box::new(broken), &mut home, &mut out).unwrap_err();
        assert!(matches!(err, CommandError::MacroFailed { step: 2, .. }));
        assert!(!home.light("living room").unwrap().on);
    }
}
