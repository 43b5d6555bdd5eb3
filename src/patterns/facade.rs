//! Facade pattern: a home theater driven by a handful of scene methods.
//!
//! Each subsystem keeps its own settings and reports through [`Feedback`];
//! [`HomeTheater`] sequences them so callers only pick a scene.

use crate::feedback::Feedback;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioSystem {
    pub on: bool,
    pub volume: u8,
    pub surround: bool,
}

impl AudioSystem {
    pub fn turn_on(&mut self, owner: &str, out: &mut dyn Feedback) {
        self.on = true;
        out.say(&format!("{owner} turns the audio system on."));
    }

    pub fn set_volume(&mut self, level: u8, out: &mut dyn Feedback) {
        self.volume = level.min(100);
        out.say(&format!("Volume set to {}.", self.volume));
    }

    pub fn set_surround(&mut self, out: &mut dyn Feedback) {
        self.surround = true;
        out.say("Surround sound enabled.");
    }

    pub fn turn_off(&mut self, owner: &str, out: &mut dyn Feedback) {
        self.on = false;
        self.surround = false;
        out.say(&format!("{owner} turns the audio system off."));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projector {
    pub on: bool,
    pub resolution: Option<String>,
    pub aspect_ratio: Option<String>,
}

impl Projector {
    pub fn turn_on(&mut self, owner: &str, out: &mut dyn Feedback) {
        self.on = true;
        out.say(&format!("{owner} turns the projector on."));
    }

    pub fn set_resolution(&mut self, resolution: &str, out: &mut dyn Feedback) {
        self.resolution = Some(resolution.to_string());
        out.say(&format!("Resolution set to {resolution}."));
    }

    pub fn set_aspect_ratio(&mut self, ratio: &str, out: &mut dyn Feedback) {
        self.aspect_ratio = Some(ratio.to_string());
        out.say(&format!("Aspect ratio set to {ratio}."));
    }

    pub fn turn_off(&mut self, owner: &str, out: &mut dyn Feedback) {
        self.on = false;
        out.say(&format!("{owner} turns the projector off."));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lighting {
    pub on: bool,
    pub brightness: u8,
    pub color: Option<String>,
}

impl Lighting {
    pub fn turn_on(&mut self, location: &str, out: &mut dyn Feedback) {
        self.on = true;
        out.say(&format!("Lights on at {location}."));
    }

    pub fn set_brightness(&mut self, percent: u8, out: &mut dyn Feedback) {
        self.brightness = percent.min(100);
        out.say(&format!("Brightness set to {}%.", self.brightness));
    }

    pub fn set_color(&mut self, color: &str, out: &mut dyn Feedback) {
        self.color = Some(color.to_string());
        out.say(&format!("Light color changed to {color}."));
    }

    pub fn turn_off(&mut self, location: &str, out: &mut dyn Feedback) {
        self.on = false;
        out.say(&format!("Lights off at {location}."));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnackBar {
    available: Vec<String>,
    served: Vec<String>,
}

impl Default for SnackBar {
    fn default() -> Self {
        Self::with_menu(["Burger", "Fries", "Pizza", "Canned cola", "Cheeseburger", "Nuggets"])
    }
}

impl SnackBar {
    pub fn with_menu<I, S>(menu: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: menu.into_iter().map(Into::into).collect(),
            served: Vec::new(),
        }
    }

    pub fn is_available(&self, snack: &str) -> bool {
        self.available.iter().any(|s| s.eq_ignore_ascii_case(snack))
    }

    /// Prepare what is on the menu and flag the rest. Returns the prepared
    /// snacks.
    pub fn prepare(&mut self, order: &[&str], out: &mut dyn Feedback) -> Vec<String> {
        out.say("Snack bar is preparing:");
        self.served.clear();
        for snack in order {
            if self.is_available(snack) {
                out.say(&format!("  - {snack}"));
                self.served.push(snack.to_string());
            } else {
                out.say(&format!("  - {snack} (not available)"));
            }
        }
        self.served.clone()
    }

    pub fn serve(&self, out: &mut dyn Feedback) {
        if self.served.is_empty() {
            out.say("Nothing to serve.");
        } else {
            out.say(&format!("Snacks served: {}.", self.served.join(", ")));
        }
    }

    pub fn served(&self) -> &[String] {
        &self.served
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Climate {
    pub temperature: Option<i32>,
    pub humidity: Option<u8>,
    pub air_conditioning: bool,
}

impl Climate {
    pub fn set_temperature(&mut self, room: &str, celsius: i32, out: &mut dyn Feedback) {
        self.temperature = Some(celsius);
        out.say(&format!("Temperature at {room} set to {celsius}°C."));
    }

    pub fn set_humidity(&mut self, percent: u8, out: &mut dyn Feedback) {
        let percent = percent.min(100);
        self.humidity = Some(percent);
        out.say(&format!("Humidity set to {percent}%."));
    }

    pub fn air_conditioning_on(&mut self, out: &mut dyn Feedback) {
        self.air_conditioning = true;
        out.say("Air conditioning on.");
    }
}

/// What the theater is currently running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scene {
    Off,
    Movie(String),
    Gaming(String),
    Music(String),
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Movie(title) => write!(f, "movie '{title}'"),
            Self::Gaming(title) => write!(f, "game '{title}'"),
            Self::Music(playlist) => write!(f, "playlist '{playlist}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HomeTheater {
    owner: String,
    location: String,
    scene: Scene,
    pub audio: AudioSystem,
    pub projector: Projector,
    pub lighting: Lighting,
    pub snacks: SnackBar,
    pub climate: Climate,
}

impl HomeTheater {
    pub fn new(owner: &str, location: &str) -> Self {
        Self {
            owner: owner.to_string(),
            location: location.to_string(),
            scene: Scene::Off,
            audio: AudioSystem::default(),
            projector: Projector::default(),
            lighting: Lighting::default(),
            snacks: SnackBar::default(),
            climate: Climate::default(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn lights(&mut self, brightness: u8, color: &str, out: &mut dyn Feedback) {
        self.lighting.turn_on(&self.location, out);
        self.lighting.set_brightness(brightness, out);
        self.lighting.set_color(color, out);
    }

    fn sound(&mut self, volume: u8, out: &mut dyn Feedback) {
        self.audio.turn_on(&self.owner, out);
        self.audio.set_volume(volume, out);
        self.audio.set_surround(out);
    }

    fn picture(&mut self, resolution: &str, out: &mut dyn Feedback) {
        self.projector.turn_on(&self.owner, out);
        self.projector.set_resolution(resolution, out);
        self.projector.set_aspect_ratio("16:9", out);
    }

    pub fn start_movie(&mut self, title: &str, snacks: &[&str], out: &mut dyn Feedback) {
        out.say(&format!("=== {} starts watching '{title}' ===", self.owner));
        self.climate.set_temperature(&self.location, 22, out);
        self.climate.set_humidity(50, out);
        self.climate.air_conditioning_on(out);
        self.lights(10, "blue", out);
        self.sound(15, out);
        self.picture("4K Ultra HD", out);
        self.snacks.prepare(snacks, out);
        self.snacks.serve(out);
        out.say(&format!("'{title}' is starting. Enjoy the show!"));
        self.enter(Scene::Movie(title.to_string()));
    }

    pub fn start_gaming(&mut self, game: &str, out: &mut dyn Feedback) {
        out.say(&format!("=== {} starts a gaming session: '{game}' ===", self.owner));
        self.climate.set_temperature(&self.location, 20, out);
        self.climate.air_conditioning_on(out);
        self.lights(30, "red", out);
        self.sound(20, out);
        self.picture("1080p", out);
        out.say(&format!("Gaming session '{game}' started."));
        self.enter(Scene::Gaming(game.to_string()));
    }

    pub fn start_music(&mut self, playlist: &str, out: &mut dyn Feedback) {
        out.say(&format!("=== {} plays music: '{playlist}' ===", self.owner));
        self.lights(40, "multicolor", out);
        self.sound(12, out);
        out.say(&format!("Now playing: {playlist}"));
        self.enter(Scene::Music(playlist.to_string()));
    }

    fn power_down(&mut self, out: &mut dyn Feedback) {
        self.projector.turn_off(&self.owner, out);
        self.audio.turn_off(&self.owner, out);
        self.lighting.turn_off(&self.location, out);
    }

    pub fn end(&mut self, out: &mut dyn Feedback) {
        if self.scene == Scene::Off {
            out.say("Nothing is running.");
            return;
        }
        out.say(&format!("=== {} ends the {} ===", self.owner, self.scene));
        self.power_down(out);
        out.say("All systems off. See you next time!");
        self.enter(Scene::Off);
    }

    /// Cut every powered subsystem regardless of the current scene.
    pub fn emergency_shutdown(&mut self, out: &mut dyn Feedback) {
        out.say("=== EMERGENCY SHUTDOWN ===");
        self.power_down(out);
        out.say("All systems cut off.");
        tracing::warn!(owner = %self.owner, scene = %self.scene, "emergency shutdown");
        self.enter(Scene::Off);
    }

    fn enter(&mut self, scene: Scene) {
        tracing::info!(owner = %self.owner, from = %self.scene, to = %scene, "theater scene changed");
        self.scene = scene;
    }
}
