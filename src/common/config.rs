use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tessel").join("config.toml"))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum FocusFollowsMouse {
    #[default]
    Disabled,
    /// Focus the window under the pointer without raising it.
    Autofocus,
    /// Focus and raise the window under the pointer.
    Autoraise,
}

impl FromStr for FocusFollowsMouse {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" | "off" => Ok(Self::Disabled),
            "autofocus" => Ok(Self::Autofocus),
            "autoraise" => Ok(Self::Autoraise),
            other => Err(format!("unknown focus_follows_mouse mode `{other}`")),
        }
    }
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub focus_follows_mouse: FocusFollowsMouse,
    #[serde(default = "yes")]
    pub mouse_follows_focus: bool,
    #[serde(default = "no")]
    pub window_opacity: bool,
    #[serde(default = "full_opacity")]
    pub active_window_opacity: f32,
    #[serde(default = "full_opacity")]
    pub normal_window_opacity: f32,
    /// Pointer moves closer together than this are dropped.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_mouse_move_throttle")]
    pub mouse_move_throttle: Duration,
    /// Delay before the single retry of a launch whose observation failed.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_observe_retry_delay")]
    pub observe_retry_delay: Duration,
}

fn yes() -> bool { true }
fn no() -> bool { false }
fn full_opacity() -> f32 { 1.0 }
fn default_mouse_move_throttle() -> Duration { Duration::from_millis(35) }
fn default_observe_retry_delay() -> Duration { Duration::from_millis(10) }

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_follows_mouse: FocusFollowsMouse::default(),
            mouse_follows_focus: yes(),
            window_opacity: no(),
            active_window_opacity: full_opacity(),
            normal_window_opacity: full_opacity(),
            mouse_move_throttle: default_mouse_move_throttle(),
            observe_retry_delay: default_observe_retry_delay(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (name, value) in [
            ("active_window_opacity", self.active_window_opacity),
            ("normal_window_opacity", self.normal_window_opacity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                issues.push(format!("{name} must be between 0.0 and 1.0, got {value}"));
            }
        }
        if self.observe_retry_delay.is_zero() {
            issues.push("observe_retry_delay must be greater than zero".to_string());
        }
        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = toml::from_str(buf)?;
        Ok(config)
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}
