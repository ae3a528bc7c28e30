use std::{fmt, fs::File, io::BufReader, path::Path, str::FromStr};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::Verdict;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub github: GitHubConfig,
    pub discord: DiscordConfig,
    #[serde(default)]
    pub message: MessageConfig,
}

#[derive(Clone, Deserialize)]
pub struct GitHubConfig {
    pub token: String,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig").field("token", &"***").finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    pub webhook: Url,
    #[serde(default, deserialize_with = "non_empty")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "non_empty")]
    pub avatar_url: Option<String>,
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("webhook", &"***")
            .field("username", &self.username)
            .field("avatar_url", &self.avatar_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub include_details: bool,
    pub colors: Colors,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub success: Color,
    pub failure: Color,
    pub cancelled: Color,
}

impl Default for Colors {
    fn default() -> Self {
        Self { success: Color(0x4CAF50), failure: Color(0xE53935), cancelled: Color(0xFFC107) }
    }
}

impl Colors {
    pub fn for_verdict(&self, verdict: Verdict) -> Color {
        match verdict {
            Verdict::Success => self.success,
            Verdict::Failure => self.failure,
            Verdict::Cancelled => self.cancelled,
        }
    }
}

/// A 24-bit RGB color, written as `#RRGGBB` or bare hex.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "u32")]
pub struct Color(pub u32);

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseColorError {
    #[error("color is empty")]
    Empty,
    #[error("'{0}' is not a hexadecimal color")]
    NotHex(String),
    #[error("'{0}' is larger than #FFFFFF")]
    OutOfRange(String),
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.is_empty() {
            return Err(ParseColorError::Empty);
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseColorError::NotHex(s.to_string()));
        }
        match u32::from_str_radix(hex, 16) {
            Ok(value) if value <= 0xFFFFFF => Ok(Self(value)),
            _ => Err(ParseColorError::OutOfRange(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Color> for u32 {
    fn from(value: Color) -> Self { value.0 }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{:06X}", self.0) }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where D: Deserializer<'de> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Boolean inputs are true only when they read `true`, ignoring case and
/// surrounding whitespace.
pub fn parse_bool_input(value: &str) -> bool { value.trim().eq_ignore_ascii_case("true") }

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = BufReader::new(
            File::open(path)
                .with_context(|| format!("Failed to open config file {}", path.display()))?,
        );
        serde_yaml::from_reader(file)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build the configuration from named string inputs, as a GitHub Action
    /// receives them. `input` returns an empty string for unset inputs.
    pub fn from_inputs(input: impl Fn(&str) -> String) -> Result<Self> {
        let required = |name: &str| -> Result<String> {
            let value = input(name).trim().to_string();
            if value.is_empty() {
                bail!("Input required and not supplied: {name}");
            }
            Ok(value)
        };
        let optional = |name: &str| -> Option<String> {
            let value = input(name).trim().to_string();
            (!value.is_empty()).then_some(value)
        };
        let color = |name: &str, default: Color| -> Result<Color> {
            match optional(name) {
                Some(value) => value.parse().with_context(|| format!("Invalid {name} input")),
                None => Ok(default),
            }
        };

        let token = required("github-token")?;
        let webhook = required("discord-webhook")?;
        let webhook = Url::parse(&webhook).context("Invalid discord-webhook input")?;
        let defaults = Colors::default();
        Ok(Self {
            github: GitHubConfig { token },
            discord: DiscordConfig {
                webhook,
                username: optional("username"),
                avatar_url: optional("avatar-url"),
            },
            message: MessageConfig {
                include_details: parse_bool_input(&input("include-details")),
                colors: Colors {
                    success: color("color-success", defaults.success)?,
                    failure: color("color-failure", defaults.failure)?,
                    cancelled: color("color-cancelled", defaults.cancelled)?,
                },
                title: input("title").trim().to_string(),
                description: input("description").trim().to_string(),
            },
        })
    }

    /// Values that must never appear in logs.
    pub fn secrets(&self) -> [&str; 2] {
        [self.github.token.as_str(), self.discord.webhook.as_str()]
    }
}
