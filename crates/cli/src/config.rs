use std::path::Path;

use anyhow::{bail, Context, Result};
use orchestrator::OrchestratorConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "battle.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn foe(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattlerConfig {
    pub name: String,
    pub side: Side,
    pub hp: u32,
    pub speed: u32,
    pub power: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Milliseconds each strike takes; gives Ctrl-C something to interrupt.
    pub pace_ms: u64,
    pub orchestrator: OrchestratorConfig,
    pub battlers: Vec<BattlerConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        let battler = |name: &str, side, hp, speed, power| BattlerConfig {
            name: name.to_string(),
            side,
            hp,
            speed,
            power,
        };
        Self {
            pace_ms: 0,
            orchestrator: OrchestratorConfig::default().with_max_turns(100),
            battlers: vec![
                battler("knight", Side::Player, 30, 4, 6),
                battler("archer", Side::Player, 18, 9, 4),
                battler("ogre", Side::Opponent, 40, 2, 7),
                battler("goblin", Side::Opponent, 12, 7, 3),
            ],
        }
    }
}

impl SimConfig {
    /// Load from `path`, falling back to defaults when the file does not exist.
    ///
    /// Returns whether the file was found.
    pub async fn load(path: &Path) -> Result<(Self, bool)> {
        if !path.exists() {
            return Ok((Self::default(), false));
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Invalid battle config {}", path.display()))?;
        Ok((config, true))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for side in [Side::Player, Side::Opponent] {
            if !self.battlers.iter().any(|b| b.side == side) {
                bail!("at least one {:?} battler is required", side);
            }
            let power: u64 = self
                .battlers
                .iter()
                .filter(|b| b.side == side)
                .map(|b| u64::from(b.power))
                .sum();
            if power == 0 {
                bail!("{:?} side has no power and can never land a blow", side);
            }
        }
        if let Some(b) = self.battlers.iter().find(|b| b.hp == 0) {
            bail!("battler '{}' starts with 0 hp", b.name);
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        assert_eq!(config.orchestrator.max_turns, Some(100));
    }

    #[test]
    fn test_default_survives_toml() {
        let config = SimConfig::default();
        let parsed = SimConfig::parse(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_parse_roster() {
        let config = SimConfig::parse(
            r#"
            [orchestrator]
            max_turns = 5

            [[battlers]]
            name = "hero"
            side = "player"
            hp = 10
            speed = 3
            power = 4

            [[battlers]]
            name = "slime"
            side = "opponent"
            hp = 5
            speed = 1
            power = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.orchestrator.max_turns, Some(5));
        assert!(config.orchestrator.emit_phase_events);
        assert_eq!(config.pace_ms, 0);
        assert_eq!(config.battlers.len(), 2);
        assert_eq!(config.battlers[1].side, Side::Opponent);
    }

    #[test]
    fn test_rejects_one_sided_roster() {
        let err = SimConfig::parse(
            r#"
            [[battlers]]
            name = "hero"
            side = "player"
            hp = 10
            speed = 3
            power = 4
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Opponent"));
    }

    #[test]
    fn test_rejects_powerless_side() {
        let err = SimConfig::parse(
            r#"
            [[battlers]]
            name = "hero"
            side = "player"
            hp = 10
            speed = 3
            power = 0

            [[battlers]]
            name = "squire"
            side = "player"
            hp = 4
            speed = 1
            power = 0

            [[battlers]]
            name = "slime"
            side = "opponent"
            hp = 5
            speed = 1
            power = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Player side has no power"));

        let mut config = SimConfig::default();
        for b in config.battlers.iter_mut().filter(|b| b.side == Side::Opponent) {
            b.power = 0;
        }
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Opponent side has no power"));
    }

    #[test]
    fn test_rejects_unknown_side() {
        let result = SimConfig::parse(
            r#"
            [[battlers]]
            name = "hero"
            side = "spectator"
            hp = 10
            speed = 3
            power = 4
            "#,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, found) = SimConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE))
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(config, SimConfig::default());
    }

    #[tokio::test]
    async fn test_load_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let mut config = SimConfig::default();
        config.pace_ms = 25;
        std::fs::write(&path, config.to_toml().unwrap()).unwrap();

        let (loaded, found) = SimConfig::load(&path).await.unwrap();
        assert!(found);
        assert_eq!(loaded.pace_ms, 25);
    }

    #[tokio::test]
    async fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "battlers = 3").unwrap();

        let err = SimConfig::load(&path).await.unwrap_err();
        assert!(err.to_string().contains("Invalid battle config"));
    }
}
