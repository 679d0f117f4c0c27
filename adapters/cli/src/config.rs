//! Optional TOML configuration merged beneath command-line flags.

use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use skirmish_core::{AttackPowers, Faction, DEFAULT_ATTACK_POWER};

/// Settings that may be stored in a configuration file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SkirmishConfig {
    /// Attack power of every elf.
    pub(crate) elf_attack: Option<u32>,
    /// Attack power of every goblin.
    pub(crate) goblin_attack: Option<u32>,
    /// Whether to print a frame after every round.
    pub(crate) show_rounds: bool,
}

impl SkirmishConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        for (faction, power) in [
            (Faction::Elf, config.elf_attack),
            (Faction::Goblin, config.goblin_attack),
        ] {
            ensure!(power != Some(0), "{faction} attack power must be positive");
        }
        Ok(config)
    }

    /// Fails when the file fixes an attack power that a boost search would override.
    pub(crate) fn ensure_boostable(&self) -> Result<()> {
        ensure!(
            self.elf_attack.is_none() && self.goblin_attack.is_none(),
            "--boost searches elf attack power against default goblins; \
             remove elf_attack and goblin_attack from the config"
        );
        Ok(())
    }

    /// Resolves attack powers, preferring explicit flags over file values.
    pub(crate) fn attack_powers(
        &self,
        elf_flag: Option<u32>,
        goblin_flag: Option<u32>,
    ) -> AttackPowers {
        AttackPowers::new(
            elf_flag.or(self.elf_attack).unwrap_or(DEFAULT_ATTACK_POWER),
            goblin_flag.or(self.goblin_attack).unwrap_or(DEFAULT_ATTACK_POWER),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let config = SkirmishConfig::parse("").expect("empty config parses");

        assert_eq!(config, SkirmishConfig::default());
        assert_eq!(config.attack_powers(None, None), AttackPowers::default());
    }

    #[test]
    fn flags_take_precedence_over_file_values() {
        let config =
            SkirmishConfig::parse("elf_attack = 12\ngoblin_attack = 5\nshow_rounds = true")
                .expect("valid config");

        assert!(config.show_rounds);
        assert_eq!(config.attack_powers(None, None), AttackPowers::new(12, 5));
        assert_eq!(config.attack_powers(Some(20), None), AttackPowers::new(20, 5));
    }

    #[test]
    fn zero_attack_power_is_rejected() {
        let error = SkirmishConfig::parse("goblin_attack = 0").expect_err("zero is invalid");

        assert!(error.to_string().contains("goblins attack power"));
    }

    #[test]
    fn boost_refuses_configured_attack_powers() {
        let plain = SkirmishConfig::parse("show_rounds = true").expect("valid config");
        assert!(plain.ensure_boostable().is_ok());

        let goblins = SkirmishConfig::parse("goblin_attack = 5").expect("valid config");
        let error = goblins.ensure_boostable().expect_err("goblin power conflicts");
        assert!(error.to_string().contains("--boost"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(SkirmishConfig::parse("elf_power = 4").is_err());
    }
}
