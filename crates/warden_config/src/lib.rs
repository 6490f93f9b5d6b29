//! Configuration and destination persistence shared between warden_cli and warden_host.

use anyhow::{ensure, Context, Result};
use std::path::Path;
use warden_core::{Config, DestinationStore};

pub const CONFIG_FILE: &str = "config.json";
pub const DESTINATIONS_FILE: &str = "destinations.json";

/// Rejects values the dispatcher cannot run with.
///
/// Unknown slot names and policy spellings never get this far: they fail
/// during deserialization.
pub fn validate_config(config: &Config) -> Result<()> {
    let intervals = [
        ("damage-interval-ticks", config.damage_interval_ticks),
        ("countdown-duration-ticks", config.countdown_duration_ticks),
        ("countdown-step-ticks", config.countdown_step_ticks),
        ("poll-interval-ticks", config.poll_interval_ticks),
        ("roster-refresh-ticks", config.roster_refresh_ticks),
    ];
    for (key, value) in intervals {
        ensure!(value > 0, "'{key}' must be at least 1 tick");
    }

    ensure!(
        config.damage_amount.is_finite() && config.damage_amount >= 0.0,
        "'damage-amount' must be a non-negative number, got {}",
        config.damage_amount
    );

    for material in &config.equipment_materials {
        ensure!(
            !material.trim().is_empty(),
            "'equipment-materials' contains an empty entry"
        );
    }

    ensure!(
        !config.chat_bypass_permission.trim().is_empty(),
        "'chat-bypass-permission' must not be empty"
    );
    ensure!(
        !config.update_notify_permission.trim().is_empty(),
        "'update-notify-permission' must not be empty"
    );

    if let Some(url) = &config.release_check_url {
        ensure!(
            url.starts_with("https://") || url.starts_with("http://"),
            "'release-check-url' must be an http(s) URL, got '{url}'"
        );
    }
    Ok(())
}

/// Load and validate `config.json` from `config_dir`.
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join(CONFIG_FILE);
    let config: Config = serde_json::from_str(
        &std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    validate_config(&config).with_context(|| format!("validating {}", path.display()))?;
    Ok(config)
}

/// Like `load_config`, but writes the defaults first when no file exists yet.
pub fn load_or_init_config(config_dir: &Path) -> Result<Config> {
    if !config_dir.join(CONFIG_FILE).exists() {
        save_config(config_dir, &Config::default())?;
    }
    load_config(config_dir)
}

pub fn save_config(config_dir: &Path, config: &Config) -> Result<()> {
    validate_config(config)?;
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let path = config_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config).context("serializing config")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
}

/// Load `destinations.json`. A missing file is an empty store; duplicate
/// names are an error.
pub fn load_destinations(config_dir: &Path) -> Result<DestinationStore> {
    let path = config_dir.join(DESTINATIONS_FILE);
    if !path.exists() {
        return Ok(DestinationStore::new());
    }
    let store: DestinationStore = serde_json::from_str(
        &std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
    )
    .with_context(|| format!("parsing {}", path.display()))?;
    Ok(store)
}

/// Write the store as an ordered array so `FIRST`/`LAST` survive a restart.
pub fn save_destinations(config_dir: &Path, store: &DestinationStore) -> Result<()> {
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let path = config_dir.join(DESTINATIONS_FILE);
    let json = serde_json::to_string_pretty(store).context("serializing destinations")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::test_fixtures::base_config;

    #[test]
    fn test_base_config_passes_validation() {
        validate_config(&base_config()).unwrap();
        validate_config(&Config::default()).unwrap();
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = Config {
            damage_interval_ticks: 0,
            ..base_config()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("damage-interval-ticks"), "{err}");
    }

    #[test]
    fn test_zero_countdown_step_is_rejected() {
        let config = Config {
            countdown_step_ticks: 0,
            ..base_config()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_negative_or_nan_damage_is_rejected() {
        for damage in [-1.0, f64::NAN, f64::INFINITY] {
            let config = Config {
                damage_amount: damage,
                ..base_config()
            };
            assert!(validate_config(&config).is_err(), "{damage}");
        }
    }

    #[test]
    fn test_blank_material_is_rejected() {
        let config = Config {
            equipment_materials: vec!["IRON_HELMET".to_string(), "  ".to_string()],
            ..base_config()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_release_url_must_be_http() {
        let config = Config {
            release_check_url: Some("ftp://example.org/latest".to_string()),
            ..base_config()
        };
        assert!(validate_config(&config).is_err());
    }
}
