//! Loads level definitions from TOML files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use pathguard_core::LevelConfig;

/// Reads and validates the level at `path`, or returns the built-in demo.
pub(crate) fn load(path: Option<&Path>) -> Result<LevelConfig> {
    let Some(path) = path else {
        tracing::debug!("no level file given, using the demo level");
        return Ok(LevelConfig::demo());
    };

    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    let level = parse(&contents).with_context(|| format!("invalid level file {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        pads = level.pads.len(),
        waves = level.waves.len(),
        "level loaded"
    );
    Ok(level)
}

fn parse(contents: &str) -> Result<LevelConfig> {
    let level: LevelConfig = toml::from_str(contents)?;
    level.validate()?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO_TOML: &str = include_str!("../levels/demo.toml");

    #[test]
    fn shipped_demo_matches_the_built_in_level() {
        let shipped = parse(DEMO_TOML).expect("shipped demo level is valid");
        let built_in = LevelConfig::demo();

        assert_eq!(shipped.save_key, built_in.save_key);
        assert_eq!(shipped.waypoints, built_in.waypoints);
        assert_eq!(shipped.pads.len(), built_in.pads.len());
        assert_eq!(shipped.base.position, built_in.base.position);
        assert_eq!(shipped.waves.len(), built_in.waves.len());
        for (shipped, built_in) in shipped.towers.iter().zip(&built_in.towers) {
            assert_eq!(shipped.kind, built_in.kind);
            assert_eq!(shipped.sell_value(2), built_in.sell_value(2));
        }
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load(Some(Path::new("/nonexistent/level.toml"))).expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/level.toml"));
    }

    #[test]
    fn invalid_levels_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.toml");
        let broken = DEMO_TOML.replace("start_lives = 20", "start_lives = 0");
        fs::write(&path, broken).expect("write level");

        let error = load(Some(path.as_path())).expect_err("zero lives is invalid");
        assert!(format!("{error:#}").contains("invalid level file"));
    }

    #[test]
    fn no_path_falls_back_to_the_demo() {
        let level = load(None).expect("demo level");
        assert_eq!(level.pads.len(), 8);
    }
}
