//! `mesh config init`: write a starting configuration for a provider pool

use crate::cli::ConfigInitArgs;
use crate::config::MeshConfig;
use crate::discovery::endpoint::normalize_endpoint;
use std::fs;

const EXAMPLE_CONFIG: &str = include_str!("../../mesh.example.toml");

/// Seed line in the template that `--seed` replaces.
const TEMPLATE_SEEDS: &str = r#"seeds = ["http://localhost:3001"]"#;

/// Render the template with `seeds` in place of the sample seed.
///
/// Seeds are normalized first; the result is parsed and validated so a bad
/// seed is reported before anything is written.
pub fn render_config(seeds: &[String]) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = if seeds.is_empty() {
        EXAMPLE_CONFIG.to_string()
    } else {
        let seeds = seeds
            .iter()
            .map(|s| normalize_endpoint(s).map(toml::Value::String))
            .collect::<Result<Vec<_>, _>>()?;
        let line = format!("seeds = {}", toml::Value::Array(seeds));
        EXAMPLE_CONFIG.replacen(TEMPLATE_SEEDS, &line, 1)
    };

    let config: MeshConfig = toml::from_str(&rendered)?;
    config.validate()?;
    Ok(rendered)
}

/// Handle `mesh config init`.
pub fn handle_config_init(args: &ConfigInitArgs) -> Result<String, Box<dyn std::error::Error>> {
    if args.output.exists() && !args.force {
        return Err(format!(
            "File already exists: {}. Use --force to overwrite.",
            args.output.display()
        )
        .into());
    }

    let rendered = render_config(&args.seeds)?;
    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, rendered)?;

    let hint = if args.seeds.is_empty() {
        "Edit the seeds and [[providers]] entries to describe your pool."
    } else {
        "Seeds written; add [[providers]] entries for nodes no seed reports."
    };
    Ok(format!(
        "✓ Configuration file created: {}\n  {}",
        args.output.display(),
        hint
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(output: &Path, force: bool, seeds: &[&str]) -> ConfigInitArgs {
        ConfigInitArgs {
            output: output.to_path_buf(),
            force,
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_template_keeps_sample_seed() {
        assert!(EXAMPLE_CONFIG.contains(TEMPLATE_SEEDS));
        let config: MeshConfig = toml::from_str(&render_config(&[]).unwrap()).unwrap();
        assert_eq!(config.discovery.seeds, vec!["http://localhost:3001"]);
    }

    #[test]
    fn test_config_init_with_seeds() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("pool").join("mesh.toml");

        let message = handle_config_init(&args(
            &output_path,
            false,
            &["http://10.0.0.5:3001/", "https://rack-2.local:3001"],
        ))
        .unwrap();
        assert!(message.contains("Seeds written"));

        let config = MeshConfig::load(Some(&output_path)).unwrap();
        assert_eq!(
            config.discovery.seeds,
            vec!["http://10.0.0.5:3001", "https://rack-2.local:3001"]
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_config_init_bad_seed_writes_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("mesh.toml");

        assert!(handle_config_init(&args(&output_path, false, &["ftp://node"])).is_err());
        assert!(!output_path.exists());
    }

    #[test]
    fn test_config_init_no_overwrite() {
        let temp_dir = tempfile::tempdir().unwrap();
        let output_path = temp_dir.path().join("mesh.toml");
        std::fs::write(&output_path, "existing").unwrap();

        assert!(handle_config_init(&args(&output_path, false, &[])).is_err());
        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "existing");

        handle_config_init(&args(&output_path, true, &[])).unwrap();
        let content = std::fs::read_to_string(&output_path).unwrap();
        assert!(content.contains("[discovery]"));
    }
}
