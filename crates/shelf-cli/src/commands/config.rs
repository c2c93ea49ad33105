//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "backend_url": config.backend_url,
                    "catalog_url": config.catalog_url,
                    "read_timeout_secs": config.read_timeout_secs,
                    "mutation_timeout_secs": config.mutation_timeout_secs,
                    "remember_login": config.remember_login,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.backend_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:              {}", config.data_dir.display());
            println!("  backend_url:           {}", config.backend_url);
            println!("  catalog_url:           {}", config.catalog_url);
            println!("  read_timeout_secs:     {}", config.read_timeout_secs);
            println!("  mutation_timeout_secs: {}", config.mutation_timeout_secs);
            println!("  remember_login:        {}", config.remember_login);
            println!(
                "  log_file:              {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "backend_url" => {
            if value.is_empty() {
                bail!("backend_url cannot be empty");
            }
            config.backend_url = value.to_string();
        }
        "catalog_url" => {
            if value.is_empty() {
                bail!("catalog_url cannot be empty");
            }
            config.catalog_url = value.to_string();
        }
        "read_timeout_secs" => {
            config.read_timeout_secs = parse_timeout(key, value)?;
        }
        "mutation_timeout_secs" => {
            config.mutation_timeout_secs = parse_timeout(key, value)?;
        }
        "remember_login" => {
            config.remember_login = value
                .parse()
                .context("Invalid value for remember_login. Use 'true' or 'false'.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, backend_url, catalog_url, read_timeout_secs, \
                 mutation_timeout_secs, remember_login, log_file",
                key
            );
        }
    }
    Ok(())
}

fn parse_timeout(key: &str, value: &str) -> Result<u64> {
    let secs: u64 = value
        .parse()
        .with_context(|| format!("Invalid value for {}. Use a number of seconds.", key))?;
    if secs == 0 {
        bail!("{} must be at least 1 second", key);
    }
    Ok(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "backend_url", "https://books.example.com/").unwrap();
        apply(&mut config, "read_timeout_secs", "45").unwrap();
        apply(&mut config, "remember_login", "false").unwrap();
        apply(&mut config, "log_file", "/tmp/shelf.log").unwrap();

        assert_eq!(config.backend_url, "https://books.example.com/");
        assert_eq!(config.read_timeout_secs, 45);
        assert!(!config.remember_login);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/shelf.log")));

        apply(&mut config, "log_file", "none").unwrap();
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply(&mut config, "sync_url", "x").is_err());
        assert!(apply(&mut config, "remember_login", "maybe").is_err());
        assert!(apply(&mut config, "mutation_timeout_secs", "0").is_err());
        assert!(apply(&mut config, "read_timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "backend_url", "").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let data_dir = dir.path().join("data");
        std::fs::write(&path, format!("data_dir = {:?}\n", data_dir)).unwrap();
        let output = Output::new(OutputFormat::Quiet);

        set(
            "catalog_url".to_string(),
            "http://localhost:9000/search.json".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("http://localhost:9000/search.json"));
    }
}
