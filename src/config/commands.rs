//! Config command handlers

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::Config;
use crate::cli::{ConfigAction, ConfigArgs};

pub fn run(args: ConfigArgs, store: Option<PathBuf>) -> Result<()> {
    match args.action {
        ConfigAction::Show => show_config(),
        ConfigAction::Init { force } => init_config(force, store),
        ConfigAction::Set { key, value } => set_config(&key, &value),
        ConfigAction::Get { key } => get_config(&key),
        ConfigAction::Path => show_paths(store),
    }
}

fn show_config() -> Result<()> {
    let config = Config::load()?;
    let content = toml::to_string_pretty(&config)?;

    println!("{}", "[Config]".green());
    println!("{}", content);

    Ok(())
}

fn init_config(force: bool, store: Option<PathBuf>) -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    let config = Config::default();
    let saved_path = config.save()?;

    println!("{}", "[Config] Initialized".green());
    println!("  config: {}", saved_path.display());
    println!("  store:  {}", config.store_path(store)?.display());

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    value
        .parse()
        .context(format!("{} expects true or false, got `{}`", key, value))
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => {
            config.general.verbose = parse_flag(key, value)?;
        }
        ["storage", "path"] => {
            config.storage.path = optional(value);
        }
        ["storage", "background"] => {
            config.storage.background = parse_flag(key, value)?;
        }
        ["prompts", "templates"] => {
            config.prompts.templates = optional(value);
        }
        ["translation", "source_lang"] => {
            config.translation.source_lang = value.to_string();
        }
        ["translation", "target_lang"] => {
            config.translation.target_lang = value.to_string();
        }
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    }

    Ok(())
}

fn lookup_setting(config: &Config, key: &str) -> Result<Option<String>> {
    let parts: Vec<&str> = key.split('.').collect();

    let value = match parts.as_slice() {
        ["general", "verbose"] => Some(config.general.verbose.to_string()),
        ["storage", "path"] => config.storage.path.clone(),
        ["storage", "background"] => Some(config.storage.background.to_string()),
        ["prompts", "templates"] => config.prompts.templates.clone(),
        ["translation", "source_lang"] => Some(config.translation.source_lang.clone()),
        ["translation", "target_lang"] => Some(config.translation.target_lang.clone()),
        _ => {
            anyhow::bail!("Unknown config key: {}", key);
        }
    };

    Ok(value)
}

fn set_config(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load()?;
    apply_setting(&mut config, key, value)?;
    config.save()?;
    println!("{}", format!("[Config] Set {} = {}", key, value).green());

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;

    match lookup_setting(&config, key)? {
        Some(v) => println!("{} = {}", key, v),
        None => println!("{} = (not set)", key),
    }

    Ok(())
}

fn show_paths(store: Option<PathBuf>) -> Result<()> {
    let config_path = Config::config_path().context("Could not determine config path")?;
    // An unreadable config still reports where it lives.
    let config = Config::load().unwrap_or_default();
    let store_path = config.store_path(store)?;

    print_path("config", &config_path);
    print_path("store ", &store_path);
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let state = if path.exists() {
        "(exists)".green()
    } else {
        "(not created)".yellow()
    };
    println!("{}: {} {}", label, path.display(), state);
}
