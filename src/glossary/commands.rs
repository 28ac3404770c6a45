//! Glossary command handlers

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Glossary, GlossaryEntry, KeyScope, Repository, build_global_key, build_series_key, parse_key};
use crate::cli::{GlossaryAction, GlossaryArgs, KeyScopeArgs, LanguageArgs};
use crate::config::Config;
use crate::storage::{self, KeyValueStore};
use crate::utils::{ensure_key_segment, truncate_display};

const VALUE_DISPLAY_LEN: usize = 60;

pub type StoreRepository = Repository<Arc<dyn KeyValueStore>>;

pub fn open_repository(config: &Config, store: Option<PathBuf>) -> Result<StoreRepository> {
    let path = config.store_path(store)?;
    let store = storage::open(&path, config.storage.background)
        .context(format!("Failed to open glossary store: {}", path.display()))?;
    Ok(Repository::new(store))
}

pub async fn run(args: GlossaryArgs, config: &Config, store: Option<PathBuf>) -> Result<()> {
    match args.action {
        GlossaryAction::Key { scope } => print_key(scope, config),
        GlossaryAction::Parse { key } => print_parsed(&key),
        GlossaryAction::List { json } => list(&open_repository(config, store)?, json).await,
        GlossaryAction::Show { key, effective } => {
            show(&open_repository(config, store)?, &key, effective).await
        }
        GlossaryAction::Lookup { key, term } => {
            lookup(&open_repository(config, store)?, &key, &term).await
        }
        GlossaryAction::Add { key, terms, value } => {
            add(&open_repository(config, store)?, &key, terms, value).await
        }
        GlossaryAction::Remove { key, term } => {
            remove(&open_repository(config, store)?, &key, &term).await
        }
        GlossaryAction::Delete { key } => delete(&open_repository(config, store)?, &key).await,
        GlossaryAction::Import { key, file } => {
            import(&open_repository(config, store)?, &key, &file).await
        }
        GlossaryAction::Export { key } => export(&open_repository(config, store)?, &key).await,
    }
}

fn languages(args: &LanguageArgs, config: &Config) -> Result<(String, String)> {
    let source = args
        .source
        .clone()
        .unwrap_or_else(|| config.translation.source_lang.clone());
    let target = args
        .target
        .clone()
        .unwrap_or_else(|| config.translation.target_lang.clone());
    ensure_key_segment("source language", &source)?;
    ensure_key_segment("target language", &target)?;
    Ok((source, target))
}

fn print_key(scope: KeyScopeArgs, config: &Config) -> Result<()> {
    let key = match scope {
        KeyScopeArgs::Series(args) => {
            ensure_key_segment("domain", &args.domain)?;
            if args.series.is_empty() {
                anyhow::bail!("series must not be empty");
            }
            let (source, target) = languages(&args.languages, config)?;
            build_series_key(&args.domain, &args.series, &source, &target)
        }
        KeyScopeArgs::Global(args) => {
            let (source, target) = languages(&args, config)?;
            build_global_key(&source, &target)
        }
    };
    println!("{}", key);
    Ok(())
}

fn print_parsed(key: &str) -> Result<()> {
    let parsed = parse_key(key).context(format!("Malformed glossary key: {}", key))?;
    match &parsed.scope {
        KeyScope::Series {
            domain_id,
            series_id,
        } => {
            println!("type:   series");
            println!("domain: {}", domain_id);
            println!("series: {}", series_id);
        }
        KeyScope::Global => println!("type:   global"),
    }
    println!("source: {}", parsed.source_lang);
    println!("target: {}", parsed.target_lang);
    Ok(())
}

fn require_glossary_key(key: &str) -> Result<()> {
    if parse_key(key).is_none() {
        anyhow::bail!(
            "Not a glossary key: {} (build one with `novelgloss glossary key`)",
            key
        );
    }
    Ok(())
}

async fn list(repo: &StoreRepository, json: bool) -> Result<()> {
    let keys = repo.scan_all().await.context("Failed to list glossaries")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&keys)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!("{}", "[WARN] No glossaries stored".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("[Glossary] {} glossar{}", keys.len(), plural(keys.len())).green()
    );
    for key in &keys {
        println!("  {}  {}", key, key.original_key.dimmed());
    }
    Ok(())
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "y" } else { "ies" }
}

fn print_glossary(glossary: &Glossary) {
    for entry in &glossary.entries {
        println!(
            "  {} → {}",
            entry.keys.join(", ").cyan(),
            truncate_display(&entry.value, VALUE_DISPLAY_LEN)
        );
    }
}

async fn show(repo: &StoreRepository, key: &str, effective: bool) -> Result<()> {
    let loaded = if effective {
        let parsed = parse_key(key).context(format!("Malformed glossary key: {}", key))?;
        repo.load_effective(&parsed).await
    } else {
        repo.load(key).await
    };
    let glossary = loaded.context(format!("Failed to load glossary: {}", key))?;

    println!(
        "{}",
        format!("[Glossary] {} ({} entries)", key, glossary.len()).green()
    );
    if glossary.is_empty() {
        println!("{}", "  (empty)".dimmed());
    }
    print_glossary(&glossary);
    Ok(())
}

async fn lookup(repo: &StoreRepository, key: &str, term: &str) -> Result<()> {
    let parsed = parse_key(key).context(format!("Malformed glossary key: {}", key))?;
    let glossary = repo.load_effective(&parsed).await?;
    match glossary.lookup(term) {
        Some(entry) => {
            println!("{} → {}", entry.keys.join(", ").cyan(), entry.value);
            Ok(())
        }
        None => anyhow::bail!("Term not found in {}: {}", key, term),
    }
}

async fn add(repo: &StoreRepository, key: &str, terms: Vec<String>, value: String) -> Result<()> {
    require_glossary_key(key)?;

    if terms.iter().all(|t| t.trim().is_empty()) {
        anyhow::bail!("No usable terms given");
    }

    let mut glossary = repo.load(key).await?;
    glossary.upsert(GlossaryEntry::new(terms.iter().map(String::as_str), value.as_str()));
    repo.save(key, &glossary)
        .await
        .context(format!("Failed to save glossary: {}", key))?;

    println!(
        "{}",
        format!("[OK] {} → {} ({} entries)", terms.join(", "), value, glossary.len()).green()
    );
    Ok(())
}

async fn remove(repo: &StoreRepository, key: &str, term: &str) -> Result<()> {
    let mut glossary = repo.load(key).await?;
    if glossary.remove_term(term) == 0 {
        println!(
            "{}",
            format!("[WARN] Term not found in {}: {}", key, term).yellow()
        );
        return Ok(());
    }
    repo.save(key, &glossary)
        .await
        .context(format!("Failed to save glossary: {}", key))?;
    println!("{}", format!("[OK] Removed {} from {}", term, key).green());
    Ok(())
}

async fn delete(repo: &StoreRepository, key: &str) -> Result<()> {
    repo.delete(key)
        .await
        .context(format!("Failed to delete glossary: {}", key))?;
    println!("{}", format!("[OK] Deleted {}", key).green());
    Ok(())
}

async fn import(repo: &StoreRepository, key: &str, file: &Path) -> Result<()> {
    require_glossary_key(key)?;

    let content = fs::read_to_string(file)
        .context(format!("Failed to read glossary file: {}", file.display()))?;

    let is_json = file.extension().is_some_and(|ext| ext == "json")
        || content.trim_start().starts_with('{');

    let glossary = if is_json {
        let payload: serde_json::Value =
            serde_json::from_str(&content).context("Failed to parse glossary JSON")?;
        repo.save_raw(key, payload).await?
    } else {
        let glossary = Glossary::from_lines(&content);
        repo.save(key, &glossary).await?;
        glossary
    };

    println!(
        "{}",
        format!("[OK] Imported {} entries into {}", glossary.len(), key).green()
    );
    Ok(())
}

async fn export(repo: &StoreRepository, key: &str) -> Result<()> {
    let glossary = repo.load(key).await?;
    println!("{}", serde_json::to_string_pretty(&glossary)?);
    Ok(())
}
