//! Prompt command handlers

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use super::{LanguagePair, Resolver, Stage, StaticRegistry};
use crate::cli::{PromptAction, PromptArgs};
use crate::config::Config;
use crate::glossary::commands::open_repository;
use crate::glossary::parse_key;

pub async fn run(args: PromptArgs, config: &Config, store: Option<PathBuf>) -> Result<()> {
    match args.action {
        PromptAction::Stages => {
            for stage in Stage::ALL {
                println!("{}", stage);
            }
            Ok(())
        }
        PromptAction::Resolve {
            pair,
            stage,
            args,
            glossary,
        } => resolve(config, store, &pair, &stage, args, glossary).await,
    }
}

pub fn build_registry(config: &Config) -> Result<StaticRegistry> {
    let mut registry = StaticRegistry::builtin();
    if let Some(path) = &config.prompts.templates {
        let count = registry
            .load_overrides(path)
            .context(format!("Failed to load prompt templates: {}", path))?;
        tracing::info!(
            "Loaded {} prompt template overrides from {} ({} modules)",
            count,
            path,
            registry.len()
        );
    }
    Ok(registry)
}

async fn resolve(
    config: &Config,
    store: Option<PathBuf>,
    pair: &str,
    stage: &str,
    args: Vec<String>,
    glossary_key: Option<String>,
) -> Result<()> {
    let pair: LanguagePair = pair.parse()?;
    let stage: Stage = stage.parse()?;

    let glossary = match glossary_key {
        Some(key) => {
            let parsed = parse_key(&key).context(format!("Malformed glossary key: {}", key))?;
            let repo = open_repository(config, store)?;
            let glossary = repo.load_effective(&parsed).await?;
            let text = args.first().map(String::as_str).unwrap_or_default();
            glossary.build_prompt_context(text)
        }
        None => String::new(),
    };

    let resolver = Resolver::new(build_registry(config)?);
    let tier = resolver.explain(&pair, stage).await?;
    let builder = resolver.resolve(&pair, stage).await?;

    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let prompt = builder.build_with_glossary(&pair, &arg_refs, &glossary);

    println!(
        "{}",
        format!(
            "[Prompt] {} {} -> {} ({})",
            pair,
            stage,
            tier,
            tier.registry_path(&pair, stage)
        )
        .green()
    );
    print_section("system", &prompt.system);
    print_section("user", &prompt.user);

    Ok(())
}

fn print_section(name: &str, body: &str) {
    println!("{}", format!("--- {} ---", name).cyan());
    println!("{}", body);
}
