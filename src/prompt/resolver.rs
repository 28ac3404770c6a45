//! Tiered prompt builder resolution with a per-resolver cache
//!
//! Lookup order for `(pair, stage)`:
//! 1. `<pair>/<stage>`
//! 2. `common/<stage>`, only if it declares both languages
//! 3. `generic/<stage>`
//!
//! The first hit wins; nothing is merged across tiers. Resolved builders are
//! cached under `<pair>:<stage>` until [`Resolver::clear`] is called.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{LanguagePair, PromptBuilder, PromptError, PromptModule, PromptRegistry, Stage, Tier};

type BuilderCache = HashMap<String, Arc<dyn PromptBuilder>>;

pub struct Resolver<R> {
    registry: R,
    cache: Mutex<BuilderCache>,
}

impl<R: PromptRegistry> Resolver<R> {
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the builder for `pair` and `stage`.
    ///
    /// Only the first call per key consults the registry. Two tasks racing
    /// on the same uncached key may both resolve it; either result is kept.
    pub async fn resolve(
        &self,
        pair: &LanguagePair,
        stage: Stage,
    ) -> Result<Arc<dyn PromptBuilder>, PromptError> {
        let cache_key = format!("{}:{}", pair, stage);
        if let Some(builder) = self.cached(&cache_key) {
            return Ok(builder);
        }

        let (tier, builder) = self.select(pair, stage).await?;
        tracing::debug!("Resolved {} prompt builder for {}", tier, cache_key);

        self.lock().insert(cache_key, Arc::clone(&builder));
        Ok(builder)
    }

    /// Report which tier `resolve` would pick, bypassing the cache.
    pub async fn explain(&self, pair: &LanguagePair, stage: Stage) -> Result<Tier, PromptError> {
        self.select(pair, stage).await.map(|(tier, _)| tier)
    }

    /// Drop every cached builder.
    #[allow(dead_code)]
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[cfg(test)]
    pub fn cached_len(&self) -> usize {
        self.lock().len()
    }

    fn cached(&self, cache_key: &str) -> Option<Arc<dyn PromptBuilder>> {
        self.lock().get(cache_key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BuilderCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn select(
        &self,
        pair: &LanguagePair,
        stage: Stage,
    ) -> Result<(Tier, Arc<dyn PromptBuilder>), PromptError> {
        let (tier, module) = self.find_module(pair, stage).await?;
        let builder = module.builder.ok_or_else(|| PromptError::InvalidBuilder {
            path: tier.registry_path(pair, stage),
        })?;
        Ok((tier, builder))
    }

    async fn find_module(
        &self,
        pair: &LanguagePair,
        stage: Stage,
    ) -> Result<(Tier, PromptModule), PromptError> {
        let specific = Tier::Specific.registry_path(pair, stage);
        if let Some(module) = self.registry.lookup(&specific).await {
            return Ok((Tier::Specific, module));
        }

        let common = Tier::Common.registry_path(pair, stage);
        if let Some(module) = self.registry.lookup(&common).await {
            if module.supports(pair) {
                return Ok((Tier::Common, module));
            }
        }

        let generic = Tier::Generic.registry_path(pair, stage);
        match self.registry.lookup(&generic).await {
            Some(module) => Ok((Tier::Generic, module)),
            None => Err(PromptError::BuilderNotFound { stage }),
        }
    }
}
