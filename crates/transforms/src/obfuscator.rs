use crate::blacklist::{Blacklist, ConstBlacklist};
use crate::literals::{FileReport, LiteralCounts, LiteralObfuscator, Replacement};
use crate::strategy::StrategyPool;
use crate::Result;
use litmask_core::ast::File;
use litmask_core::seed::Seed;
use litmask_core::types::TypeOracle;
use litmask_core::Package;
use serde::{Deserialize, Serialize};

/// Configuration for the obfuscation pipeline
#[derive(Debug, Default)]
pub struct ObfuscationConfig {
    /// Seed for the run. When unset, the seed is derived from the content of the files so
    /// identical input always produces identical output.
    pub seed: Option<Seed>,
    /// Strategies to pick decode routines from
    pub strategies: StrategyPool,
}

impl ObfuscationConfig {
    /// Create config with a specific seed
    pub fn with_seed(seed: Seed) -> Self {
        Self {
            seed: Some(seed),
            strategies: StrategyPool::default(),
        }
    }

    /// Replaces the strategy pool.
    pub fn strategies(mut self, strategies: StrategyPool) -> Self {
        self.strategies = strategies;
        self
    }

    /// The explicit seed, or the content seed of `files`.
    pub fn resolve_seed(&self, files: &[File]) -> Result<Seed> {
        match &self.seed {
            Some(seed) => Ok(seed.clone()),
            None => {
                let content = serde_json::to_vec(files).map_err(litmask_core::Error::from)?;
                Ok(Seed::from_content(&content))
            }
        }
    }
}

/// Result of the obfuscation pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObfuscationReport {
    /// Hash of the seed used; the seed itself is never reported
    pub seed_hash: String,
    /// Literal totals across all files
    pub totals: LiteralCounts,
    /// `const` blocks demoted across all files
    pub demoted: usize,
    pub files: Vec<FileReport>,
}

impl ObfuscationReport {
    /// Every replacement, in file order.
    pub fn replacements(&self) -> impl Iterator<Item = &Replacement> {
        self.files.iter().flat_map(|file| file.replacements.iter())
    }
}

/// Rewrites the literals of `files` one file at a time.
///
/// Either every file is rewritten or, on error, none is.
pub fn obfuscate_literals<O: TypeOracle + ?Sized>(
    files: &mut [File],
    oracle: &O,
    blacklist: &Blacklist,
    config: &ObfuscationConfig,
) -> Result<ObfuscationReport> {
    let seed = config.resolve_seed(files)?;
    let mut rng = seed.create_deterministic_rng();

    tracing::debug!("Starting literal obfuscation:");
    tracing::debug!("  Files: {}", files.len());
    tracing::debug!("  Blacklisted objects: {}", blacklist.len());
    tracing::debug!("  Strategies: {:?}", config.strategies.names());
    tracing::debug!("  Seed hash: {}", seed.hash_hex());

    let mut staged = files.to_vec();
    let mut report = ObfuscationReport {
        seed_hash: seed.hash_hex(),
        ..ObfuscationReport::default()
    };

    let mut obfuscator = LiteralObfuscator::new(oracle, blacklist, &config.strategies, &mut rng);
    for file in &mut staged {
        let file_report = obfuscator.obfuscate_file(file)?;
        report.totals.add(&file_report.counts());
        report.demoted += file_report.demoted;
        report.files.push(file_report);
    }

    for (dst, src) in files.iter_mut().zip(staged) {
        *dst = src;
    }

    tracing::info!(
        "obfuscated {} literals in {} files ({} const blocks demoted)",
        report.totals.total(),
        report.files.len(),
        report.demoted
    );
    Ok(report)
}

/// Builds the blacklist for `package` and rewrites its files in place.
pub fn obfuscate_package(
    package: &mut Package,
    config: &ObfuscationConfig,
) -> Result<ObfuscationReport> {
    let blacklist = ConstBlacklist::collect(&package.files, &package.info);
    obfuscate_literals(&mut package.files, &package.info, &blacklist, config)
}
