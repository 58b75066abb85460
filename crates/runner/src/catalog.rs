use std::collections::HashMap;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::RunnerError;
use crate::piston::PistonClient;

/// Known-good runtimes used when the live listing cannot be fetched.
pub const FALLBACK_RUNTIMES: &[(&str, &str)] = &[
    ("javascript", "18.17.0"),
    ("typescript", "5.0.3"),
    ("python", "3.10.0"),
    ("java", "19.0.2"),
    ("cpp", "11.2.0"),
    ("csharp", "6.12.0"),
    ("go", "1.21.0"),
    ("rust", "1.70.0"),
    ("php", "8.2.8"),
    ("ruby", "3.2.2"),
    ("kotlin", "1.9.0"),
    ("swift", "5.9.2"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub source: CatalogSource,
    /// Versions per language, in listing order.
    pub versions: HashMap<String, Vec<String>>,
}

impl Catalog {
    pub fn fallback() -> Self {
        let mut versions: HashMap<String, Vec<String>> = HashMap::new();
        for (lang, version) in FALLBACK_RUNTIMES {
            versions
                .entry((*lang).to_string())
                .or_default()
                .push((*version).to_string());
        }
        Self {
            source: CatalogSource::Fallback,
            versions,
        }
    }

    /// The last listed version is treated as the latest.
    pub fn latest(&self, runtime: &str) -> Option<&str> {
        self.versions.get(runtime)?.last().map(String::as_str)
    }
}

/// Runtime listing fetched at most once per process.
///
/// Only a successful listing is cached, and it is never invalidated. A
/// failed fetch answers from the fallback table and the next call retries.
pub struct RuntimeCatalog {
    cache: OnceCell<Catalog>,
    fallback: Catalog,
}

impl Default for RuntimeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeCatalog {
    pub fn new() -> Self {
        Self {
            cache: OnceCell::new(),
            fallback: Catalog::fallback(),
        }
    }

    /// A catalog that never touches the network.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            cache: OnceCell::new_with(Some(catalog)),
            fallback: Catalog::fallback(),
        }
    }

    pub async fn get(&self, piston: &PistonClient) -> &Catalog {
        let fetched = self
            .cache
            .get_or_try_init(|| async {
                let runtimes = piston.fetch_runtimes().await?;
                let mut versions: HashMap<String, Vec<String>> = HashMap::new();
                for rt in runtimes {
                    versions.entry(rt.language).or_default().push(rt.version);
                }
                info!(languages = versions.len(), "Fetched Piston runtimes");
                Ok::<_, RunnerError>(Catalog {
                    source: CatalogSource::Remote,
                    versions,
                })
            })
            .await;

        match fetched {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Failed to fetch Piston runtimes, using fallback");
                &self.fallback
            }
        }
    }

    pub async fn list_versions(&self, piston: &PistonClient, runtime: &str) -> Vec<String> {
        self.get(piston)
            .await
            .versions
            .get(runtime)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn latest_version(&self, piston: &PistonClient, runtime: &str) -> Option<String> {
        self.get(piston).await.latest(runtime).map(str::to_string)
    }

    /// Languages in the catalog, sorted.
    pub async fn available_languages(&self, piston: &PistonClient) -> Vec<String> {
        let mut langs: Vec<String> = self.get(piston).await.versions.keys().cloned().collect();
        langs.sort();
        langs
    }
}
