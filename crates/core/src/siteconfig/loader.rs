use crate::error::{Result, ThreatscopeError};
use crate::siteconfig::directives::SelectorConfig;
use crate::siteconfig::parser::ConfigParser;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Finds, merges and caches per-domain selector configs.
///
/// Files are named after the domain (`example.com.txt`, `.example.com.txt`
/// for the domain and its subdomains, or `example.com.json`). The custom
/// directory takes priority over the standard one, and more specific names
/// over parent domains.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    custom_dir: Option<PathBuf>,
    standard_dir: Option<PathBuf>,
    cache: HashMap<String, SelectorConfig>,
}

impl ConfigLoader {
    /// Create a loader with no directories
    pub fn new() -> Self {
        Self { custom_dir: None, standard_dir: None, cache: HashMap::new() }
    }

    /// Load configuration for a URL
    pub fn load_for_url(&mut self, url: &str) -> Result<SelectorConfig> {
        let domain = extract_domain(url)?;
        self.load_for_domain(&domain)
    }

    /// Load configuration for a domain. Unreadable files are logged and
    /// skipped; no files at all yields an empty config.
    pub fn load_for_domain(&mut self, domain: &str) -> Result<SelectorConfig> {
        let domain = domain.to_lowercase();
        if let Some(config) = self.cache.get(&domain) {
            return Ok(config.clone());
        }

        let mut merged = SelectorConfig::new();

        for file_path in self.find_config_files(&domain) {
            match ConfigParser::parse_file(&file_path) {
                Ok(config) => {
                    tracing::debug!(path = %file_path.display(), "loaded selector config");
                    merged.merge(&config);
                }
                Err(e) => tracing::warn!(path = %file_path.display(), error = %e, "skipping selector config"),
            }
        }

        self.cache.insert(domain, merged.clone());
        Ok(merged)
    }

    /// All existing config files for a domain, highest priority first.
    fn find_config_files(&self, domain: &str) -> Vec<PathBuf> {
        let names = generate_config_names(domain);
        let mut files = Vec::new();

        for dir in [&self.custom_dir, &self.standard_dir].into_iter().flatten() {
            for name in &names {
                let path = dir.join(name);
                if path.is_file() && !files.contains(&path) {
                    files.push(path);
                }
            }
        }

        files
    }

    /// Clear the config cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached domains
    pub fn cached_domains(&self) -> usize {
        self.cache.len()
    }
}

/// Candidate file names for a domain, most specific first.
fn generate_config_names(domain: &str) -> Vec<String> {
    let mut hosts = vec![domain.to_string()];

    if let Some(without_www) = domain.strip_prefix("www.") {
        hosts.push(without_www.to_string());
    }

    let parts: Vec<&str> = domain.split('.').collect();
    for i in 1..parts.len().saturating_sub(1) {
        let parent = parts[i..].join(".");
        if !hosts.contains(&parent) {
            hosts.push(parent);
        }
    }

    let mut names = Vec::new();
    for host in &hosts {
        names.push(format!("{}.txt", host));
        names.push(format!("{}.json", host));
        names.push(format!(".{}.txt", host));
    }
    names
}

/// Host part of a URL
fn extract_domain(url: &str) -> Result<String> {
    let url = url::Url::parse(url).map_err(|e| ThreatscopeError::InvalidUrl(e.to_string()))?;

    url.host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| ThreatscopeError::InvalidUrl("No domain found in URL".to_string()))
}

/// Builder for ConfigLoader
#[derive(Debug, Default)]
pub struct ConfigLoaderBuilder {
    custom_dir: Option<PathBuf>,
    standard_dir: Option<PathBuf>,
}

impl ConfigLoaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom config directory
    pub fn custom_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.custom_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set standard config directory
    pub fn standard_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.standard_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> ConfigLoader {
        ConfigLoader { custom_dir: self.custom_dir, standard_dir: self.standard_dir, cache: HashMap::new() }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        let mut builder = ConfigLoaderBuilder::new();

        if let Some(custom_dir) = Self::default_custom_dir() {
            builder = builder.custom_dir(custom_dir);
        }

        if let Some(standard_dir) = Self::default_standard_dir() {
            builder = builder.standard_dir(standard_dir);
        }

        builder.build()
    }
}

impl ConfigLoader {
    /// Default custom config directory (`~/.config/threatscope/sites`)
    pub fn default_custom_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("threatscope").join("sites"))
    }

    /// Bundled configs next to the working directory, if present
    fn default_standard_dir() -> Option<PathBuf> {
        let std_dir = PathBuf::from("site_configs");
        if std_dir.is_dir() { Some(std_dir) } else { None }
    }
}
