//! Scheme-to-provider dispatch

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{ClusterVfsError, Result};
use crate::provider::FileProvider;
use crate::vfs::{ClusterFileSystem, FileName, FileSystemOptions};

/// Filesystem manager - routes URIs to the provider registered for their scheme
#[derive(Default)]
pub struct FileSystemManager {
    providers: RwLock<HashMap<String, Arc<dyn FileProvider>>>,
}

impl FileSystemManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider for one or more schemes.
    ///
    /// Fails without registering anything if any scheme is already taken.
    pub fn add_provider(&self, schemes: &[&str], provider: Arc<dyn FileProvider>) -> Result<()> {
        let mut providers = self.providers.write();

        let schemes: Vec<String> = schemes.iter().map(|s| s.to_ascii_lowercase()).collect();
        if let Some(taken) = schemes.iter().find(|s| providers.contains_key(s.as_str())) {
            return Err(ClusterVfsError::SchemeAlreadyRegistered(taken.clone()));
        }

        for scheme in schemes {
            info!("Registering filesystem provider for scheme {:?}", scheme);
            providers.insert(scheme, provider.clone());
        }
        Ok(())
    }

    /// Registered schemes, sorted
    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.providers.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Parse `uri` and create a filesystem for it
    pub fn resolve(&self, uri: &str, options: &FileSystemOptions) -> Result<(ClusterFileSystem, FileName)> {
        let name = FileName::parse(uri)?;
        let fs = self.create_filesystem(&name, options)?;
        Ok((fs, name))
    }

    /// Create a filesystem for an already parsed name
    pub fn create_filesystem(
        &self,
        name: &FileName,
        options: &FileSystemOptions,
    ) -> Result<ClusterFileSystem> {
        let provider = self
            .providers
            .read()
            .get(&name.scheme)
            .cloned()
            .ok_or_else(|| ClusterVfsError::UnknownScheme(name.scheme.clone()))?;

        debug!("Creating filesystem for {}", name.root_uri());
        provider.create_filesystem(name, options)
    }
}
