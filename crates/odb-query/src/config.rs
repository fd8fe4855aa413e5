//! Query builder configuration
//!
//! ```toml
//! rid_policy = "strict"
//!
//! [aliases]
//! "truncate.class" = "truncate.cluster"
//! ```

use crate::error::{QueryError, QueryResult};
use crate::registry::CommandRegistry;
use crate::rid::RidPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// What `truncate` accepts as a record identifier
    pub rid_policy: RidPolicy,
    /// Operation identifier -> identifier whose command it should build
    pub aliases: BTreeMap<String, String>,
}

impl QueryConfig {
    pub fn from_toml_str(input: &str) -> QueryResult<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: impl AsRef<Path>) -> QueryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), aliases = config.aliases.len(), "loaded query config");
        Ok(config)
    }

    /// Apply aliases to `registry`. Aliases resolve against the registry as
    /// it was before any of them were applied.
    pub fn apply(&self, registry: &mut CommandRegistry) -> QueryResult<()> {
        let snapshot = registry.clone();
        for (id, target) in &self.aliases {
            if id == target {
                return Err(QueryError::Config(format!("'{}' is aliased to itself", id)));
            }
            registry.register(id.as_str(), snapshot.resolve(target)?);
        }
        Ok(())
    }
}
