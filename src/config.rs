//! Relayer configuration: chains, paths, keys and hook commands.
//!
//! Loaded once from a JSON file before anything starts; by the time the
//! scheduler runs, a path has been resolved into a validated pair of chains.

use crate::chain::Chain;
use crate::error::ConfigError;
use crate::strategy::StrategyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default config location.
pub const CONFIG_ENV: &str = "CLIENT_UPDATER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    /// Name of the key used to sign on this chain
    pub key: String,
}

/// One end of a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEnd {
    pub chain_id: String,
    pub client_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    pub src: PathEnd,
    pub dst: PathEnd,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

/// External commands the relayer delegates to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HooksConfig {
    /// Updates one client and prints its remaining validity
    #[serde(default)]
    pub update_client: Vec<String>,
    /// Relays packets for a path until killed
    #[serde(default)]
    pub relay: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `<chain-id>/<key>.json` key files
    pub keys_dir: PathBuf,
    #[serde(default)]
    pub hooks: HooksConfig,
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathConfig>,
}

impl Config {
    /// Config file location: `CLIENT_UPDATER_CONFIG` if set, else `./config.json`.
    pub fn default_path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn path(&self, name: &str) -> Result<&PathConfig, ConfigError> {
        self.paths
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPath(name.to_string()))
    }

    pub fn chain(&self, chain_id: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.chain_id == chain_id)
    }

    /// Resolves a named path into its `(src, dst)` chain handles.
    pub fn chains_from_path(&self, name: &str) -> Result<(Chain, Chain), ConfigError> {
        let path = self.path(name)?;
        let resolve = |end: &PathEnd| {
            self.chain(&end.chain_id)
                .map(|c| Chain::new(&end.chain_id, &end.client_id, &c.key))
                .ok_or_else(|| ConfigError::UnknownChain {
                    path: name.to_string(),
                    chain_id: end.chain_id.clone(),
                })
        };
        Ok((resolve(&path.src)?, resolve(&path.dst)?))
    }

    pub fn key_path(&self, chain: &Chain) -> PathBuf {
        self.keys_dir
            .join(&chain.chain_id)
            .join(format!("{}.json", chain.key))
    }

    /// Checks that a signing key exists for every chain.
    pub fn ensure_keys_exist(&self, chains: &[&Chain]) -> Result<(), ConfigError> {
        for chain in chains {
            let expected = self.key_path(chain);
            if !expected.is_file() {
                return Err(ConfigError::MissingKey {
                    chain_id: chain.chain_id.clone(),
                    key: chain.key.clone(),
                    expected,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "keys_dir": "/tmp/keys",
        "hooks": { "update_client": ["hook", "update"] },
        "chains": [
            { "chain_id": "ibc-0", "key": "alice" },
            { "chain_id": "ibc-1", "key": "bob" }
        ],
        "paths": {
            "demo": {
                "src": { "chain_id": "ibc-0", "client_id": "07-tendermint-0" },
                "dst": { "chain_id": "ibc-1", "client_id": "07-tendermint-1" },
                "strategy": { "type": "naive", "max_msgs": 3 }
            },
            "broken": {
                "src": { "chain_id": "ibc-0", "client_id": "07-tendermint-0" },
                "dst": { "chain_id": "ibc-9", "client_id": "07-tendermint-9" }
            }
        }
    }"#;

    fn sample() -> Config {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = sample();
        assert_eq!(config.chains.len(), 2);
        assert_eq!(config.hooks.update_client, vec!["hook", "update"]);
        assert!(config.hooks.relay.is_empty());
        assert_eq!(config.path("demo").unwrap().strategy.max_msgs, Some(3));
        assert_eq!(
            config.path("broken").unwrap().strategy,
            StrategyConfig::default()
        );
    }

    #[test]
    fn test_chains_from_path() {
        let (src, dst) = sample().chains_from_path("demo").unwrap();
        assert_eq!(src, Chain::new("ibc-0", "07-tendermint-0", "alice"));
        assert_eq!(dst, Chain::new("ibc-1", "07-tendermint-1", "bob"));
    }

    #[test]
    fn test_unknown_path_and_chain() {
        let config = sample();
        assert!(matches!(
            config.chains_from_path("nope"),
            Err(ConfigError::UnknownPath(name)) if name == "nope"
        ));
        assert!(matches!(
            config.chains_from_path("broken"),
            Err(ConfigError::UnknownChain { chain_id, .. }) if chain_id == "ibc-9"
        ));
    }

    #[test]
    fn test_key_path_layout() {
        let config = sample();
        let chain = Chain::new("ibc-0", "07-tendermint-0", "alice");
        assert_eq!(
            config.key_path(&chain),
            PathBuf::from("/tmp/keys/ibc-0/alice.json")
        );
    }
}
