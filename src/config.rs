//! Network configuration keyed by chain ID
//!
//! Contract addresses differ per chain. They are resolved once at startup
//! into a [`NetworkConfig`] and handed to whatever builds the aggregator;
//! the aggregator itself only ever sees a resolved address.
//!
//! Built-in defaults cover the chains the Revest deployment targets. Fantom
//! and the local fork keep the aggregator the fee-claim runs used; every
//! other chain points at the canonical Multicall3 deployment. A JSON document
//! can override or extend them:
//!
//! ```json
//! {
//!   "250": {
//!     "name": "fantom",
//!     "multicall": "0xcA11bde05977b3631167028862bE2a173976CA11",
//!     "weth": "0x21be370d5312f44cb42ce377bc9b8a0cef1a4c83"
//!   }
//! }
//! ```

use std::{collections::HashMap, path::Path};

use alloy::{
    network::Ethereum,
    primitives::{address, Address},
    providers::Provider,
};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

/// Canonical Multicall3 deployment, the default aggregator on every chain
/// without a dedicated entry
pub const MULTICALL3_ADDRESS: Address = address!("cA11bde05977b3631167028862bE2a173976CA11");

/// Aggregator the Fantom fee-claim runs were made against (also used by the
/// local Fantom fork)
pub const FANTOM_MULTICALL_ADDRESS: Address =
    address!("7f6A10218264a22B4309F3896745687E712962a0");

/// Chain ID of a local Hardhat/Anvil node (here: a forked Fantom)
pub const LOCAL_CHAIN_ID: u64 = 31337;

/// Contract addresses for one chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    /// Human-readable network name
    pub name: String,
    /// On-chain aggregator used for batched reads
    #[serde(default = "default_multicall")]
    pub multicall: Address,
    /// Revest address registry
    #[serde(default)]
    pub revest_provider: Option<Address>,
    /// Wrapped native token
    #[serde(default)]
    pub weth: Option<Address>,
    /// Uniswap-style router
    #[serde(default)]
    pub router: Option<Address>,
}

fn default_multicall() -> Address {
    MULTICALL3_ADDRESS
}

fn network(
    name: &str,
    revest_provider: Address,
    weth: Address,
    router: Option<Address>,
) -> NetworkConfig {
    NetworkConfig {
        name: name.to_string(),
        multicall: MULTICALL3_ADDRESS,
        revest_provider: Some(revest_provider),
        weth: Some(weth),
        router,
    }
}

static DEFAULT_NETWORKS: Lazy<HashMap<u64, NetworkConfig>> = Lazy::new(|| {
    let fantom = NetworkConfig {
        multicall: FANTOM_MULTICALL_ADDRESS,
        ..network(
            "fantom",
            address!("e0741aE6a8A6D87A68B7b36973d8740704Fd62B9"),
            address!("21be370d5312f44cb42ce377bc9b8a0cef1a4c83"),
            Some(address!("16327E3FbDaCA3bcF7E38F5Af2599D2DDc33aE52")),
        )
    };
    HashMap::from([
        (
            1,
            network(
                "mainnet",
                address!("D721A90dd7e010c8C5E022cc0100c55aC78E0FC4"),
                address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"),
                Some(address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D")),
            ),
        ),
        (
            4,
            network(
                "rinkeby",
                address!("21744C9A65608645E1b39a4596C39848078C2865"),
                address!("c778417e063141139fce010982780140aa0cd5ab"),
                Some(address!("7a250d5630B4cF539739dF2C5dAcb4c659F2488D")),
            ),
        ),
        (
            137,
            network(
                "polygon",
                address!("C03bB46b3BFD42e6a2bf20aD6Fa660e4Bd3736F8"),
                address!("0d500b1d8e8ef31e21c99d1db9a6444d3adf1270"),
                Some(address!("a5E0829CaCEd8fFDD4De3c43696c57F7D7A678ff")),
            ),
        ),
        (250, fantom.clone()),
        (
            43114,
            network(
                "avalanche",
                address!("64e12fEA089e52A06A7A76028C809159ba4c1b1a"),
                address!("b31f66aa3c1e785363f0875a1b74e27b85fd66c7"),
                Some(address!("E54Ca86531e17Ef3616d22Ca28b0D458b6C89106")),
            ),
        ),
        (
            LOCAL_CHAIN_ID,
            NetworkConfig {
                name: "local".to_string(),
                ..fantom
            },
        ),
    ])
});

/// Registry of per-chain configurations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Networks {
    networks: HashMap<u64, NetworkConfig>,
}

impl Default for Networks {
    fn default() -> Self {
        Self {
            networks: DEFAULT_NETWORKS.clone(),
        }
    }
}

impl Networks {
    /// Registry without any chain
    pub fn empty() -> Self {
        Self {
            networks: HashMap::new(),
        }
    }

    /// Built-in defaults with the entries of a JSON document layered on top
    ///
    /// The document maps decimal chain IDs to [`NetworkConfig`] objects; an
    /// entry replaces the default for its chain entirely.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let overrides: HashMap<u64, NetworkConfig> = serde_json::from_str(json)?;
        let mut networks = Self::default();
        for (chain_id, config) in overrides {
            networks.insert(chain_id, config);
        }
        Ok(networks)
    }

    /// Same as [`Networks::from_json`], reading the document from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn insert(&mut self, chain_id: u64, config: NetworkConfig) -> Option<NetworkConfig> {
        self.networks.insert(chain_id, config)
    }

    pub fn get(&self, chain_id: u64) -> Result<&NetworkConfig, ConfigError> {
        self.networks
            .get(&chain_id)
            .ok_or(ConfigError::UnknownChain(chain_id))
    }

    /// Aggregator address for `chain_id`
    pub fn multicall(&self, chain_id: u64) -> Result<Address, ConfigError> {
        Ok(self.get(chain_id)?.multicall)
    }

    /// Configuration for the chain `provider` is connected to
    pub async fn resolve<P>(&self, provider: &P) -> Result<(u64, &NetworkConfig), ConfigError>
    where
        P: Provider<Ethereum>,
    {
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ConfigError::ChainId(e.to_string()))?;
        let config = self.get(chain_id)?;
        debug!(chain_id, network = %config.name, multicall = %config.multicall, "resolved network");
        Ok((chain_id, config))
    }

    pub fn chain_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.networks.keys().copied()
    }
}

impl NetworkConfig {
    /// Revest registry address, required for deployment flows
    pub fn require_revest_provider(&self, chain_id: u64) -> Result<Address, ConfigError> {
        self.revest_provider.ok_or(ConfigError::MissingAddress {
            chain_id,
            name: "revestProvider",
        })
    }

    pub fn require_weth(&self, chain_id: u64) -> Result<Address, ConfigError> {
        self.weth.ok_or(ConfigError::MissingAddress { chain_id, name: "weth" })
    }
}
