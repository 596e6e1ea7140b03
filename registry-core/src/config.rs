//! Configuration for the registry

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Identity of the privileged registrar
    pub registrar: String,

    /// Fee configuration
    pub fees: FeeConfig,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Audit log configuration
    pub audit: AuditConfig,

    /// Resolution policy configuration
    pub policy: PolicyConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "registry-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            registrar: "registrar".to_string(),
            fees: FeeConfig::default(),
            actor: ActorConfig::default(),
            audit: AuditConfig::default(),
            policy: PolicyConfig::default(),
        }
    }
}

/// Fixed fee amounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Fee required to open a verification request
    pub verification_fee: Decimal,

    /// Fee required to open a transfer request
    pub transfer_fee: Decimal,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            verification_fee: Decimal::new(100, 0),
            transfer_fee: Decimal::new(250, 0),
        }
    }
}

/// Single-writer actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorConfig {
    /// Bounded mailbox capacity (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Broadcast channel capacity for live subscribers
    pub broadcast_capacity: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 256,
        }
    }
}

/// Which officials may resolve which requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Require the official's jurisdiction to match the property's
    pub jurisdiction_matching: bool,

    /// With jurisdiction matching on, also require the district to match
    pub match_district: bool,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        // Minimum contract: any active official may resolve any request
        Self {
            jurisdiction_matching: false,
            match_district: true,
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(registrar) = std::env::var("REGISTRY_REGISTRAR") {
            config.registrar = registrar;
        }

        if let Ok(fee) = std::env::var("REGISTRY_VERIFICATION_FEE") {
            config.fees.verification_fee = fee
                .parse()
                .map_err(|e| crate::Error::Config(format!("bad verification fee: {}", e)))?;
        }

        if let Ok(fee) = std::env::var("REGISTRY_TRANSFER_FEE") {
            config.fees.transfer_fee = fee
                .parse()
                .map_err(|e| crate::Error::Config(format!("bad transfer fee: {}", e)))?;
        }

        if let Ok(strict) = std::env::var("REGISTRY_JURISDICTION_MATCHING") {
            config.policy.jurisdiction_matching = strict == "1" || strict == "true";
        }

        Ok(config)
    }
}
