use std::fmt;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "CHAIN_ID")]
    pub chain_id: u64,

    #[envconfig(from = "RPC_URL")]
    pub rpc_url: String,

    #[envconfig(from = "CONTRACT_ADDRESS")]
    pub contract_address: String,

    // Funding key for the relayer. Lives server-side only; never ships to
    // clients and never appears in logs.
    #[envconfig(from = "RELAYER_PRIVATE_KEY")]
    pub relayer_private_key: String,

    #[envconfig(from = "API_PORT", default = "7777")]
    pub api_port: u64,

    #[envconfig(from = "CONNECT_EXTERNAL", default = "true")]
    pub connect_external: bool,

    #[envconfig(from = "CLOCK_SKEW_SECS", default = "60")]
    pub clock_skew_secs: u64,

    #[envconfig(from = "VALIDITY_WINDOW_SECS", default = "86400")]
    pub validity_window_secs: u64,

    // Ask the contract to verify each signature before relaying it.
    // Costs one extra RPC round-trip per mint.
    #[envconfig(from = "PREFLIGHT_ONCHAIN_VERIFY", default = "true")]
    pub preflight_onchain_verify: bool,
}

impl Config {
    pub fn test_default() -> Self {
        Config {
            chain_id: 31337,
            rpc_url: "http://localhost:8545".to_string(),
            contract_address: "0x2d5fB2A0ec22A89145aB9FC783df6288f2adc993".to_string(),
            // anvil dev account 0
            relayer_private_key:
                "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80".to_string(),
            api_port: 0,
            connect_external: false,
            clock_skew_secs: 60,
            validity_window_secs: 86400,
            preflight_onchain_verify: false,
        }
    }

    pub fn initial_network_ip(&self) -> String {
        if self.connect_external {
            "0.0.0.0".to_string()
        } else {
            "127.0.0.1".to_string()
        }
    }

    pub fn contract_address(&self) -> eyre::Result<Address> {
        self.contract_address
            .parse()
            .map_err(|err| eyre::eyre!("invalid CONTRACT_ADDRESS: {err}"))
    }

    pub fn relayer_signer(&self) -> eyre::Result<PrivateKeySigner> {
        self.relayer_private_key
            .parse()
            .map_err(|err| eyre::eyre!("invalid RELAYER_PRIVATE_KEY: {err}"))
    }

    pub fn validate(self) -> Self {
        url::Url::parse(&self.rpc_url).expect("RPC_URL is not a valid URL");
        self.contract_address()
            .expect("CONTRACT_ADDRESS is not a valid address");
        self.relayer_signer()
            .expect("RELAYER_PRIVATE_KEY is not a valid key");
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("chain_id", &self.chain_id)
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("relayer_private_key", &"<redacted>")
            .field("api_port", &self.api_port)
            .field("connect_external", &self.connect_external)
            .field("clock_skew_secs", &self.clock_skew_secs)
            .field("validity_window_secs", &self.validity_window_secs)
            .field("preflight_onchain_verify", &self.preflight_onchain_verify)
            .finish()
    }
}

pub fn init() -> Config {
    Config::init_from_env()
        .expect("Failed to load config")
        .validate()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let config = Config::test_default();

        assert_eq!(
            config.contract_address().unwrap(),
            "0x2d5fB2A0ec22A89145aB9FC783df6288f2adc993"
                .parse::<Address>()
                .unwrap()
        );
        // anvil account 0
        assert_eq!(
            config.relayer_signer().unwrap().address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_network_ip_follows_connect_external() {
        let mut config = Config::test_default();
        assert_eq!(config.initial_network_ip(), "127.0.0.1");

        config.connect_external = true;
        assert_eq!(config.initial_network_ip(), "0.0.0.0");
    }

    #[test]
    fn test_debug_redacts_funding_key() {
        let config = Config::test_default();
        let printed = format!("{:?}", config);

        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("ac0974bec39a17e36"));
    }
}
