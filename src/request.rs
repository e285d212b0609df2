use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolStruct;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::contract::{ITokenERC1155, MintDomain, NATIVE_TOKEN};
use crate::error::MintError;

/// Backdating the window tolerates clock skew between client and chain.
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;
/// Forward window bounds relayer exposure if submission is delayed.
pub const DEFAULT_VALIDITY_SECS: u64 = 86400;

const MAX_ROYALTY_BPS: u64 = 10_000;

/// Caller-chosen mint parameters. Everything else on the request (window,
/// uid) is derived at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MintParams {
    pub to: Address,
    pub uri: String,
    pub quantity: U256,
    pub price_per_token: U256,
    pub currency: Address,
    pub token_id: U256,
    pub royalty_recipient: Address,
    pub royalty_bps: U256,
    pub primary_sale_recipient: Address,
}

impl Default for MintParams {
    fn default() -> Self {
        Self {
            to: Address::ZERO,
            uri: String::new(),
            quantity: U256::from(1),
            price_per_token: U256::ZERO,
            currency: NATIVE_TOKEN,
            // 0 asks the contract for a fresh token id
            token_id: U256::ZERO,
            royalty_recipient: Address::ZERO,
            royalty_bps: U256::ZERO,
            primary_sale_recipient: Address::ZERO,
        }
    }
}

impl MintParams {
    pub fn free_mint(to: Address, uri: impl Into<String>) -> Self {
        Self {
            to,
            uri: uri.into(),
            ..Default::default()
        }
    }
}

/// A populated request plus the domain it must be signed under, ready to
/// hand to a typed-data signer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedMint {
    pub request: ITokenERC1155::MintRequest,
    pub domain: MintDomain,
}

impl PreparedMint {
    /// The exact digest a wallet signs for this request.
    pub fn signing_hash(&self) -> B256 {
        self.request.eip712_signing_hash(&self.domain.eip712())
    }

    pub fn to_json(&self) -> eyre::Result<String> {
        Ok(serde_json::to_string(&self)?)
    }

    pub fn from_json(line: String) -> eyre::Result<Self> {
        Ok(serde_json::from_str(&line)?)
    }
}

/// Builds signable mint requests for one contract instance on one chain.
/// Pure data construction; never touches the network.
#[derive(Debug, Clone)]
pub struct MintRequestBuilder {
    chain_id: u64,
    contract: Address,
    clock_skew_secs: u64,
    validity_secs: u64,
}

impl MintRequestBuilder {
    pub fn new(chain_id: u64, contract: Address) -> Self {
        Self {
            chain_id,
            contract,
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            validity_secs: DEFAULT_VALIDITY_SECS,
        }
    }

    pub fn with_window(mut self, clock_skew_secs: u64, validity_secs: u64) -> Self {
        self.clock_skew_secs = clock_skew_secs;
        self.validity_secs = validity_secs;
        self
    }

    pub fn domain(&self) -> MintDomain {
        MintDomain::for_contract(self.chain_id, self.contract)
    }

    pub fn build(&self, params: &MintParams, now_secs: u64) -> Result<PreparedMint, MintError> {
        if params.to == Address::ZERO {
            return Err(MintError::input("recipient address is required"));
        }
        if params.uri.is_empty() {
            return Err(MintError::input("token uri is required"));
        }
        if params.quantity.is_zero() {
            return Err(MintError::input("quantity must be at least 1"));
        }
        if params.royalty_bps > U256::from(MAX_ROYALTY_BPS) {
            return Err(MintError::input(format!(
                "royalty bps {} exceeds {}",
                params.royalty_bps, MAX_ROYALTY_BPS
            )));
        }

        let start = now_secs.saturating_sub(self.clock_skew_secs);
        let end = now_secs.saturating_add(self.validity_secs);

        let request = ITokenERC1155::MintRequest {
            to: params.to,
            royaltyRecipient: params.royalty_recipient,
            royaltyBps: params.royalty_bps,
            primarySaleRecipient: params.primary_sale_recipient,
            tokenId: params.token_id,
            uri: params.uri.clone(),
            quantity: params.quantity,
            pricePerToken: params.price_per_token,
            currency: params.currency,
            validityStartTimestamp: start as u128,
            validityEndTimestamp: end as u128,
            uid: fresh_uid(),
        };

        Ok(PreparedMint {
            request,
            domain: self.domain(),
        })
    }
}

/// 32 bytes of fresh randomness. The contract consumes each uid exactly
/// once; wall-clock-derived values collide under concurrent attempts.
pub fn fresh_uid() -> B256 {
    B256::from(rand::thread_rng().gen::<[u8; 32]>())
}
