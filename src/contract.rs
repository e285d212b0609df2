use std::borrow::Cow;

use alloy::primitives::{address, Address, U256};
use alloy::sol;
use alloy::sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};

/// Sentinel the contract family uses for "pay in the chain's native currency".
pub static NATIVE_TOKEN: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// EIP-712 domain the signature-mint contracts verify against.
pub const DOMAIN_NAME: &str = "TokenERC1155";
pub const DOMAIN_VERSION: &str = "1";

// Field names, types, and order must match the deployed contract exactly.
// Any drift changes the EIP-712 struct hash and every signature stops
// verifying onchain.
sol! {
    interface ITokenERC1155 {
        #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
        struct MintRequest {
            address to;
            address royaltyRecipient;
            uint256 royaltyBps;
            address primarySaleRecipient;
            uint256 tokenId;
            string uri;
            uint256 quantity;
            uint256 pricePerToken;
            address currency;
            uint128 validityStartTimestamp;
            uint128 validityEndTimestamp;
            bytes32 uid;
        }

        event TokensMintedWithSignature(
            address indexed signer,
            address indexed mintedTo,
            uint256 indexed tokenIdMinted,
            MintRequest mintRequest
        );

        function mintWithSignature(MintRequest calldata req, bytes calldata signature) external payable;

        function verify(MintRequest calldata req, bytes calldata signature)
            external
            view
            returns (bool success, address recoveredSigner);
    }
}

impl ITokenERC1155::MintRequest {
    /// tokenId == 0 asks the contract to mint a fresh token id.
    pub fn mints_new_token(&self) -> bool {
        self.tokenId.is_zero()
    }

    /// Native value the relayer must attach to the transaction.
    /// Zero for ERC20-priced and free mints.
    pub fn native_value(&self) -> Option<U256> {
        if self.currency == NATIVE_TOKEN {
            self.pricePerToken.checked_mul(self.quantity)
        } else {
            Some(U256::ZERO)
        }
    }
}

/// The `{name, version, chainId, verifyingContract}` tuple a mint signature
/// is bound to. Binding to one contract instance and chain is what stops
/// cross-contract and cross-chain replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MintDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl MintDomain {
    pub fn for_contract(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id,
            verifying_contract,
        }
    }

    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain {
            name: Some(Cow::from(self.name.clone())),
            version: Some(Cow::from(self.version.clone())),
            chain_id: Some(U256::from(self.chain_id)),
            verifying_contract: Some(self.verifying_contract),
            salt: None,
        }
    }
}
