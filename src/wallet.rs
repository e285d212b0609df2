use alloy::hex;
use alloy::primitives::{Address, Signature};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use alloy::sol_types::SolStruct;
use serde::{Deserialize, Serialize};

use crate::contract::{ITokenERC1155, MintDomain};
use crate::error::MintError;
use crate::request::PreparedMint;

/// An explicit signing session standing in for a connected wallet. Passed
/// to whoever needs a signature instead of living in ambient global state;
/// the session never pays gas.
#[derive(Debug, Clone)]
pub struct WalletSession {
    signer: PrivateKeySigner,
}

impl WalletSession {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    /// Throwaway session, useful for free mints and tests.
    pub fn random() -> Self {
        Self::new(PrivateKeySigner::random())
    }

    pub fn from_hex(key: &str) -> Result<Self, MintError> {
        key.parse::<PrivateKeySigner>()
            .map(Self::new)
            .map_err(|err| MintError::wallet(format!("invalid signing key: {err}")))
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Signs the exact struct and domain the builder produced. Any
    /// re-encoding between here and submission invalidates the signature.
    pub async fn sign_mint(&self, prepared: &PreparedMint) -> Result<SignedMintRequest, MintError> {
        let signature = self
            .signer
            .sign_typed_data::<ITokenERC1155::MintRequest>(
                &prepared.request,
                &prepared.domain.eip712(),
            )
            .await
            .map_err(|err| MintError::wallet(err.to_string()))?;

        tracing::debug!(
            signer = %self.address(),
            uid = %prepared.request.uid,
            "signed mint request"
        );

        Ok(SignedMintRequest {
            request: prepared.request.clone(),
            signature: hex::encode_prefixed(signature.as_bytes()),
        })
    }
}

/// A mint request plus the authorizing signature, ready to relay. This is
/// the wire type clients POST to the relay API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedMintRequest {
    pub request: ITokenERC1155::MintRequest,
    pub signature: String,
}

impl SignedMintRequest {
    pub fn parse_signature(&self) -> Result<Signature, MintError> {
        let bytes = hex::decode(&self.signature)
            .map_err(|err| MintError::input(format!("signature is not valid hex: {err}")))?;
        Signature::try_from(bytes.as_slice())
            .map_err(|err| MintError::input(format!("malformed signature: {err}")))
    }

    /// Recovers the address that signed this request under `domain`.
    /// The local equivalent of the contract's signature check.
    pub fn recover_signer(&self, domain: &MintDomain) -> Result<Address, MintError> {
        let signature = self.parse_signature()?;
        let hash = self.request.eip712_signing_hash(&domain.eip712());
        signature
            .recover_address_from_prehash(&hash)
            .map_err(|err| MintError::input(format!("signature does not recover: {err}")))
    }

    pub fn to_json(&self) -> eyre::Result<String> {
        Ok(serde_json::to_string(&self)?)
    }

    pub fn from_json(line: String) -> eyre::Result<Self> {
        Ok(serde_json::from_str(&line)?)
    }
}
