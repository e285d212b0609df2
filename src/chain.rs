use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, Bytes, TxKind, B256, U256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::eth::{TransactionInput, TransactionRequest};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::{SolCall, SolEvent};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::contract::ITokenERC1155;
use crate::error::MintError;
use crate::wallet::SignedMintRequest;

pub type ChainProvider = Box<dyn Provider>;

pub static VARIABLE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$\{(.+?)}").unwrap());

/// Connects a provider with the given wallet attached, so
/// `send_transaction` signs locally and broadcasts.
pub async fn connect(url: &str, wallet: EthereumWallet) -> eyre::Result<ChainProvider> {
    if VARIABLE_REGEX.is_match(url) {
        return Err(eyre::eyre!("URL contains variables"));
    }

    let provider = ProviderBuilder::new()
        .with_recommended_fillers()
        .wallet(wallet)
        .on_builtin(url)
        .await?;

    Ok(Box::new(provider))
}

/// Helper function for calling view functions for SolCall types
pub async fn view_contract_call<T>(
    call: T,
    provider: &Arc<ChainProvider>,
    address: Address,
) -> eyre::Result<T::Return>
where
    T: SolCall,
{
    provider
        .call(&TransactionRequest {
            to: Some(TxKind::Call(address)),
            input: TransactionInput::new(Bytes::from(call.abi_encode())),
            ..Default::default()
        })
        .await
        .map_err(|err| eyre::eyre!("Error calling contract: {:?}", err))
        .and_then(|response| {
            T::abi_decode_returns(&response, false)
                .map_err(|err| eyre::eyre!("Error decoding contract response: {:?}", err))
        })
}

/// Handle returned as soon as the mint transaction is broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMint {
    pub chain_id: u64,
    pub tx_hash: B256,
}

/// Terminal state read back from the mint event in the receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedMint {
    pub tx_hash: B256,
    pub token_id: U256,
    pub minted_to: Address,
    pub signer: Address,
}

/// Submits signed mint requests to one contract from a funding account.
/// The signer authorized what gets minted and to whom; the submitter only
/// pays gas and broadcasts, which is what lets users mint without holding
/// gas funds.
pub struct MintSubmitter {
    provider: Arc<ChainProvider>,
    contract: Address,
    chain_id: u64,
    relayer: Address,
}

impl MintSubmitter {
    pub async fn connect(
        rpc_url: &str,
        chain_id: u64,
        contract: Address,
        funding_key: PrivateKeySigner,
    ) -> eyre::Result<Self> {
        let relayer = funding_key.address();
        let provider = connect(rpc_url, EthereumWallet::from(funding_key)).await?;

        tracing::info!(
            relayer = %relayer,
            contract = %contract,
            chain_id = chain_id,
            "connected mint submitter"
        );

        Ok(Self {
            provider: Arc::new(provider),
            contract,
            chain_id,
            relayer,
        })
    }

    pub fn provider(&self) -> Arc<ChainProvider> {
        self.provider.clone()
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn relayer(&self) -> Address {
        self.relayer
    }

    /// Encodes and broadcasts `mintWithSignature` from the funding account.
    /// Returns as soon as the transaction is accepted by the RPC node; the
    /// validity window is enforced by the contract, not here. Retries are
    /// caller policy (a fresh request with a fresh uid).
    pub async fn submit(&self, signed: &SignedMintRequest) -> Result<PendingMint, MintError> {
        // fails before any RPC interaction
        let signature = signed.parse_signature()?;
        let value = signed
            .request
            .native_value()
            .ok_or_else(|| MintError::input("price * quantity overflows"))?;

        let call = ITokenERC1155::mintWithSignatureCall {
            req: signed.request.clone(),
            signature: Bytes::from(signature.as_bytes().to_vec()),
        };

        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.contract)),
            input: TransactionInput::new(Bytes::from(call.abi_encode())),
            value: Some(value),
            ..Default::default()
        };

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|err| MintError::submission(format!("error sending mint: {err:?}")))?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            tx_hash = %tx_hash,
            uid = %signed.request.uid,
            to = %signed.request.to,
            relayer = %self.relayer,
            chain_id = self.chain_id,
            "submitted relayed mint"
        );

        Ok(PendingMint {
            chain_id: self.chain_id,
            tx_hash,
        })
    }

    /// Checks whether a submitted mint has landed. `None` while the
    /// transaction is still pending.
    pub async fn confirm(&self, tx_hash: B256) -> Result<Option<ConfirmedMint>, MintError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|err| MintError::submission(format!("error fetching receipt: {err:?}")))?;

        let Some(receipt) = receipt else {
            return Ok(None);
        };

        if !receipt.status() {
            return Err(MintError::submission(format!(
                "mint transaction {tx_hash} reverted"
            )));
        }

        for log in receipt.inner.logs() {
            if log.address() != self.contract {
                continue;
            }
            if let Ok(event) =
                ITokenERC1155::TokensMintedWithSignature::decode_log_data(log.data(), true)
            {
                return Ok(Some(ConfirmedMint {
                    tx_hash,
                    token_id: event.tokenIdMinted,
                    minted_to: event.mintedTo,
                    signer: event.signer,
                }));
            }
        }

        Err(MintError::submission(format!(
            "mint transaction {tx_hash} succeeded but emitted no mint event"
        )))
    }
}
