use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use futures::future::join_all;

use crate::chain::{view_contract_call, ChainProvider};
use crate::contract::{ITokenERC1155, MintDomain};
use crate::wallet::SignedMintRequest;

/// Outcome of one preflight check. A check that cannot apply in the
/// current context (no rpc available) ignores rather than guesses.
#[derive(Debug)]
pub enum Evaluation {
    Accept,
    Ignore(String),
    Reject(String),
}

#[derive(Debug)]
pub struct RuleResult {
    pub rule_name: &'static str,
    pub result: eyre::Result<Evaluation>,
}

#[derive(Debug)]
pub struct Results(Vec<RuleResult>);

impl Results {
    pub fn is_accept(&self) -> bool {
        !self.is_reject() && !self.is_err()
    }

    pub fn is_reject(&self) -> bool {
        !self.is_err()
            && self
                .0
                .iter()
                .any(|r| matches!(r.result, Ok(Evaluation::Reject(_))))
    }

    pub fn is_err(&self) -> bool {
        self.0.iter().any(|r| r.result.is_err())
    }

    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|r| match r.result {
                Ok(Evaluation::Accept) => format!("{}: Accept", r.rule_name),
                Ok(Evaluation::Ignore(ref reason)) => {
                    format!("{}: Ignore ({})", r.rule_name, reason)
                }
                Ok(Evaluation::Reject(ref reason)) => {
                    format!("{}: Reject ({})", r.rule_name, reason)
                }
                Err(ref e) => format!("{}: Error ({})", r.rule_name, e),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Everything a check may consult. `chain` is optional so the engine can
/// run fully offline (tests, dry runs); chain-backed checks ignore when it
/// is absent.
#[derive(Clone)]
pub struct RuleContext {
    pub domain: MintDomain,
    pub now_secs: u64,
    pub chain: Option<Arc<ChainProvider>>,
}

impl RuleContext {
    pub fn offline(domain: MintDomain, now_secs: u64) -> Self {
        Self {
            domain,
            now_secs,
            chain: None,
        }
    }
}

#[async_trait]
pub trait Rule: Send + Sync {
    async fn check(
        &self,
        item: SignedMintRequest,
        context: RuleContext,
    ) -> eyre::Result<Evaluation>;
    fn rule_name(&self) -> &'static str;
}

pub struct FnRule<T>(pub &'static str, pub T);

#[async_trait]
impl<T, Fut> Rule for FnRule<T>
where
    T: Fn(SignedMintRequest, RuleContext) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = eyre::Result<Evaluation>> + Send,
{
    async fn check(
        &self,
        item: SignedMintRequest,
        context: RuleContext,
    ) -> eyre::Result<Evaluation> {
        self.1(item, context).await
    }

    fn rule_name(&self) -> &'static str {
        self.0
    }
}

#[macro_export]
macro_rules! rule {
    ($fn:tt) => {
        std::boxed::Box::new($crate::rules::FnRule(stringify!($fn), $fn))
    };
}

pub async fn has_recipient(
    item: SignedMintRequest,
    _context: RuleContext,
) -> eyre::Result<Evaluation> {
    if item.request.to == Address::ZERO {
        Ok(Evaluation::Reject(
            "recipient is the zero address".to_string(),
        ))
    } else {
        Ok(Evaluation::Accept)
    }
}

pub async fn has_quantity(
    item: SignedMintRequest,
    _context: RuleContext,
) -> eyre::Result<Evaluation> {
    if item.request.quantity.is_zero() {
        Ok(Evaluation::Reject("quantity is zero".to_string()))
    } else {
        Ok(Evaluation::Accept)
    }
}

pub async fn royalty_in_bounds(
    item: SignedMintRequest,
    _context: RuleContext,
) -> eyre::Result<Evaluation> {
    if item.request.royaltyBps > U256::from(10_000) {
        Ok(Evaluation::Reject(format!(
            "royalty bps {} exceeds 10000",
            item.request.royaltyBps
        )))
    } else {
        Ok(Evaluation::Accept)
    }
}

/// The chain is the authority on the window, but rejecting an already
/// expired request locally saves a doomed broadcast and its gas.
pub async fn validity_window_open(
    item: SignedMintRequest,
    context: RuleContext,
) -> eyre::Result<Evaluation> {
    let now = context.now_secs as u128;
    if item.request.validityEndTimestamp < now {
        return Ok(Evaluation::Reject("validity window expired".to_string()));
    }
    if item.request.validityStartTimestamp > now {
        return Ok(Evaluation::Reject(
            "validity window not yet open".to_string(),
        ));
    }
    Ok(Evaluation::Accept)
}

pub async fn signature_recovers(
    item: SignedMintRequest,
    context: RuleContext,
) -> eyre::Result<Evaluation> {
    match item.recover_signer(&context.domain) {
        Ok(signer) => {
            tracing::debug!(signer = %signer, uid = %item.request.uid, "recovered mint signer");
            Ok(Evaluation::Accept)
        }
        Err(err) => Ok(Evaluation::Reject(err.to_string())),
    }
}

/// Asks the contract itself whether it would accept the signature. Catches
/// wrong-signer, reused-uid, and expired-window cases before gas is spent.
pub async fn contract_verifies(
    item: SignedMintRequest,
    context: RuleContext,
) -> eyre::Result<Evaluation> {
    let Some(provider) = context.chain.clone() else {
        return Ok(Evaluation::Ignore("no rpc in context".to_string()));
    };

    let signature = match item.parse_signature() {
        Ok(signature) => signature,
        Err(err) => return Ok(Evaluation::Reject(err.to_string())),
    };

    let result = view_contract_call(
        ITokenERC1155::verifyCall {
            req: item.request.clone(),
            signature: Bytes::from(signature.as_bytes().to_vec()),
        },
        &provider,
        context.domain.verifying_contract,
    )
    .await?;

    if result.success {
        Ok(Evaluation::Accept)
    } else {
        Ok(Evaluation::Reject(
            "contract rejects signature (wrong signer, reused uid, or closed window)".to_string(),
        ))
    }
}

pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        RulesEngine { rules: vec![] }
    }

    pub fn new_with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_default_rules();
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn add_default_rules(&mut self) {
        self.add_rule(rule!(has_recipient));
        self.add_rule(rule!(has_quantity));
        self.add_rule(rule!(royalty_in_bounds));
        self.add_rule(rule!(validity_window_open));
        self.add_rule(rule!(signature_recovers));
        self.add_rule(rule!(contract_verifies));
    }

    pub async fn evaluate(&self, item: &SignedMintRequest, context: RuleContext) -> Results {
        let results = join_all(
            self.rules
                .iter()
                .map(|rule| rule.check(item.clone(), context.clone())),
        )
        .await;

        Results(
            self.rules
                .iter()
                .zip(results)
                .map(|(rule, result)| RuleResult {
                    rule_name: rule.rule_name(),
                    result,
                })
                .collect(),
        )
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new_with_default_rules()
    }
}

#[cfg(test)]
mod test {
    use alloy::primitives::Address;

    use crate::request::{MintParams, MintRequestBuilder};
    use crate::wallet::WalletSession;

    use super::*;

    const NOW: u64 = 1_700_000_000;

    fn builder() -> MintRequestBuilder {
        MintRequestBuilder::new(31337, Address::repeat_byte(0x42))
    }

    async fn signed_request(built_at: u64) -> SignedMintRequest {
        let prepared = builder()
            .build(
                &MintParams::free_mint(Address::repeat_byte(0xaa), "ipfs://Qm/0"),
                built_at,
            )
            .unwrap();
        WalletSession::random().sign_mint(&prepared).await.unwrap()
    }

    fn context(now_secs: u64) -> RuleContext {
        RuleContext::offline(builder().domain(), now_secs)
    }

    #[test_log::test(tokio::test)]
    async fn test_accepts_fresh_request() {
        let signed = signed_request(NOW).await;
        let results = RulesEngine::new_with_default_rules()
            .evaluate(&signed, context(NOW))
            .await;

        assert!(results.is_accept(), "{}", results.summary());
    }

    #[test_log::test(tokio::test)]
    async fn test_rejects_expired_window() {
        let signed = signed_request(NOW).await;
        // a week later the 24h window is long gone
        let results = RulesEngine::new_with_default_rules()
            .evaluate(&signed, context(NOW + 7 * 86400))
            .await;

        assert!(results.is_reject());
        assert!(results.summary().contains("validity window expired"));
    }

    #[test_log::test(tokio::test)]
    async fn test_rejects_malformed_signature() {
        let mut signed = signed_request(NOW).await;
        signed.signature = "0xdeadbeef".to_string();

        let results = RulesEngine::new_with_default_rules()
            .evaluate(&signed, context(NOW))
            .await;

        assert!(results.is_reject());
        assert!(results.summary().contains("signature_recovers: Reject"));
    }

    #[test_log::test(tokio::test)]
    async fn test_chain_checks_ignore_offline() {
        let signed = signed_request(NOW).await;
        let results = RulesEngine::new_with_default_rules()
            .evaluate(&signed, context(NOW))
            .await;

        assert!(results.summary().contains("contract_verifies: Ignore"));
    }
}
