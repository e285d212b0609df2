mod common;

use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolEvent};
use mintrelay::contract::ITokenERC1155;
use mintrelay::request::MintParams;
use mintrelay::wallet::WalletSession;

use common::factories::{Factory, MintParamsOptions};
use common::relay_build::{make_builder, now};

#[tokio::test]
async fn test_sign_then_recover_round_trip() {
    let builder = make_builder();
    let wallet = WalletSession::random();

    let params = MintParams::build(MintParamsOptions {
        to: Some(wallet.address()),
        ..Default::default()
    });
    let prepared = builder.build(&params, now()).unwrap();
    let signed = wallet.sign_mint(&prepared).await.unwrap();

    // the identical (domain, struct) pair the wallet signed must recover
    // to the wallet; this is what the contract's verification computes
    let recovered = signed.recover_signer(&prepared.domain).unwrap();
    assert_eq!(recovered, wallet.address());
}

#[tokio::test]
async fn test_tampered_request_breaks_recovery() {
    let builder = make_builder();
    let wallet = WalletSession::random();

    let prepared = builder
        .build(&MintParams::build_default(), now())
        .unwrap();
    let mut signed = wallet.sign_mint(&prepared).await.unwrap();

    // redirect the mint after signing
    signed.request.to = Address::repeat_byte(0x66);

    let recovered = signed.recover_signer(&prepared.domain).unwrap();
    assert_ne!(recovered, wallet.address());
}

#[tokio::test]
async fn test_domain_binds_signature_to_contract() {
    let builder = make_builder();
    let wallet = WalletSession::random();

    let prepared = builder
        .build(&MintParams::build_default(), now())
        .unwrap();
    let signed = wallet.sign_mint(&prepared).await.unwrap();

    let mut other_domain = prepared.domain.clone();
    other_domain.verifying_contract = Address::repeat_byte(0x77);

    let recovered = signed.recover_signer(&other_domain).unwrap();
    assert_ne!(recovered, wallet.address());
}

#[tokio::test]
async fn test_mint_calldata_round_trips() {
    let builder = make_builder();
    let wallet = WalletSession::random();

    let prepared = builder
        .build(&MintParams::build_default(), now())
        .unwrap();
    let signed = wallet.sign_mint(&prepared).await.unwrap();

    let call = ITokenERC1155::mintWithSignatureCall {
        req: signed.request.clone(),
        signature: signed.parse_signature().unwrap().as_bytes().to_vec().into(),
    };

    let encoded = call.abi_encode();
    assert_eq!(
        &encoded[..4],
        &ITokenERC1155::mintWithSignatureCall::SELECTOR[..]
    );

    let decoded = ITokenERC1155::mintWithSignatureCall::abi_decode(&encoded, true).unwrap();
    assert_eq!(decoded.req, signed.request);
    assert_eq!(decoded.signature, call.signature);
}

#[test]
fn test_mint_event_log_decodes() {
    let minted_to = Address::repeat_byte(0xaa);
    let signer = Address::repeat_byte(0xbb);

    let event = ITokenERC1155::TokensMintedWithSignature {
        signer,
        mintedTo: minted_to,
        tokenIdMinted: U256::from(7),
        mintRequest: ITokenERC1155::MintRequest {
            to: minted_to,
            quantity: U256::from(1),
            uri: "ipfs://Qm/0".to_string(),
            ..Default::default()
        },
    };

    let log_data = event.encode_log_data();
    let decoded =
        ITokenERC1155::TokensMintedWithSignature::decode_log_data(&log_data, true).unwrap();

    assert_eq!(decoded.tokenIdMinted, U256::from(7));
    assert_eq!(decoded.mintedTo, minted_to);
    assert_eq!(decoded.signer, signer);
    assert_eq!(decoded.mintRequest.uri, "ipfs://Qm/0");
}

#[tokio::test]
async fn test_signed_request_wire_round_trip() {
    let builder = make_builder();
    let wallet = WalletSession::random();

    let prepared = builder
        .build(&MintParams::build_default(), now())
        .unwrap();
    let signed = wallet.sign_mint(&prepared).await.unwrap();

    let json = signed.to_json().unwrap();
    let back = mintrelay::wallet::SignedMintRequest::from_json(json).unwrap();

    assert_eq!(back, signed);
    assert_eq!(
        back.recover_signer(&prepared.domain).unwrap(),
        wallet.address()
    );
}
