pub mod factories;

pub mod relay_build {
    use alloy::primitives::Address;
    use mintrelay::request::MintRequestBuilder;

    pub const TEST_CHAIN_ID: u64 = 31337;

    pub fn test_contract() -> Address {
        "0x2d5fB2A0ec22A89145aB9FC783df6288f2adc993"
            .parse()
            .unwrap()
    }

    pub fn make_builder() -> MintRequestBuilder {
        MintRequestBuilder::new(TEST_CHAIN_ID, test_contract())
    }

    pub fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }
}
