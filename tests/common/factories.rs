use alloy::primitives::{Address, U256};
use mintrelay::request::MintParams;
use rand::Rng;

pub trait Factory<O>
where
    Self: Sized,
    O: Default,
{
    fn build(options: O) -> Self;
    fn build_default() -> Self {
        Self::build(O::default())
    }
}

#[derive(Default)]
pub struct MintParamsOptions {
    pub to: Option<Address>,
    pub uri: Option<String>,
    pub quantity: Option<U256>,
    pub price_per_token: Option<U256>,
}

impl Factory<MintParamsOptions> for MintParams {
    fn build(options: MintParamsOptions) -> Self {
        let mut rng = rand::thread_rng();

        MintParams {
            to: options.to.unwrap_or(Address::from(rng.gen::<[u8; 20]>())),
            uri: options
                .uri
                .unwrap_or("ipfs://QmZ6tafpm1kUBMeAkpYd8eEokfHcxyYstE8KNq2vnhrCtk/0".to_string()),
            quantity: options.quantity.unwrap_or(U256::from(1)),
            price_per_token: options.price_per_token.unwrap_or(U256::ZERO),
            ..Default::default()
        }
    }
}
