//! Typed wrappers around the deployed contracts. Writes return an unsigned,
//! fee-less transaction for the submitter, reads return decoded values.

pub mod fusd;
pub mod price_feed;
pub mod swap;
pub mod token;
pub mod vault;

pub use {
    fusd::Fusd,
    price_feed::PriceFeed,
    swap::{SwapFactory, SwapPair},
    token::Token,
    vault::{AccountVaultBalance, Vault, VaultBalance},
};
