pub mod blockchain;
pub mod cli;
pub mod config;
pub mod confirmation;
pub mod observe;
pub mod oracle;
pub mod submitter;

pub use {
    blockchain::Neo,
    config::Config,
    confirmation::Confirmation,
    oracle::PriceOracle,
    submitter::Submitter,
};
