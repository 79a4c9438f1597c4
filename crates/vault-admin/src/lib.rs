pub mod domain;
pub mod infra;
pub mod init;
pub mod position;
mod run;

pub use run::{main, run};
