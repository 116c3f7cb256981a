pub mod cli;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pubg;
pub mod scheduler;
pub mod server;
pub mod storage;

#[cfg(test)]
pub(crate) mod testing;
