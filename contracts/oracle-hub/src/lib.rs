pub mod aggregate;
pub mod config;
pub mod contract;
pub mod error;
pub mod feeds;
pub mod msg;
pub mod query;
pub mod registry;
pub mod reputation;
pub mod rounds;
pub mod slashing;
pub mod state;
