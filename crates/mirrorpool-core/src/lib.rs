pub mod config;
pub mod logging;

pub mod checksum;
pub mod coordinator;
pub mod failover;
pub mod pool;
pub mod repo;
pub mod transport;
