pub mod cli;
pub mod config;
pub mod pretty;
pub mod server;
pub mod session;
pub mod transport;
