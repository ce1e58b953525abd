// Relay service module

pub mod common;
pub mod error;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod server;
pub mod upstream;

pub use error::RelayError;
pub use server::AxumServer;
