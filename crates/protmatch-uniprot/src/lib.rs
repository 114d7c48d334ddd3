pub mod client;
pub mod protocol;

pub use client::UniProtClient;
pub use protocol::ProteinEntry;
