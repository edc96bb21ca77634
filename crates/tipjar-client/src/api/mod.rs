//! Off-chain http apis the client talks to.

pub mod directory;
