pub mod constants;
pub mod dataset;
pub mod engine;
pub mod reward_store;
pub mod rng;
pub mod server_utils;
pub mod session_protocol;
pub mod theme;
pub mod types;
pub mod world;
