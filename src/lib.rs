#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod board;
pub mod client;
pub mod coord;
pub mod event;
pub mod force;
pub mod game;
pub mod grid;
pub mod network;
pub mod restart;
pub mod role;
pub mod scores;
pub mod server;
pub mod test_util;
