//! Reelsmith: product media studio
//!
//! Engineers a matched pair of studio-photography and cinematic-video prompts for a product,
//! then renders both concurrently with a generative backend while tracking the cycle in an
//! observable state machine.

pub mod assets;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod generation;
pub mod logging;
pub mod provider;
pub mod studio;
pub mod types;
