//! A test framework for validating the ixiatg operator against a live
//! Kubernetes cluster.
//!
//! Test cases drive the external `kne` CLI to bring network-emulation
//! topologies up and down, poll cluster resources through `kubectl` until
//! they converge, and compare the observed resource shapes against expected
//! values.

pub mod client;
pub mod config_map;
pub mod diff;
mod framework;
mod interface;
pub mod kubectl;
mod lock;
pub mod operator;
pub mod pod;
mod resource_file;
pub mod resources;
pub mod service;
pub mod socket;
pub mod template;
pub mod timing;
pub mod topology;
pub mod up_down;
pub mod util;
pub mod wait_for;

pub use framework::Framework;
pub use interface::Interface;
pub use lock::lock;

/// Commonly used result type.
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
