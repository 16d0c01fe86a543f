#![forbid(unsafe_code)]

pub mod adapter;
pub mod health;
pub mod ingress_util;
pub mod server;
pub mod telemetry;

pub use server::{HostServer, ServerState, router};
