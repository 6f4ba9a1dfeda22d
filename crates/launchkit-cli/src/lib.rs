//! # launchkit-cli
//!
//! **Purpose**: Command-line front end for supervised service launches
//!
//! Wires the declarative launch configuration to the process supervision
//! core: builds argument vectors, drives the start/readiness/stop flow and
//! owns logging initialization.

pub mod commands;
pub mod logging;
