//! Load-generation engine for echobench: per-connection workers driving
//! request/echo cycles, the run orchestrator, and latency aggregation.

pub mod chart;
pub mod config;
pub mod connection;
pub mod runner;
pub mod stats;
pub mod worker;
