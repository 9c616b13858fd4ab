//! Composable structured-logging middleware.
//!
//! `logweave` wraps any [`sink::LogSink`] with attribute/group composition
//! ([`handler::Handler`]), named-logger prefixes, context-scoped attributes
//! ([`context::LogContext`]) and multi-sink fan-out ([`fanout::fanout`]).
//! A [`bridge::BridgeLayer`] feeds `tracing` events into the same chain.

pub mod attrs;
pub mod bridge;
pub mod capture;
pub mod chain;
pub mod context;
pub mod fanout;
pub mod handler;
pub mod level;
pub mod logger;
pub mod noop;
pub mod record;
pub mod sink;
