//! Background task execution for Engram.
//!
//! `TaskPool` is the fire-and-forget boundary between request handling and
//! background work: submissions never block, task errors never escape.

pub mod pool;

pub use pool::TaskPool;
