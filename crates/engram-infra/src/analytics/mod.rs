//! Product analytics implementations.
//!
//! `PostHogSink` implements the `AnalyticsSink` port against a
//! PostHog-compatible `/capture/` endpoint.

pub mod posthog;

pub use posthog::PostHogSink;
