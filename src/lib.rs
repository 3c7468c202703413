//! Read-only telemetry core for an editor session dashboard.
//!
//! Scans the session logs that local AI coding agents (Claude and Codex
//! CLIs) leave on disk, aggregates them into per-project groupings and
//! usage snapshots, and maps the result to host-agnostic tree items and an
//! HTML dashboard. The host editor owns the actual UI surface and the
//! file-watch event loop; this crate owns everything between "directories
//! on disk" and "things to render".
//!
//! Every refresh recomputes all derived data from scratch. Nothing here
//! writes to disk, and a file that cannot be parsed is skipped rather than
//! reported as a failure.

pub mod domain;
pub mod infra;
pub mod view;
