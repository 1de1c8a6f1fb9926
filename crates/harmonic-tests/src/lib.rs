//! Integration test crate for Harmonic.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on the project model and the playback controller together.

#[cfg(test)]
mod versioning;

#[cfg(test)]
mod playback;

#[cfg(test)]
mod persistence;
