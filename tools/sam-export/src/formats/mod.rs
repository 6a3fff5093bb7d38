//! Output format writers

pub mod sam;
