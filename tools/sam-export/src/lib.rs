//! SWF to SAM animation converter
//!
//! Reads a timeline-only SWF (bitmap-rectangle shapes placed, moved and
//! removed on a flat display list), extracts the bitmaps as scaled PNG
//! files and serializes the animation itself as a SAM file.
//!
//! The whole pipeline is one forward pass: [`convert::Session::run`] walks
//! the tag stream into a [`model::Movie`], then [`formats::sam`] commits
//! the byte layout.

pub mod config;
pub mod convert;
pub mod error;
pub mod formats;
pub mod image;
pub mod model;
pub mod shape;
pub mod version;

pub use convert::{Options, Session, Summary};
pub use error::ConvertError;
pub use version::SamVersion;
