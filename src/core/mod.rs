//! Core functionalities of this program
//!
//! Including environment assembly, the image/bundle stores, and the
//! package-index collaborator.

pub mod assembler;
pub mod error;
pub mod image;
pub mod manifest;
pub mod packages;
mod profile;
pub mod toolchain;
pub mod variant;
