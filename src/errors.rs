//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`EmberError`] covers the recoverable failure modes of
//! the core:
//! - Render device and framebuffer creation failures
//! - Shader source parsing and compilation errors
//! - Pixel readback outside the framebuffer bounds
//!
//! Programmer errors (stale entity ids, begin/end pairing violations, cyclic
//! reparenting) are not represented here; they assert in debug builds and
//! degrade to a log line in release builds.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, EmberError>`.
//!
//! ```rust,ignore
//! use ember::errors::{EmberError, Result};
//!
//! fn create_targets() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Ember engine core.
#[derive(Error, Debug)]
pub enum EmberError {
    // ========================================================================
    // Device & Framebuffer Errors
    // ========================================================================
    /// The render device rejected an operation.
    #[error("Render device error: {0}")]
    Device(String),

    /// Framebuffer creation or resize with unusable dimensions.
    #[error("Invalid framebuffer size: {width}x{height}")]
    InvalidFramebufferSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Pixel readback outside the attachment bounds.
    #[error("Readback at ({x}, {y}) outside framebuffer bounds {width}x{height}")]
    ReadbackOutOfBounds {
        /// Requested x coordinate
        x: u32,
        /// Requested y coordinate
        y: u32,
        /// Attachment width in pixels
        width: u32,
        /// Attachment height in pixels
        height: u32,
    },

    // ========================================================================
    // Shader Errors
    // ========================================================================
    /// Shader source text is missing a required section.
    #[error("Shader '{name}' parse error: {message}")]
    ShaderParse {
        /// Shader name for diagnostics
        name: String,
        /// What was wrong with the source
        message: String,
    },

    /// The device failed to compile or link a shader.
    #[error("Shader '{name}' compile error: {diagnostic}")]
    ShaderCompile {
        /// Shader name for diagnostics
        name: String,
        /// Compiler diagnostic text
        diagnostic: String,
    },

    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// Mesh creation with unusable geometry data.
    #[error("Invalid mesh data: {0}")]
    InvalidMesh(String),
}

/// Convenient result type used throughout the engine.
pub type Result<T> = std::result::Result<T, EmberError>;
