//! Architecture-specific implementations.
//!
//! This module provides the bare-metal implementations of the `theos_hal` traits.
//! Currently supported: x86_64 without an operating system underneath.

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod x86_64;
