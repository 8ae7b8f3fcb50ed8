//! Non-fatal event reporting for cache and materialization operations.
//!
//! Operations that succeed with a caveat (an overwritten destination, a
//! symlink that fell back to a copy) push a [`Diagnostic`] into a caller-owned
//! [`DiagnosticSink`] instead of writing to a global logger. The caller decides
//! whether to render, persist, or ignore them.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
