//! Schema handling subsystem.
//!
//! # Data Flow
//! ```text
//! Buffered registry response (JSON object)
//!     → classifier.rs (PROTOBUF envelope with a string schema?)
//!     → compiler.rs (scratch dir → protox → FileDescriptorProto → base64)
//!     → `schema` field replaced, envelope re-encoded by the pipeline
//! ```
//!
//! # Design Decisions
//! - Compilation sits behind the `SchemaCompiler` trait so the pipeline does
//!   not care whether the compiler needs a file, a stream or a buffer
//! - Nothing is cached; each request compiles from scratch

pub mod classifier;
pub mod compiler;

pub use classifier::{classify, Classification};
pub use compiler::{encode_schema, CompileError, ProtoxCompiler, SchemaCompiler};
