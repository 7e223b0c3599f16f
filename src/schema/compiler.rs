//! Protobuf schema compilation.
//!
//! Turns schema source text into the serialized `FileDescriptorProto` of the
//! single file it defines. [`ProtoxCompiler`] needs the source on disk, so
//! every call gets its own scratch directory which is removed before the
//! call returns.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use prost::Message;
use thiserror::Error;

/// File name the source is written to inside the scratch directory.
const SCRATCH_FILE: &str = "schema.proto";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("error creating temp file: {0}")]
    ScratchCreate(#[source] std::io::Error),

    #[error("error writing temp file: {0}")]
    ScratchWrite(#[source] std::io::Error),

    /// Syntax or semantic error; carries the compiler diagnostic.
    #[error("error compiling schema: {0}")]
    Compile(String),

    #[error("error marshalling protobuf file: {0}")]
    Serialize(#[source] prost::EncodeError),

    #[error("error removing temp file: {0}")]
    ScratchRemove(#[source] std::io::Error),

    #[error("compilation task failed: {0}")]
    Interrupted(String),
}

/// Compiles one protobuf source unit into serialized descriptor bytes.
pub trait SchemaCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError>;
}

/// [`SchemaCompiler`] backed by the `protox` compiler.
#[derive(Debug, Clone)]
pub struct ProtoxCompiler {
    scratch_root: PathBuf,
}

impl ProtoxCompiler {
    /// Create a compiler whose scratch directories live under `scratch_root`.
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self { scratch_root: scratch_root.into() }
    }

    pub fn scratch_root(&self) -> &Path {
        &self.scratch_root
    }
}

impl Default for ProtoxCompiler {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl SchemaCompiler for ProtoxCompiler {
    fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        let scratch = tempfile::Builder::new()
            .prefix("schema-")
            .tempdir_in(&self.scratch_root)
            .map_err(CompileError::ScratchCreate)?;

        let compiled = compile_in(scratch.path(), source);
        // A compile failure wins over a failed cleanup.
        let removed = scratch.close().map_err(CompileError::ScratchRemove);
        let bytes = compiled?;
        removed?;
        Ok(bytes)
    }
}

fn compile_in(dir: &Path, source: &str) -> Result<Vec<u8>, CompileError> {
    let path = dir.join(SCRATCH_FILE);
    fs::write(&path, source).map_err(CompileError::ScratchWrite)?;

    // The scratch directory is the only include path: the file can resolve itself
    // and nothing else on disk.
    let mut compiler = protox::Compiler::new([dir]).map_err(|e| CompileError::Compile(e.to_string()))?;
    compiler
        .open_file(&path)
        .map_err(|e| CompileError::Compile(e.to_string()))?;

    let file = compiler
        .file_descriptor_set()
        .file
        .pop()
        .ok_or_else(|| CompileError::Compile("no file descriptor produced".to_string()))?;

    let mut buf = Vec::with_capacity(file.encoded_len());
    file.encode(&mut buf).map_err(CompileError::Serialize)?;
    Ok(buf)
}

/// Compile `source` on the blocking pool and base64-encode the descriptor.
pub async fn encode_schema(compiler: Arc<dyn SchemaCompiler>, source: String) -> Result<String, CompileError> {
    let descriptor = tokio::task::spawn_blocking(move || compiler.compile(&source))
        .await
        .map_err(|e| CompileError::Interrupted(e.to_string()))??;

    Ok(STANDARD.encode(descriptor))
}
