//! Request and response payloads mirroring the llama.cpp server's JSON schema.

pub mod completion;
pub mod embedding;
pub mod props;
pub mod tokenize;

pub use completion::*;
pub use embedding::*;
pub use props::*;
pub use tokenize::*;
