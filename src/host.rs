//! Host protocol: how a schema toolchain discovers and drives the generator.
//!
//! The host spawns the generator, writes one JSON-RPC 2.0 request per line to
//! its stdin and reads one response per line from its stderr.

mod manifest;
mod options;
mod rpc;

pub use manifest::{GeneratorManifest, DEFAULT_OUTPUT, PRETTY_NAME};
pub use options::{EnvValue, GeneratorBlock, GeneratorOptions};
pub use rpc::{
    serve, HostSession, RpcError, RpcRequest, RpcResponse, GENERATION_FAILED, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
