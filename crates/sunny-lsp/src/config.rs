//! Server configuration.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use sunny_analysis::ProcessCompiler;

/// Compiler used when none is configured.
pub const DEFAULT_COMPILER: &str = "sunnyc";

/// How the dispatcher treats messages it cannot handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProtocolPolicy {
    /// Ignore unknown methods and undecodable params without replying.
    #[default]
    Lenient,
    /// Answer unknown requests with `MethodNotFound` and undecodable
    /// params with `InvalidParams`.
    Strict,
}

impl FromStr for ProtocolPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown protocol policy: {other} (expected lenient or strict)")),
        }
    }
}

impl fmt::Display for ProtocolPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lenient => f.write_str("lenient"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

/// How to invoke the sunny compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Compiler executable.
    pub program: PathBuf,
    /// Extra arguments placed before `--export-json <file>`.
    pub args: Vec<OsString>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_COMPILER),
            args: Vec::new(),
        }
    }
}

impl CompilerConfig {
    /// Build the subprocess oracle for this configuration.
    pub fn build(&self) -> ProcessCompiler {
        ProcessCompiler::new(&self.program).with_args(self.args.iter().cloned())
    }
}

/// Everything the server needs to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Compiler invocation.
    pub compiler: CompilerConfig,
    /// Handling of unknown methods and bad params.
    pub protocol: ProtocolPolicy,
}
