//! Common types for convenient import.
//!
//! ```
//! use gatehouse_gate::prelude::*;
//! ```

pub use crate::{
    CredentialMode, CredentialResolver, GateEngine, GateEngineBuilder, GateError, GateResult,
    ResolutionMethod, ResolvedIdentity, ScanRequest, Verdict,
};
