//! Common types for convenient import.
//!
//! ```
//! use gatehouse_audit::prelude::*;
//! ```

pub use crate::{
    AuditError, AuditLogger, AuditRecordView, AuditResult, HistoryConfig, HistoryQueryService,
    HistoryScope,
};
