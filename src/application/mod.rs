//! Application layer: collaborators that build and consume node trees
//!
//! File access and configuration-driven construction live here, never in the domain.

pub mod document;
pub mod error;
pub mod error_ext;
pub mod report;
pub mod session;

pub use document::{Delivery, DeliveryLog, ListenerSpec, NodeSpec, TreeDocument};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use report::{
    MarkdownReportBuilder, PdfReportBuilder, ReportBuilder, ReportConfig, ReportError,
    ReportFormat,
};
pub use session::{
    ConnectionConfig, DbSession, EngineKind, MongodbConnectionConfig, SessionConfig,
    SessionError, SessionFactory,
};
