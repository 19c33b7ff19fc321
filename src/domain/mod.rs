//! 领域模型模块
//!
//! 纯数据结构，不依赖 axum/tokio

pub mod args;
pub mod execution;
pub mod options;
pub mod service;
pub mod status;
pub mod system;

// Re-exports for convenience
pub use args::ArgList;
pub use execution::{
    AggregatedResults, ControlResponse, ExecutionRequest, ExecutionResult, RoutingFailure,
    ServiceMap, Target,
};
pub use options::{NoOptions, RdpMethod, RdpOptions, SshOption, SshOptions, VncOption, VncOptions};
pub use service::{ControlOperation, ServiceId, Verb};
pub use status::{ServiceStatus, StatusState};
pub use system::SystemDetection;
