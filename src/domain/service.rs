//! 远程访问服务标识与控制动作

use serde::{Deserialize, Serialize};
use std::fmt;

/// 受管理的远程访问服务
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceId {
    #[serde(rename = "rdp")]
    Rdp,
    #[serde(rename = "ssh")]
    Ssh,
    #[serde(rename = "vnc")]
    Vnc,
    #[serde(rename = "native-rdp")]
    NativeRdp,
}

impl ServiceId {
    /// 所有服务，顺序即聚合查询的顺序
    pub const ALL: [ServiceId; 4] = [
        ServiceId::Rdp,
        ServiceId::Ssh,
        ServiceId::Vnc,
        ServiceId::NativeRdp,
    ];

    /// 从请求中的服务名解析（区分大小写）
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rdp" => Some(ServiceId::Rdp),
            "ssh" => Some(ServiceId::Ssh),
            "vnc" => Some(ServiceId::Vnc),
            "native-rdp" => Some(ServiceId::NativeRdp),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServiceId::Rdp => "rdp",
            ServiceId::Ssh => "ssh",
            ServiceId::Vnc => "vnc",
            ServiceId::NativeRdp => "native-rdp",
        }
    }

    /// 对应的控制脚本（位于 LIB_DIR 下）
    pub fn script(&self) -> &'static str {
        match self {
            ServiceId::Rdp => "config_rdp.sh",
            ServiceId::Ssh => "config_ssh.sh",
            ServiceId::Vnc => "config_vnc.sh",
            ServiceId::NativeRdp => "config_native.sh",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 控制动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Status,
    Configure,
    Start,
    Stop,
    Restart,
}

impl Verb {
    /// 脚本识别的动作参数
    pub fn flag(&self) -> &'static str {
        match self {
            Verb::Status => "--status",
            Verb::Configure => "--configure",
            Verb::Start => "--start",
            Verb::Stop => "--stop",
            Verb::Restart => "--restart",
        }
    }

    /// 是否会改变服务状态
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Verb::Status)
    }
}

/// 一次控制操作 (服务, 动作)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlOperation {
    pub service: ServiceId,
    pub verb: Verb,
}

impl ControlOperation {
    pub fn new(service: ServiceId, verb: Verb) -> Self {
        Self { service, verb }
    }
}

impl fmt::Display for ControlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.service, self.verb)
    }
}
