//! 服务状态视图
//!
//! 从 status 脚本的 stdout 中解析 `key=value` 或 `key: value` 行。
//! 只有在输出明确给出时才报告 active / inactive，否则为 unknown。

use serde::Serialize;

use super::execution::ExecutionResult;
use super::service::ServiceId;

/// 服务运行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Active,
    Inactive,
    #[default]
    Unknown,
}

impl StatusState {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "active" | "running" => StatusState::Active,
            "inactive" | "stopped" | "dead" => StatusState::Inactive,
            _ => StatusState::Unknown,
        }
    }
}

/// 单个服务的状态摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub service: ServiceId,
    pub status: StatusState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub running: bool,
    pub enabled: bool,
}

impl ServiceStatus {
    pub fn unknown(service: ServiceId) -> Self {
        Self {
            service,
            status: StatusState::Unknown,
            port: None,
            running: false,
            enabled: false,
        }
    }

    /// 从 status 调用结果构建状态视图
    pub fn from_result(service: ServiceId, result: &ExecutionResult) -> Self {
        let mut status = Self::unknown(service);
        let mut running: Option<bool> = None;

        for line in result.stdout.lines() {
            let Some((key, value)) = split_key_value(line) else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                "status" | "state" => status.status = StatusState::parse(value),
                "port" => status.port = value.parse().ok().filter(|p| *p != 0),
                "running" => running = parse_bool(value),
                "enabled" => status.enabled = parse_bool(value).unwrap_or(false),
                _ => {}
            }
        }

        status.running = running.unwrap_or(status.status == StatusState::Active);
        status
    }
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let idx = line.find(['=', ':'])?;
    let key = line[..idx].trim();
    let value = line[idx + 1..].trim().trim_matches('"');
    if key.is_empty() || value.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" | "enabled" => Some(true),
        "false" | "no" | "0" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(stdout: &str) -> ExecutionResult {
        ExecutionResult::exited(0, stdout.to_string(), String::new())
    }

    #[test]
    fn test_parse_full_status() {
        let result = ok("status=active\nport=3389\nenabled=true\n");
        let status = ServiceStatus::from_result(ServiceId::Rdp, &result);
        assert_eq!(status.status, StatusState::Active);
        assert_eq!(status.port, Some(3389));
        assert!(status.running);
        assert!(status.enabled);
    }

    #[test]
    fn test_colon_separator_and_explicit_running() {
        let result = ok("State: inactive\nPort: 22\nRunning: no\nEnabled: disabled\n");
        let status = ServiceStatus::from_result(ServiceId::Ssh, &result);
        assert_eq!(status.status, StatusState::Inactive);
        assert_eq!(status.port, Some(22));
        assert!(!status.running);
        assert!(!status.enabled);
    }

    #[test]
    fn test_unparseable_output_is_unknown() {
        let result = ok("xrdp is probably fine\n");
        let status = ServiceStatus::from_result(ServiceId::Rdp, &result);
        assert_eq!(status, ServiceStatus::unknown(ServiceId::Rdp));
    }

    #[test]
    fn test_spawn_failure_is_unknown() {
        let result = ExecutionResult::failed("No such file or directory");
        let status = ServiceStatus::from_result(ServiceId::Vnc, &result);
        assert_eq!(status.status, StatusState::Unknown);
        assert!(!status.running);
    }

    #[test]
    fn test_garbage_status_value_is_unknown() {
        let result = ok("status=maybe\nport=abc\n");
        let status = ServiceStatus::from_result(ServiceId::NativeRdp, &result);
        assert_eq!(status.status, StatusState::Unknown);
        assert_eq!(status.port, None);
    }

    #[test]
    fn test_serialized_shape() {
        let status = ServiceStatus::from_result(ServiceId::NativeRdp, &ok("status=active\n"));
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["service"], "native-rdp");
        assert_eq!(value["status"], "active");
        assert_eq!(value["running"], true);
        assert!(value.get("port").is_none());
    }
}
