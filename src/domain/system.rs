//! 系统探测结果

use serde::Serialize;

/// 探测脚本：加载 LIB_DIR 下的探测函数并输出一行 `OS:.. DE:.. SESSION:..`
pub const DETECT_SNIPPET: &str = r#"
source "$LIB_DIR/utils.sh" 2>/dev/null || true
source "$LIB_DIR/detect_os.sh" 2>/dev/null || true
source "$LIB_DIR/detect_de.sh" 2>/dev/null || true

detect_os
detect_de
detect_session_type
echo "OS:$SKYVIEW_OS_NAME DE:$SKYVIEW_DE SESSION:$SKYVIEW_SESSION_TYPE"
"#;

const UNKNOWN: &str = "unknown";

/// 系统探测响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemDetection {
    pub os: String,
    pub version: String,
    pub de: String,
    pub session_type: String,
}

impl SystemDetection {
    /// 解析探测输出；找不到完整的三段式行时全部为 unknown
    pub fn parse(stdout: &str, version: &str) -> Self {
        let (os, de, session_type) = stdout
            .lines()
            .find_map(parse_detect_line)
            .unwrap_or((UNKNOWN, UNKNOWN, UNKNOWN));

        Self {
            os: os.to_string(),
            version: version.to_string(),
            de: de.to_string(),
            session_type: session_type.to_string(),
        }
    }
}

fn parse_detect_line(line: &str) -> Option<(&str, &str, &str)> {
    let start = line.find("OS:")?;
    let mut tokens = line[start..].splitn(3, ' ');

    let os = tokens.next()?.strip_prefix("OS:")?;
    let de = tokens.next()?.strip_prefix("DE:")?;
    let session = tokens
        .next()?
        .strip_prefix("SESSION:")?
        .split_whitespace()
        .next()?;

    if os.is_empty() || de.is_empty() || os.contains(char::is_whitespace) {
        return None;
    }
    Some((os, de, session))
}
