//! 脚本参数构建
//!
//! 每个参数都是独立的 token，直接交给进程参数列表，不经过 shell 拼接

/// 有序参数列表构建器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList {
    args: Vec<String>,
}

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加单个开关，如 `--status`
    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    /// 追加 `--key value` 参数对
    pub fn push_pair(&mut self, flag: &str, value: impl Into<String>) {
        self.args.push(flag.to_string());
        self.args.push(value.into());
    }

    pub fn into_vec(self) -> Vec<String> {
        self.args
    }
}
