//! 各服务的 configure 选项
//!
//! 选项集合是封闭的：未知键、重复键、类型错误都在反序列化阶段被拒绝，
//! 不会作为未知参数透传给脚本。SSH / VNC 选项保留调用方给出的键顺序。
//! 显式的 `null` 等同于未提供该键。

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

use super::args::ArgList;

/// RDP 配置方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RdpMethod {
    #[default]
    Auto,
    Xrdp,
    Vnc,
    Native,
    Ssh,
}

impl RdpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RdpMethod::Auto => "auto",
            RdpMethod::Xrdp => "xrdp",
            RdpMethod::Vnc => "vnc",
            RdpMethod::Native => "native",
            RdpMethod::Ssh => "ssh",
        }
    }
}

/// RDP configure 请求体
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RdpOptions {
    #[serde(deserialize_with = "null_as_default")]
    pub method: RdpMethod,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RdpOptions {
    pub fn append_to(&self, args: &mut ArgList) {
        args.push_pair("--method", self.method.as_str());
    }
}

/// 一个可被转换成 `--flag value` 的选项
pub trait ConfigOption: Sized {
    /// JSON 中允许出现的键
    const FIELDS: &'static [&'static str];

    /// 读取键对应的值；值为 `null` 时返回 `None`
    fn from_entry<'de, A: MapAccess<'de>>(key: &str, map: &mut A)
        -> Result<Option<Self>, A::Error>;

    /// 脚本参数名
    fn flag(&self) -> &'static str;

    /// 脚本参数值
    fn value(&self) -> String;
}

/// 按调用方顺序排列的选项列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedOptions<T>(Vec<T>);

impl<T> Default for OrderedOptions<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: ConfigOption> OrderedOptions<T> {
    #[cfg(test)]
    pub fn new(options: Vec<T>) -> Self {
        Self(options)
    }

    pub fn append_to(&self, args: &mut ArgList) {
        for option in &self.0 {
            args.push_pair(option.flag(), option.value());
        }
    }
}

struct OrderedOptionsVisitor<T>(PhantomData<T>);

impl<'de, T: ConfigOption> Visitor<'de> for OrderedOptionsVisitor<T> {
    type Value = OrderedOptions<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object of configuration options")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut options: Vec<T> = Vec::new();
        let mut seen: Vec<&'static str> = Vec::new();
        while let Some(key) = map.next_key::<String>()? {
            let Some(field) = T::FIELDS.iter().copied().find(|f| *f == key) else {
                return Err(de::Error::unknown_field(&key, T::FIELDS));
            };
            if seen.contains(&field) {
                return Err(de::Error::duplicate_field(field));
            }
            seen.push(field);
            if let Some(option) = T::from_entry(field, &mut map)? {
                options.push(option);
            }
        }
        Ok(OrderedOptions(options))
    }
}

impl<'de, T: ConfigOption> Deserialize<'de> for OrderedOptions<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedOptionsVisitor(PhantomData))
    }
}

/// 端口，拒绝 0
fn next_port<'de, A: MapAccess<'de>>(map: &mut A) -> Result<Option<u16>, A::Error> {
    let port: Option<u16> = map.next_value()?;
    if port == Some(0) {
        return Err(de::Error::invalid_value(
            de::Unexpected::Unsigned(0),
            &"a port between 1 and 65535",
        ));
    }
    Ok(port)
}

/// SSH 选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshOption {
    Port(u16),
    PasswordAuth(bool),
    RootLogin(bool),
    KeyPath(String),
    X11Forwarding(bool),
}

impl ConfigOption for SshOption {
    const FIELDS: &'static [&'static str] =
        &["port", "passwordAuth", "rootLogin", "keyPath", "x11Forwarding"];

    fn from_entry<'de, A: MapAccess<'de>>(
        key: &str,
        map: &mut A,
    ) -> Result<Option<Self>, A::Error> {
        let option = match key {
            "port" => next_port(map)?.map(SshOption::Port),
            "passwordAuth" => map.next_value::<Option<bool>>()?.map(SshOption::PasswordAuth),
            "rootLogin" => map.next_value::<Option<bool>>()?.map(SshOption::RootLogin),
            "keyPath" => match map.next_value::<Option<String>>()? {
                Some(path) if path.is_empty() => {
                    return Err(de::Error::invalid_length(0, &"a non-empty key path"));
                }
                path => path.map(SshOption::KeyPath),
            },
            "x11Forwarding" => map.next_value::<Option<bool>>()?.map(SshOption::X11Forwarding),
            other => return Err(de::Error::unknown_field(other, Self::FIELDS)),
        };
        Ok(option)
    }

    fn flag(&self) -> &'static str {
        match self {
            SshOption::Port(_) => "--port",
            SshOption::PasswordAuth(_) => "--password-auth",
            SshOption::RootLogin(_) => "--root-login",
            SshOption::KeyPath(_) => "--key-path",
            SshOption::X11Forwarding(_) => "--x11-forwarding",
        }
    }

    fn value(&self) -> String {
        match self {
            SshOption::Port(port) => port.to_string(),
            SshOption::PasswordAuth(v) | SshOption::RootLogin(v) | SshOption::X11Forwarding(v) => {
                v.to_string()
            }
            SshOption::KeyPath(path) => path.clone(),
        }
    }
}

/// VNC 选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VncOption {
    Port(u16),
}

impl ConfigOption for VncOption {
    const FIELDS: &'static [&'static str] = &["port"];

    fn from_entry<'de, A: MapAccess<'de>>(
        key: &str,
        map: &mut A,
    ) -> Result<Option<Self>, A::Error> {
        match key {
            "port" => Ok(next_port(map)?.map(VncOption::Port)),
            other => Err(de::Error::unknown_field(other, Self::FIELDS)),
        }
    }

    fn flag(&self) -> &'static str {
        "--port"
    }

    fn value(&self) -> String {
        match self {
            VncOption::Port(port) => port.to_string(),
        }
    }
}

pub type SshOptions = OrderedOptions<SshOption>;
pub type VncOptions = OrderedOptions<VncOption>;

/// native-rdp configure 不接受任何选项
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoOptions {}
