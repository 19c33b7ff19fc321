//! 命令执行器
//!
//! 以独立子进程运行控制脚本，并把所有进程级结果归一化为 `ExecutionResult`：
//! - stdout/stderr 分离，运行期间增量累积
//! - 超时强制终止（连同脚本派生的整个进程组）
//! - 脚本退出后，被后台进程占住的输出管道只再等待一个宽限期
//! - 启动失败不向上抛错

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::{ExecutionRequest, ExecutionResult, Target};

/// 脚本退出后等待输出流 EOF 的最长时间
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// 外部控制例程执行接口
///
/// 实现方必须总是返回一个结果，不能让调用悬而未决
#[async_trait]
pub trait ScriptExecutor: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult;
}

/// 执行器配置
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// 解释器（默认 bash）
    pub shell: String,
    /// 控制脚本目录，同时以 LIB_DIR 传给子进程
    pub lib_dir: PathBuf,
    /// 单次调用超时
    pub timeout: Duration,
}

/// 基于 tokio::process 的脚本执行器
pub struct ScriptRunner {
    config: RunnerConfig,
}

impl ScriptRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    fn build_command(&self, request: &ExecutionRequest) -> Command {
        let mut cmd = Command::new(&self.config.shell);
        match request.target {
            Target::Script(name) => {
                cmd.arg(self.config.lib_dir.join(name));
            }
            Target::Snippet(snippet) => {
                cmd.arg("-c").arg(snippet);
            }
        }
        cmd.args(&request.args)
            .env("LIB_DIR", &self.config.lib_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // 独立进程组，超时时可以一并终止脚本派生的子进程
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

#[async_trait]
impl ScriptExecutor for ScriptRunner {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        let label = request.label();

        let mut child = match self.build_command(&request).spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(script = label, shell = %self.config.shell, error = %e, "Failed to spawn control script");
                return ExecutionResult::failed(format!(
                    "Failed to spawn {} for {}: {}",
                    self.config.shell, label, e
                ));
            }
        };

        debug!(script = label, pid = ?child.id(), args = ?request.args, "Spawned control script");

        let stdout = OutputCollector::spawn(child.stdout.take());
        let stderr = OutputCollector::spawn(child.stderr.take());

        let waited = tokio::time::timeout(self.config.timeout, child.wait()).await;
        let status = match waited {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                error!(script = label, error = %e, "Failed to wait for control script");
                kill_process_group(&mut child).await;
                stdout.abort();
                stderr.abort();
                return ExecutionResult::failed(format!("Failed to wait for {}: {}", label, e));
            }
            Err(_) => {
                warn!(script = label, timeout = ?self.config.timeout, "Control script timed out, killing process group");
                kill_process_group(&mut child).await;
                stdout.abort();
                stderr.abort();
                return ExecutionResult::failed(format!(
                    "{} timed out after {:?}",
                    label, self.config.timeout
                ));
            }
        };

        // 脚本已退出，退出码以此为准；后台进程可能仍持有输出管道
        let (stdout, stderr) = tokio::join!(stdout.finish(label), stderr.finish(label));
        classify(label, status, stdout, stderr)
    }
}

/// 增量收集一个输出流，被中止时已读到的内容仍然保留
struct OutputCollector {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl OutputCollector {
    fn spawn<R>(stream: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = tokio::spawn(read_to_eof(stream, buf.clone()));
        Self { buf, task }
    }

    fn abort(&self) {
        self.task.abort();
    }

    /// 等待 EOF 至多 `OUTPUT_GRACE`，超出则停止读取并返回已收集的部分
    async fn finish(mut self, label: &str) -> Vec<u8> {
        if tokio::time::timeout(OUTPUT_GRACE, &mut self.task).await.is_err() {
            debug!(script = label, "Output stream still open after exit, detaching");
            self.task.abort();
        }
        std::mem::take(&mut *self.buf.lock().await)
    }
}

/// 终止子进程所在的进程组，并回收子进程
async fn kill_process_group(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let killed = Command::new("kill")
            .arg("-KILL")
            .arg("--")
            .arg(format!("-{}", pid))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        if let Err(e) = killed {
            debug!(pid, error = %e, "Failed to signal process group");
        }
    }
    if let Err(e) = child.kill().await {
        debug!(error = %e, "Kill after timeout failed");
    }
}

/// 读取一个输出流直到 EOF
async fn read_to_eof<R>(stream: Option<R>, buf: Arc<Mutex<Vec<u8>>>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut stream) = stream else {
        return;
    };
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => buf.lock().await.extend_from_slice(&chunk[..n]),
            Err(e) => {
                warn!(error = %e, "Failed to read child output");
                break;
            }
        }
    }
}

fn classify(label: &str, status: ExitStatus, stdout: Vec<u8>, stderr: Vec<u8>) -> ExecutionResult {
    let stdout = String::from_utf8_lossy(&stdout).into_owned();
    let stderr = String::from_utf8_lossy(&stderr).into_owned();

    match status.code() {
        Some(code) => {
            info!(
                script = label,
                exit_code = code,
                stdout_len = stdout.len(),
                stderr_len = stderr.len(),
                "Control script finished"
            );
            ExecutionResult::exited(code, stdout, stderr)
        }
        None => {
            let reason = termination_reason(&status);
            warn!(script = label, reason = %reason, "Control script exited without a code");
            ExecutionResult::terminated(reason, stdout, stderr)
        }
    }
}

#[cfg(unix)]
fn termination_reason(status: &ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(signal) => format!("Process terminated by signal {}", signal),
        None => "Process exited without an exit code".to_string(),
    }
}

#[cfg(not(unix))]
fn termination_reason(_status: &ExitStatus) -> String {
    "Process exited without an exit code".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn runner(lib_dir: &Path, timeout: Duration) -> ScriptRunner {
        ScriptRunner::new(RunnerConfig {
            shell: "sh".to_string(),
            lib_dir: lib_dir.to_path_buf(),
            timeout,
        })
    }

    fn write_script(dir: &TempDir, name: &str, body: &str) {
        std::fs::write(dir.path().join(name), body).unwrap();
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_exit_zero_captures_output() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_rdp.sh", "echo 'RDP configured'\necho 'note' >&2\n");

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script("config_rdp.sh", args(&["--status"])))
            .await;

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "RDP configured\n");
        assert_eq!(result.stderr, "note\n");
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_plain_failure() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_ssh.sh", "echo inactive\necho 'sshd not found' >&2\nexit 3\n");

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script("config_ssh.sh", args(&["--status"])))
            .await;

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "inactive\n");
        assert_eq!(result.stderr, "sshd not found\n");
        assert!(result.error.is_none());
        assert!(result.is_well_formed());
    }

    #[tokio::test]
    async fn test_args_are_discrete_tokens() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_ssh.sh", "for a in \"$@\"; do echo \"[$a]\"; done\n");

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script(
                "config_ssh.sh",
                args(&["--configure", "--key-path", "a b; echo pwned"]),
            ))
            .await;

        assert!(result.success);
        assert_eq!(result.stdout, "[--configure]\n[--key-path]\n[a b; echo pwned]\n");
    }

    #[tokio::test]
    async fn test_lib_dir_exported() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_vnc.sh", "printf '%s' \"$LIB_DIR\"\n");

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script("config_vnc.sh", Vec::new()))
            .await;

        assert_eq!(result.stdout, dir.path().to_string_lossy());
    }

    #[tokio::test]
    async fn test_snippet_runs_inline() {
        let dir = TempDir::new().unwrap();

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::snippet("echo OS:debian DE:xfce SESSION:x11"))
            .await;

        assert!(result.success);
        assert_eq!(result.stdout, "OS:debian DE:xfce SESSION:x11\n");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_failure() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptRunner::new(RunnerConfig {
            shell: "nonexistent_shell_12345".to_string(),
            lib_dir: dir.path().to_path_buf(),
            timeout: Duration::from_secs(5),
        });

        let result = runner
            .execute(ExecutionRequest::script("config_rdp.sh", args(&["--status"])))
            .await;

        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert_eq!(result.stdout, "");
        assert_eq!(result.stderr, "");
        assert!(!result.error.as_deref().unwrap_or_default().is_empty());
        assert!(result.is_well_formed());
    }

    #[tokio::test]
    async fn test_missing_script_is_nonzero_exit() {
        let dir = TempDir::new().unwrap();

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script("config_native.sh", args(&["--status"])))
            .await;

        assert!(!result.success);
        assert!(matches!(result.exit_code, Some(code) if code != 0));
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_rdp.sh", "echo starting\nsleep 5\n");

        let started = std::time::Instant::now();
        let result = runner(dir.path(), Duration::from_millis(200))
            .execute(ExecutionRequest::script("config_rdp.sh", args(&["--restart"])))
            .await;

        assert!(started.elapsed() < Duration::from_secs(4));
        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert_eq!(result.stdout, "");
        assert!(result.error.as_deref().unwrap().contains("timed out"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination_has_error() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_vnc.sh", "echo before\nkill -9 $$\n");

        let result = runner(dir.path(), Duration::from_secs(5))
            .execute(ExecutionRequest::script("config_vnc.sh", args(&["--stop"])))
            .await;

        assert!(!result.success);
        assert_eq!(result.exit_code, None);
        assert_eq!(result.stdout, "before\n");
        assert!(result.error.as_deref().unwrap().contains("signal 9"));
        assert!(result.is_well_formed());
    }

    #[tokio::test]
    async fn test_background_child_does_not_mask_exit_code() {
        let dir = TempDir::new().unwrap();
        write_script(&dir, "config_rdp.sh", "echo started\nsleep 3 &\nexit 0\n");

        let started = std::time::Instant::now();
        let result = runner(dir.path(), Duration::from_secs(1))
            .execute(ExecutionRequest::script("config_rdp.sh", args(&["--start"])))
            .await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout, "started\n");
        assert!(result.error.is_none());
    }

    /// 进程不存在或已成为僵尸
    #[cfg(target_os = "linux")]
    fn is_gone(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Err(_) => true,
            Ok(stat) => stat
                .rsplit_once(") ")
                .is_some_and(|(_, rest)| rest.starts_with('Z')),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timeout_kills_whole_process_group() {
        let dir = TempDir::new().unwrap();
        write_script(
            &dir,
            "config_vnc.sh",
            "sleep 30 &\necho $! > \"$LIB_DIR/child.pid\"\nwait\n",
        );

        let result = runner(dir.path(), Duration::from_millis(300))
            .execute(ExecutionRequest::script("config_vnc.sh", args(&["--start"])))
            .await;
        assert!(result.error.as_deref().unwrap().contains("timed out"));

        let pid = std::fs::read_to_string(dir.path().join("child.pid")).unwrap();
        let pid = pid.trim();
        let mut gone = false;
        for _ in 0..40 {
            if is_gone(pid) {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(gone, "background child {pid} survived the timeout");
    }

    #[tokio::test]
    async fn test_large_output_fully_drained() {
        let dir = TempDir::new().unwrap();
        write_script(
            &dir,
            "config_ssh.sh",
            "i=0\nwhile [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done\n",
        );

        let result = runner(dir.path(), Duration::from_secs(10))
            .execute(ExecutionRequest::script("config_ssh.sh", Vec::new()))
            .await;

        assert!(result.success);
        assert_eq!(result.stdout.lines().count(), 20000);
        assert!(result.stdout.ends_with("line-19999\n"));
    }
}
