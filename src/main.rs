//! SkyView Bridge - 远程访问服务控制桥
//!
//! Usage:
//! - Normal mode: `skyview-bridge`
//! - With custom port: `skyview-bridge --port 3001`
//! - With script directory: `skyview-bridge --lib-dir /opt/skyview/lib`

use std::path::PathBuf;

use skyview_bridge::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--bind" if i + 1 < args.len() => {
                config.bind_override = Some(args[i + 1].clone());
                i += 2;
            }
            "--lib-dir" if i + 1 < args.len() => {
                config.lib_dir_override = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("SkyView Bridge - remote access service control bridge");
    println!();
    println!("USAGE:");
    println!("    skyview-bridge [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>       Override the listening port (SKYVIEW_PORT)");
    println!("    --bind <ADDR>       Override the listening address (SKYVIEW_BIND)");
    println!("    --lib-dir <DIR>     Directory containing the control scripts (SKYVIEW_LIB_DIR)");
    println!("    -h, --help          Print help information");
    println!();
    println!("ENVIRONMENT:");
    println!("    SKYVIEW_SHELL              Interpreter for control scripts (default: bash)");
    println!("    SKYVIEW_EXEC_TIMEOUT_SECS  Per-script timeout in seconds (default: 10)");
    println!("    SKYVIEW_API_KEY            Require x-api-key on /api requests");
    println!("    SKYVIEW_LOG_FORMAT         pretty | json");
    println!("    RUST_LOG                   Log filter (default: info)");
}

fn main() {
    let config = parse_args();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(skyview_bridge::init_and_run_with_config(config)) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
