//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 anim-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `snapshots`: 审阅 insta 快照变更

use std::process::{Command, ExitCode};

/// 门禁步骤（cargo 参数）
const CHECK_STEPS: &[&[&str]] = &[
    &["fmt", "--all", "--", "--check"],
    &["clippy", "--workspace", "--all-targets"],
    &["test", "--workspace"],
];

const COV_HTML: &str = "target/llvm-cov/html/index.html";

/// 运行一条 cargo 命令，失败时带上完整命令行
fn cargo(args: &[&str]) -> anyhow::Result<()> {
    let line = format!("cargo {}", args.join(" "));
    eprintln!("\n==> {line}");
    let status = Command::new("cargo").args(args).status()?;
    anyhow::ensure!(status.success(), "{line} failed with {status}");
    Ok(())
}

/// 检查 cargo 子命令是否已安装
fn require_subcommand(name: &str, install: &[&str]) -> anyhow::Result<()> {
    let installed = Command::new("cargo")
        .args([name, "--version"])
        .status()
        .is_ok_and(|s| s.success());
    if !installed {
        let hint: String = install.iter().map(|step| format!("  - {step}\n")).collect();
        anyhow::bail!("cargo {name} 不可用。\n请先安装：\n{hint}然后重试。");
    }
    Ok(())
}

/// 生成覆盖率报告
fn coverage(scope: &[&str]) -> anyhow::Result<()> {
    require_subcommand(
        "llvm-cov",
        &[
            "cargo install cargo-llvm-cov",
            "rustup component add llvm-tools-preview",
        ],
    )?;
    let mut args = vec!["llvm-cov"];
    args.extend_from_slice(scope);
    args.extend_from_slice(&["--all-features", "--html"]);
    cargo(&args)?;
    eprintln!("\nCoverage HTML: {COV_HTML}");
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let sub = std::env::args().nth(1).unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            for step in CHECK_STEPS {
                cargo(step)?;
            }
        }
        "cov-runtime" => coverage(&["-p", "anim-runtime"])?,
        // xtask 不计入 workspace 覆盖率
        "cov-workspace" => coverage(&["--workspace", "--exclude", "xtask"])?,
        "snapshots" => {
            require_subcommand("insta", &["cargo install cargo-insta"])?;
            cargo(&["insta", "test", "--workspace", "--review"])?;
        }
        "help" | "-h" | "--help" => print_help(),
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo xtask <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查
  cov-runtime     运行 anim-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  snapshots       运行测试并审阅 insta 快照

ALIASES (in .cargo/config.toml):
  cargo check-all     -> cargo xtask check-all
  cargo cov-runtime   -> cargo xtask cov-runtime
  cargo cov-workspace -> cargo xtask cov-workspace
"#
    );
}
