//! # Anim CLI
//!
//! 命令行宿主：用虚拟时钟（或真实时间）驱动动画，打印采样序列。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p anim-cli -- trace --kind fade-hot
//! cargo run -p anim-cli -- trace --kind fade-width --from 0 --to 320 --max-total 150
//! cargo run -p anim-cli -- trace --kind fade-alpha --reverse-at 120 --json
//! cargo run -p anim-cli -- trace --easing ease-out-cubic --from 0 --to 100 --duration 200
//! cargo run -p anim-cli -- kinds --config animation.json
//! cargo run -p anim-cli -- config > animation.json
//! ```

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;

use anim_runtime::{
    ALPHA_MAX, AnimationConfig, AnimationKind, AnimationManager, AnimationPlayer, Curve,
    EasingFunction, TimerQueue, TimerService, TweenCurve,
};
use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, debug, info};

/// 虚拟时间上限，防止参数异常时无限推进
const TRACE_LIMIT_MS: u64 = 60_000;

/// 柱状图满宽（字符数）
const BAR_WIDTH: u128 = 40;

#[derive(Parser)]
#[command(name = "anim-cli")]
#[command(about = "动画引擎命令行工具 - 打印动画采样序列")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 日志详细程度（-v info，-vv debug，-vvv trace）
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// 播放一个动画并打印采样
    Trace(TraceArgs),

    /// 列出动画类型及其预设
    Kinds {
        /// 配置文件（JSON）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 打印配置（默认或指定文件）
    Config {
        /// 配置文件（JSON）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
struct TraceArgs {
    /// 动画类型
    #[arg(short, long, default_value = "fade-alpha")]
    kind: AnimationKind,

    /// 配置文件（JSON）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 起始值
    #[arg(long, allow_hyphen_values = true)]
    from: Option<i64>,

    /// 结束值
    #[arg(long, allow_hyphen_values = true)]
    to: Option<i64>,

    /// 总时长（毫秒）
    #[arg(short, long, conflicts_with = "speed")]
    duration: Option<u64>,

    /// 匀速段速度（单位/毫秒）
    #[arg(short, long)]
    speed: Option<f64>,

    /// 加速段占比
    #[arg(long)]
    speed_up: Option<f64>,

    /// 减速段占比
    #[arg(long)]
    speed_down: Option<f64>,

    /// 总时长上限（毫秒）
    #[arg(long)]
    max_total: Option<u64>,

    /// 改用经典缓动函数（忽略加减速参数）
    #[arg(short, long)]
    easing: Option<EasingFunction>,

    /// 在指定时刻反向（毫秒）
    #[arg(long)]
    reverse_at: Option<u64>,

    /// 按真实时间推进
    #[arg(long)]
    realtime: bool,

    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
}

/// 一次采样
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
struct Sample {
    elapsed_ms: u64,
    value: i64,
}

/// 播放结果
#[derive(Debug, Serialize)]
struct TraceReport {
    kind: AnimationKind,
    curve: String,
    start_value: i64,
    end_value: i64,
    total_ms: u64,
    completions: u32,
    samples: Vec<Sample>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = real_main(cli) {
        eprintln!("anim-cli error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn real_main(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Trace(args) => {
            let config = load_config(args.config.as_deref())?;
            let report = trace(&args, &config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Kinds { config } => {
            let config = load_config(config.as_deref())?;
            print_kinds(&config);
        }
        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            println!("{}", config.to_json_pretty()?);
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AnimationConfig> {
    match path {
        Some(path) => AnimationConfig::from_file(path)
            .with_context(|| format!("无法加载配置文件 {}", path.display())),
        None => Ok(AnimationConfig::default()),
    }
}

/// 按参数构建播放器并跑到结束
fn trace(args: &TraceArgs, config: &AnimationConfig) -> anyhow::Result<TraceReport> {
    let queue = Rc::new(TimerQueue::new());

    if let Some(easing) = args.easing {
        let player = AnimationPlayer::with_curve(queue.clone(), TweenCurve::new(easing));
        player.set_tick_interval(config.tick_interval_ms);
        player.set_total_millis(config.preset(args.kind).duration_ms);
        apply_common(args, &player);
        return Ok(run(args, &queue, &player, easing.to_string()));
    }

    let mut manager = AnimationManager::with_config(queue.clone(), config.clone());
    let player = manager
        .set_enabled(args.kind, true)
        .with_context(|| format!("无法启用动画 {}", args.kind))?;
    apply_common(args, player);
    if let Some(ratio) = args.speed_up {
        player.set_speed_up_ratio(ratio);
    }
    if let Some(ratio) = args.speed_down {
        player.set_speed_down_ratio(ratio);
    }
    if let Some(max_total) = args.max_total {
        player.set_max_total_millis(Some(max_total));
    }
    Ok(run(args, &queue, player, "ease".to_string()))
}

/// 与曲线无关的参数
fn apply_common<C: Curve>(args: &TraceArgs, player: &AnimationPlayer<C>) {
    // 宽高与滑动类的起止值由控件决定，命令行未指定时给一个演示区间
    let (from, to) = match args.kind {
        AnimationKind::FadeAlpha | AnimationKind::FadeHot => (0, ALPHA_MAX),
        _ => (0, 100),
    };
    player.set_start_value(from);
    player.set_end_value(to);

    if let Some(from) = args.from {
        player.set_start_value(from);
    }
    if let Some(to) = args.to {
        player.set_end_value(to);
    }
    if let Some(duration) = args.duration {
        player.set_total_millis(duration);
    }
    if let Some(speed) = args.speed {
        player.set_linear_speed(speed);
    }
}

fn run<C: Curve>(
    args: &TraceArgs,
    queue: &Rc<TimerQueue>,
    player: &AnimationPlayer<C>,
    curve: String,
) -> TraceReport {
    let samples = Rc::new(RefCell::new(Vec::new()));
    let completions = Rc::new(Cell::new(0));

    let s = samples.clone();
    let q = queue.clone();
    player.set_callback(move |value| {
        s.borrow_mut().push(Sample {
            elapsed_ms: q.now_ms(),
            value,
        });
    });
    let c = completions.clone();
    player.set_complete_callback(move || c.set(c.get() + 1));

    let (start_value, end_value) = (player.start_value(), player.end_value());
    info!(kind = %args.kind, start_value, end_value, "开始播放");
    player.start();

    let step = player.tick_interval();
    let mut reversed = false;
    while player.is_playing() && queue.now_ms() < TRACE_LIMIT_MS {
        if let Some(at) = args.reverse_at
            && !reversed
            && queue.now_ms() >= at
        {
            debug!(now_ms = queue.now_ms(), "反向");
            player.reverse_continue();
            reversed = true;
        }
        if args.realtime {
            std::thread::sleep(Duration::from_millis(step));
        }
        queue.advance(step);
    }

    let samples = samples.borrow().clone();
    TraceReport {
        kind: args.kind,
        curve,
        start_value,
        end_value,
        total_ms: queue.now_ms(),
        completions: completions.get(),
        samples,
    }
}

fn print_report(report: &TraceReport) {
    println!(
        "{} ({}): {} -> {}",
        report.kind, report.curve, report.start_value, report.end_value
    );
    let peak = report
        .samples
        .iter()
        .map(|s| s.value.unsigned_abs())
        .max()
        .unwrap_or(0)
        .max(1);
    for sample in &report.samples {
        let width = bar_width(sample.value, peak);
        println!(
            "{:>6} ms {:>8}  {}",
            sample.elapsed_ms,
            sample.value,
            "#".repeat(width)
        );
    }
    println!(
        "完成 {} 次，共 {} 次采样，用时 {} ms",
        report.completions,
        report.samples.len(),
        report.total_ms
    );
}

/// 柱状图宽度，`peak` 对应满宽
fn bar_width(value: i64, peak: u64) -> usize {
    (u128::from(value.unsigned_abs()) * BAR_WIDTH / u128::from(peak.max(1))) as usize
}

fn print_kinds(config: &AnimationConfig) {
    println!(
        "{:<28} {:>8} {:>8} {:>8} {:>10}",
        "kind", "duration", "up", "down", "max_total"
    );
    for kind in AnimationKind::ALL {
        let preset = config.preset(kind);
        let max_total = preset
            .max_total_ms
            .map_or_else(|| "-".to_string(), |ms| ms.to_string());
        println!(
            "{:<28} {:>8} {:>8.2} {:>8.2} {:>10}",
            kind.name(),
            preset.duration_ms,
            preset.speed_up_ratio,
            preset.speed_down_ratio,
            max_total
        );
    }
}
