//! # Anim Runtime
//!
//! 控件动画的播放引擎。
//!
//! ## 架构概述
//!
//! `anim-runtime` 只负责时间轴：把「从 A 到 B，可选加速/减速，可选时长上限」
//! 变成一串由定时器驱动的离散采样值。它不自己计时，也不渲染，
//! 时钟与回调调度来自宿主提供的 [`TimerService`]：
//!
//! ```text
//! Widget                AnimationManager            AnimationPlayer          TimerService
//!   │  set_fade_alpha(true)  │                            │                        │
//!   │───────────────────────►│ 创建并配置                 │                        │
//!   │  appear(&widget)       │───────────────────────────►│ start()                │
//!   │                        │                            │── add_timer ──────────►│
//!   │◄──────────── apply(kind, value) ────────────────────│◄──────── tick ─────────│
//!   │◄──────────── set_visible(..)（完成回调）────────────│                        │
//! ```
//!
//! 全部在 UI 线程上单线程运行（`Rc`/`RefCell`/`Weak`），不加锁。
//!
//! ## 核心类型
//!
//! - [`AnimationPlayer`]：播放状态机
//! - [`Curve`]：采样曲线策略，默认 [`EaseCurve`]（加速/匀速/减速三段）
//! - [`AnimationManager`]：按 [`AnimationKind`] 索引的播放器表
//! - [`TimerQueue`]：确定性的虚拟时钟定时器，供测试与命令行工具使用
//! - [`AnimationConfig`]：预设配置
//!
//! ## 使用示例
//!
//! ```ignore
//! use anim_runtime::{AnimationPlayer, TimerQueue};
//!
//! let timer = Rc::new(TimerQueue::new());
//! let player = AnimationPlayer::new(timer.clone());
//! player.set_end_value(100);
//! player.set_total_millis(100);
//! player.set_callback(|value| println!("{value}"));
//! player.start();
//!
//! timer.advance(100);
//! assert!(!player.is_playing());
//! ```
//!
//! ## 模块结构
//!
//! - [`timer`]：定时器边界与取消令牌
//! - [`curve`]：采样曲线
//! - [`player`]：播放核心
//! - [`kind`]：动画类型
//! - [`manager`]：动画管理器
//! - [`config`]：配置
//! - [`error`]：错误类型定义

pub mod config;
pub mod curve;
pub mod error;
pub mod kind;
pub mod manager;
pub mod player;
pub mod timer;

// 重导出核心类型
pub use config::{AnimationConfig, PresetConfig};
pub use curve::{Curve, EaseCurve, EasePlan, EasingFunction, Timing, TweenCurve};
pub use error::{AnimError, AnimResult, ConfigError};
pub use kind::AnimationKind;
pub use manager::{ALPHA_MAX, Animatable, AnimationManager};
pub use player::{
    AnimationPlayer, CompleteCallback, DEFAULT_TICK_INTERVAL_MS, PlayCallback, WeakPlayer,
};
pub use timer::{CancelFlag, CancelToken, Repeat, TimerCallback, TimerQueue, TimerService};
