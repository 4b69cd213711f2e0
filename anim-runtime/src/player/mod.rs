//! # Player 模块
//!
//! 播放核心：起止值、时间轴、回调以及 start/stop/continue/reverse 协议。
//!
//! ## 生命周期
//!
//! ```text
//!          start / continue_play / reverse_continue
//!   Idle ───────────────────────────────────────────▶ Playing
//!    ▲                                                  │  │
//!    │            complete（到达终点）/ stop / clear    │  │ reverse_continue
//!    └──────────────────────────────────────────────────┘  └──▶ Playing（反向）
//! ```
//!
//! ## 回调约定
//!
//! - 播放回调：每次 tick 一次（包括 `start()` 内同步的第一次采样）
//! - 完成回调：每个周期最多一次，在终点值交付之后
//! - 调用任何回调时都不持有内部借用，回调内可以重入 `start()`/`stop()`/`clear()`
//!
//! 曲线形状由 [`Curve`](crate::curve::Curve) 注入，默认 [`EaseCurve`](crate::curve::EaseCurve)。

mod ease;
mod playback;

pub use playback::{AnimationPlayer, WeakPlayer};

use std::rc::Rc;

/// 播放回调：参数为当前采样值
pub type PlayCallback = Rc<dyn Fn(i64)>;

/// 完成回调
pub type CompleteCallback = Rc<dyn Fn()>;

/// 默认 tick 间隔（毫秒）
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;
