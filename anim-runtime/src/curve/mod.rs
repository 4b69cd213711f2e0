//! # Curve 模块
//!
//! 采样策略：把「周期内已经过的时间」映射为「已走过的行程」。
//!
//! 播放器（[`crate::player::AnimationPlayer`]）只负责时间轴和状态机，
//! 曲线的形状通过组合一个 [`Curve`] 实现注入，不依赖继承。
//!
//! ## 使用流程
//!
//! ```text
//! 每个周期的第一次 tick:  plan(distance, timing) -> total_ms   （计算并缓存分段）
//! 之后每次 tick:          travel(elapsed_ms)     -> [0, distance]
//! ```
//!
//! - [`EaseCurve`]：加速 / 匀速 / 减速三段曲线（默认）
//! - [`TweenCurve`]：经典缓动函数（[`EasingFunction`]）

mod ease;
mod tween;

pub use ease::{EaseCurve, EasePlan};
pub use tween::{EasingFunction, TweenCurve};

use std::fmt;

use serde::{Deserialize, Serialize};

/// 时长模型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timing {
    /// 固定总时长，速度由距离推导
    FixedDuration { total_ms: u64 },
    /// 固定匀速段速度（单位/毫秒），总时长由距离推导
    FixedSpeed { units_per_ms: f64 },
}

impl Default for Timing {
    fn default() -> Self {
        Self::FixedDuration { total_ms: 0 }
    }
}

/// 采样曲线
///
/// 实现必须满足：
/// - `travel(0) == 0`，且随 `elapsed_ms` 单调不减
/// - 在 `plan` 返回的总时长处到达 `distance`
/// - `travel` 只依赖 `elapsed_ms` 与 `plan` 缓存的结果
pub trait Curve: fmt::Debug + 'static {
    /// 为新的播放周期规划分段
    ///
    /// # 返回
    /// 该周期的实际总时长（毫秒），0 表示第一次 tick 即完成
    fn plan(&mut self, distance: f64, timing: Timing) -> u64;

    /// 周期内 `elapsed_ms` 时刻已走过的行程
    fn travel(&self, elapsed_ms: u64) -> f64;

    /// 恢复默认参数（播放器 `init()` 时调用）
    fn reset(&mut self) {}
}

/// 匀速模型下的总时长：`ceil(distance * stretch / speed)`
///
/// `stretch` 是加减速段相对纯匀速多消耗的时间系数。
/// 速度非法时返回 `None`。
pub(crate) fn speed_total_ms(distance: f64, stretch: f64, units_per_ms: f64) -> Option<u64> {
    if !(units_per_ms.is_finite() && units_per_ms > 0.0) {
        return None;
    }
    Some((distance * stretch / units_per_ms).ceil() as u64)
}
