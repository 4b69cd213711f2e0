//! # Tween 曲线
//!
//! 经典缓动函数。只收录单调函数：回弹、弹性类会越过终点，
//! 与播放器「采样值始终落在起止区间内」的约束冲突。

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Curve, Timing, speed_total_ms};

/// 缓动函数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 二次缓入
    EaseInQuad,
    /// 二次缓出
    EaseOutQuad,
    /// 二次缓入缓出
    EaseInOutQuad,
    /// 三次缓入
    EaseInCubic,
    /// 三次缓出
    EaseOutCubic,
    /// 三次缓入缓出
    #[default]
    EaseInOutCubic,
    /// 正弦缓入
    EaseInSine,
    /// 正弦缓出
    EaseOutSine,
    /// 正弦缓入缓出
    EaseInOutSine,
}

impl EasingFunction {
    /// 全部缓动函数
    pub const ALL: [EasingFunction; 10] = [
        EasingFunction::Linear,
        EasingFunction::EaseInQuad,
        EasingFunction::EaseOutQuad,
        EasingFunction::EaseInOutQuad,
        EasingFunction::EaseInCubic,
        EasingFunction::EaseOutCubic,
        EasingFunction::EaseInOutCubic,
        EasingFunction::EaseInSine,
        EasingFunction::EaseOutSine,
        EasingFunction::EaseInOutSine,
    ];

    /// 稳定名称（kebab-case）
    pub fn name(&self) -> &'static str {
        match self {
            EasingFunction::Linear => "linear",
            EasingFunction::EaseInQuad => "ease-in-quad",
            EasingFunction::EaseOutQuad => "ease-out-quad",
            EasingFunction::EaseInOutQuad => "ease-in-out-quad",
            EasingFunction::EaseInCubic => "ease-in-cubic",
            EasingFunction::EaseOutCubic => "ease-out-cubic",
            EasingFunction::EaseInOutCubic => "ease-in-out-cubic",
            EasingFunction::EaseInSine => "ease-in-sine",
            EasingFunction::EaseOutSine => "ease-out-sine",
            EasingFunction::EaseInOutSine => "ease-in-out-sine",
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    ///
    /// # 返回
    /// - 缓动后的进度值 (0.0 - 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EasingFunction::Linear => t,
            EasingFunction::EaseInQuad => t * t,
            EasingFunction::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            EasingFunction::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            EasingFunction::EaseInCubic => t * t * t,
            EasingFunction::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            EasingFunction::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            EasingFunction::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            EasingFunction::EaseOutSine => (t * PI / 2.0).sin(),
            EasingFunction::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EasingFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| format!("未知的缓动函数 '{s}'"))
    }
}

/// 基于缓动函数的曲线
///
/// 固定速度模型下按纯匀速推导时长：`total = ceil(D / v)`。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TweenCurve {
    easing: EasingFunction,
    distance: f64,
    total_ms: u64,
}

impl TweenCurve {
    /// 使用指定缓动函数创建曲线
    pub fn new(easing: EasingFunction) -> Self {
        Self {
            easing,
            ..Self::default()
        }
    }

    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    pub fn set_easing(&mut self, easing: EasingFunction) {
        self.easing = easing;
    }
}

impl Curve for TweenCurve {
    fn plan(&mut self, distance: f64, timing: Timing) -> u64 {
        self.distance = distance.max(0.0);
        self.total_ms = if self.distance == 0.0 {
            0
        } else {
            match timing {
                Timing::FixedDuration { total_ms } => total_ms,
                Timing::FixedSpeed { units_per_ms } => {
                    speed_total_ms(self.distance, 1.0, units_per_ms).unwrap_or(0)
                }
            }
        };
        self.total_ms
    }

    fn travel(&self, elapsed_ms: u64) -> f64 {
        if self.total_ms == 0 || elapsed_ms >= self.total_ms {
            return self.distance;
        }
        let t = elapsed_ms as f64 / self.total_ms as f64;
        (self.distance * self.easing.apply(t)).clamp(0.0, self.distance)
    }

    fn reset(&mut self) {
        *self = Self::new(self.easing);
    }
}
