//! # Ease 曲线
//!
//! 三段式速度曲线：加速 → 匀速 → 减速。
//!
//! ```text
//! 速度
//!  v ┤      ┌──────────┐
//!    │     /            \
//!    │    /              \
//!  0 ┼───┴────────────────┴───▶ 时间
//!       T_up    T_lin    T_down
//! ```
//!
//! - 加速段：`x = D_up · s^a`，在 `T_up = a · D_up / v` 时速度恰好为 `v`
//! - 匀速段：`T_lin = D_lin / v`
//! - 减速段：`x = D_down · [b · (1 − (1 − s)^c) + (1 − b) · (3s² − 2s³)]`，
//!   入口速度为 `v`，出口速度为 0
//!
//! 分段在每个周期的第一次 tick 规划一次（[`EasePlan`]），之后的采样只做算术。

use super::{Curve, Timing, speed_total_ms};

/// 加速/减速指数默认值
const DEFAULT_FACTOR: f64 = 2.0;

/// 受上限压缩时，减速段至少保留自然长度的这个比例，否则整体按时间缩放
const MIN_SPEED_DOWN_SHARE: f64 = 0.25;

/// 一个播放周期的分段规划
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EasePlan {
    /// 总行程
    pub distance: f64,
    /// 匀速段速度（单位/毫秒）
    pub linear_speed: f64,
    pub speed_up_distance: f64,
    pub linear_distance: f64,
    pub speed_down_distance: f64,
    pub speed_up_ms: f64,
    pub linear_ms: f64,
    pub speed_down_ms: f64,
    pub speed_up_factor_a: f64,
    pub speed_down_factor_a: f64,
    /// 幂衰减项的权重，其余由 smoothstep 补足
    pub speed_down_factor_b: f64,
    /// 实际总时长（已包含上限）
    pub total_ms: u64,
}

impl EasePlan {
    /// 零时长规划：第一次采样即到达终点
    fn instant(distance: f64, speed_up_factor_a: f64, speed_down_factor_a: f64) -> Self {
        Self {
            distance,
            linear_speed: 0.0,
            speed_up_distance: 0.0,
            linear_distance: 0.0,
            speed_down_distance: 0.0,
            speed_up_ms: 0.0,
            linear_ms: 0.0,
            speed_down_ms: 0.0,
            speed_up_factor_a,
            speed_down_factor_a,
            speed_down_factor_b: 1.0,
            total_ms: 0,
        }
    }

    /// 把总时长压到 `cap_ms`
    fn apply_cap(&mut self, cap_ms: u64) {
        let cap = cap_ms as f64;
        let natural = self.speed_up_ms + self.linear_ms + self.speed_down_ms;
        let room = cap - self.speed_up_ms - self.linear_ms;

        if self.speed_down_ms > 0.0 && room >= self.speed_down_ms * MIN_SPEED_DOWN_SHARE {
            // 只压缩减速段，入口速度保持 v
            self.speed_down_factor_b = (room / self.speed_down_ms).min(1.0);
            self.speed_down_ms = room;
        } else {
            let scale = cap / natural;
            self.speed_up_ms *= scale;
            self.linear_ms *= scale;
            self.speed_down_ms *= scale;
            self.linear_speed /= scale;
            self.speed_down_factor_b = 1.0;
        }
        self.total_ms = cap_ms;
    }

    /// 周期内 `t` 毫秒时已走过的行程
    pub fn travel_at(&self, t: f64) -> f64 {
        let mut t = t.max(0.0);

        if t < self.speed_up_ms {
            let s = t / self.speed_up_ms;
            return self.speed_up_distance * s.powf(self.speed_up_factor_a);
        }
        t -= self.speed_up_ms;

        if t < self.linear_ms {
            return self.speed_up_distance + self.linear_distance * t / self.linear_ms;
        }
        t -= self.linear_ms;

        if t < self.speed_down_ms {
            let s = t / self.speed_down_ms;
            let b = self.speed_down_factor_b;
            let decay = 1.0 - (1.0 - s).powf(self.speed_down_factor_a);
            let smooth = s * s * (3.0 - 2.0 * s);
            let x = self.speed_down_distance * (b * decay + (1.0 - b) * smooth);
            return (self.speed_up_distance + self.linear_distance + x).min(self.distance);
        }

        self.distance
    }
}

/// 三段式缓动曲线
#[derive(Debug, Clone, PartialEq)]
pub struct EaseCurve {
    speed_up_ratio: f64,
    speed_down_ratio: f64,
    speed_up_factor_a: f64,
    speed_down_factor_a: f64,
    max_total_ms: Option<u64>,
    plan: Option<EasePlan>,
}

impl Default for EaseCurve {
    fn default() -> Self {
        Self {
            speed_up_ratio: 0.0,
            speed_down_ratio: 0.0,
            speed_up_factor_a: DEFAULT_FACTOR,
            speed_down_factor_a: DEFAULT_FACTOR,
            max_total_ms: None,
            plan: None,
        }
    }
}

fn unit_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}

impl EaseCurve {
    /// 纯匀速曲线
    pub fn linear() -> Self {
        Self::default()
    }

    pub fn speed_up_ratio(&self) -> f64 {
        self.speed_up_ratio
    }

    pub fn speed_down_ratio(&self) -> f64 {
        self.speed_down_ratio
    }

    pub fn speed_up_factor(&self) -> f64 {
        self.speed_up_factor_a
    }

    pub fn speed_down_factor(&self) -> f64 {
        self.speed_down_factor_a
    }

    pub fn max_total_ms(&self) -> Option<u64> {
        self.max_total_ms
    }

    /// 最近一次规划结果
    pub fn last_plan(&self) -> Option<&EasePlan> {
        self.plan.as_ref()
    }

    /// 加速段占总行程的比例，限制在 [0, 1]
    pub fn set_speed_up_ratio(&mut self, ratio: f64) {
        self.speed_up_ratio = unit_ratio(ratio);
        self.plan = None;
    }

    /// 减速段占总行程的比例，限制在 [0, 1]
    pub fn set_speed_down_ratio(&mut self, ratio: f64) {
        self.speed_down_ratio = unit_ratio(ratio);
        self.plan = None;
    }

    /// 加速指数，至少为 1
    pub fn set_speed_up_factor(&mut self, factor: f64) {
        self.speed_up_factor_a = factor.max(1.0);
        self.plan = None;
    }

    /// 减速指数，至少为 1
    pub fn set_speed_down_factor(&mut self, factor: f64) {
        self.speed_down_factor_a = factor.max(1.0);
        self.plan = None;
    }

    /// 总时长上限，`None` 表示不限制
    pub fn set_max_total_ms(&mut self, max_total_ms: Option<u64>) {
        self.max_total_ms = max_total_ms;
        self.plan = None;
    }

    /// 实际使用的比例：两者之和超过 1 时按比例缩小
    fn effective_ratios(&self) -> (f64, f64) {
        let sum = self.speed_up_ratio + self.speed_down_ratio;
        if sum > 1.0 {
            (self.speed_up_ratio / sum, self.speed_down_ratio / sum)
        } else {
            (self.speed_up_ratio, self.speed_down_ratio)
        }
    }

    fn compute(&self, distance: f64, timing: Timing) -> EasePlan {
        let a = self.speed_up_factor_a;
        let c = self.speed_down_factor_a;
        let distance = if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        };
        let instant = EasePlan::instant(distance, a, c);
        if distance == 0.0 || self.max_total_ms == Some(0) {
            return instant;
        }

        let (r_up, r_down) = self.effective_ratios();
        let r_lin = (1.0 - r_up - r_down).max(0.0);
        // 相对纯匀速的时间系数
        let stretch = a * r_up + r_lin + c * r_down;

        let (speed, natural_total) = match timing {
            Timing::FixedDuration { total_ms: 0 } => return instant,
            Timing::FixedDuration { total_ms } => (distance * stretch / total_ms as f64, total_ms),
            Timing::FixedSpeed { units_per_ms } => {
                match speed_total_ms(distance, stretch, units_per_ms) {
                    Some(total) => (units_per_ms, total),
                    None => return instant,
                }
            }
        };

        let speed_up_distance = distance * r_up;
        let linear_distance = distance * r_lin;
        let speed_down_distance = distance * r_down;
        let mut plan = EasePlan {
            distance,
            linear_speed: speed,
            speed_up_distance,
            linear_distance,
            speed_down_distance,
            speed_up_ms: a * speed_up_distance / speed,
            linear_ms: linear_distance / speed,
            speed_down_ms: c * speed_down_distance / speed,
            speed_up_factor_a: a,
            speed_down_factor_a: c,
            speed_down_factor_b: 1.0,
            total_ms: natural_total,
        };

        if let Some(cap) = self.max_total_ms
            && natural_total > cap
        {
            plan.apply_cap(cap);
        }
        plan
    }
}

impl Curve for EaseCurve {
    fn plan(&mut self, distance: f64, timing: Timing) -> u64 {
        let plan = self.compute(distance, timing);
        self.plan = Some(plan);
        plan.total_ms
    }

    fn travel(&self, elapsed_ms: u64) -> f64 {
        match &self.plan {
            Some(plan) if elapsed_ms >= plan.total_ms => plan.distance,
            Some(plan) => plan.travel_at(elapsed_ms as f64),
            None => 0.0,
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
