//! 默认曲线的便捷设置

use super::AnimationPlayer;
use crate::config::PresetConfig;
use crate::curve::EaseCurve;

impl AnimationPlayer<EaseCurve> {
    /// 加速段占比 [0, 1]
    pub fn set_speed_up_ratio(&self, ratio: f64) {
        self.update_curve(|c| c.set_speed_up_ratio(ratio));
    }

    /// 减速段占比 [0, 1]
    pub fn set_speed_down_ratio(&self, ratio: f64) {
        self.update_curve(|c| c.set_speed_down_ratio(ratio));
    }

    pub fn set_speed_up_factor(&self, factor: f64) {
        self.update_curve(|c| c.set_speed_up_factor(factor));
    }

    pub fn set_speed_down_factor(&self, factor: f64) {
        self.update_curve(|c| c.set_speed_down_factor(factor));
    }

    /// 总时长上限，`None` 表示不限制
    pub fn set_max_total_millis(&self, max_total_ms: Option<u64>) {
        self.update_curve(|c| c.set_max_total_ms(max_total_ms));
    }

    /// 应用一组预设：时长、比例、指数和上限
    pub fn apply_preset(&self, preset: &PresetConfig) {
        self.set_total_millis(preset.duration_ms);
        self.update_curve(|c| {
            c.set_speed_up_ratio(preset.speed_up_ratio);
            c.set_speed_down_ratio(preset.speed_down_ratio);
            c.set_speed_up_factor(preset.speed_up_factor);
            c.set_speed_down_factor(preset.speed_down_factor);
            c.set_max_total_ms(preset.max_total_ms);
        });
    }
}
