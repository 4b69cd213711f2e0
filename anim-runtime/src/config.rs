//! # Config 模块
//!
//! 动画预设配置，集中管理各类动画的默认参数。
//!
//! ## 配置优先级
//!
//! 1. 调用方显式设置（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）
//!
//! 缺省字段按 `#[serde(default = ...)]` 补齐，因此配置文件只需写出要覆盖的项。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::kind::AnimationKind;
use crate::player::DEFAULT_TICK_INTERVAL_MS;

/// 动画配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// tick 间隔（毫秒）
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// 透明度淡入淡出（fade-alpha）
    #[serde(default = "PresetConfig::fade")]
    pub alpha: PresetConfig,

    /// 悬停高亮（fade-hot）
    #[serde(default = "PresetConfig::fade")]
    pub hot: PresetConfig,

    /// 宽高伸缩（fade-width / fade-height）
    #[serde(default = "PresetConfig::resize")]
    pub resize: PresetConfig,

    /// 滑入滑出（fade-in-out-x-* / fade-in-out-y-*）
    #[serde(default = "PresetConfig::slide")]
    pub slide: PresetConfig,
}

/// 单组动画预设
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    /// 总时长（毫秒）
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    /// 加速段占比 (0.0 - 1.0)
    #[serde(default = "default_speed_up_ratio")]
    pub speed_up_ratio: f64,

    /// 减速段占比 (0.0 - 1.0)
    #[serde(default = "default_speed_down_ratio")]
    pub speed_down_ratio: f64,

    /// 加速指数（≥ 1）
    #[serde(default = "default_factor")]
    pub speed_up_factor: f64,

    /// 减速指数（≥ 1）
    #[serde(default = "default_factor")]
    pub speed_down_factor: f64,

    /// 总时长上限（毫秒）
    #[serde(default)]
    pub max_total_ms: Option<u64>,
}

// 默认值函数
fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_duration_ms() -> u64 {
    250
}

fn default_speed_up_ratio() -> f64 {
    0.3
}

fn default_speed_down_ratio() -> f64 {
    0.7
}

fn default_factor() -> f64 {
    2.0
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            speed_up_ratio: default_speed_up_ratio(),
            speed_down_ratio: default_speed_down_ratio(),
            speed_up_factor: default_factor(),
            speed_down_factor: default_factor(),
            max_total_ms: None,
        }
    }
}

impl PresetConfig {
    /// 淡入淡出 / 悬停
    pub fn fade() -> Self {
        Self::default()
    }

    /// 宽高伸缩
    pub fn resize() -> Self {
        Self {
            duration_ms: 300,
            ..Self::default()
        }
    }

    /// 滑入滑出
    pub fn slide() -> Self {
        Self {
            duration_ms: 300,
            speed_up_ratio: 0.5,
            speed_down_ratio: 0.5,
            ..Self::default()
        }
    }

    fn validate(&self, group: &str) -> Result<(), ConfigError> {
        let ratios = [
            ("speed_up_ratio", self.speed_up_ratio),
            ("speed_down_ratio", self.speed_down_ratio),
        ];
        for (name, ratio) in ratios {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::validation(
                    format!("{group}.{name}"),
                    "必须在 0.0 - 1.0 之间",
                ));
            }
        }

        let factors = [
            ("speed_up_factor", self.speed_up_factor),
            ("speed_down_factor", self.speed_down_factor),
        ];
        for (name, factor) in factors {
            if !(factor.is_finite() && factor >= 1.0) {
                return Err(ConfigError::validation(
                    format!("{group}.{name}"),
                    "必须是不小于 1.0 的有限值",
                ));
            }
        }

        if self.max_total_ms == Some(0) {
            return Err(ConfigError::validation(
                format!("{group}.max_total_ms"),
                "不能为 0，不限制时请省略该项",
            ));
        }

        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            alpha: PresetConfig::fade(),
            hot: PresetConfig::fade(),
            resize: PresetConfig::resize(),
            slide: PresetConfig::slide(),
        }
    }
}

impl AnimationConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在、解析失败或校验不通过，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::from_file(path) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 严格读取配置文件
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 严格解析 JSON 并校验
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为格式化的 JSON
    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// 某类动画使用的预设
    pub fn preset(&self, kind: AnimationKind) -> &PresetConfig {
        match kind {
            AnimationKind::FadeAlpha => &self.alpha,
            AnimationKind::FadeHot => &self.hot,
            AnimationKind::FadeWidth | AnimationKind::FadeHeight => &self.resize,
            AnimationKind::FadeInOutXFromLeft
            | AnimationKind::FadeInOutXFromRight
            | AnimationKind::FadeInOutYFromTop
            | AnimationKind::FadeInOutYFromBottom => &self.slide,
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::validation("tick_interval_ms", "不能为 0"));
        }

        self.alpha.validate("alpha")?;
        self.hot.validate("hot")?;
        self.resize.validate("resize")?;
        self.slide.validate("slide")?;

        Ok(())
    }
}
