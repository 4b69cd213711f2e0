//! # Kind 模块
//!
//! 动画类型：一个控件上每种类型最多对应一个播放器。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimError;

/// 动画类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationKind {
    /// 透明度淡入淡出
    FadeAlpha,
    /// 悬停高亮
    FadeHot,
    /// 宽度伸缩
    FadeWidth,
    /// 高度伸缩
    FadeHeight,
    /// 从左侧水平滑入
    FadeInOutXFromLeft,
    /// 从右侧水平滑入
    FadeInOutXFromRight,
    /// 从顶部垂直滑入
    FadeInOutYFromTop,
    /// 从底部垂直滑入
    FadeInOutYFromBottom,
}

impl AnimationKind {
    /// 类型数量
    pub const COUNT: usize = 8;

    /// 全部类型，顺序与 [`index`](Self::index) 一致
    pub const ALL: [AnimationKind; Self::COUNT] = [
        AnimationKind::FadeAlpha,
        AnimationKind::FadeHot,
        AnimationKind::FadeWidth,
        AnimationKind::FadeHeight,
        AnimationKind::FadeInOutXFromLeft,
        AnimationKind::FadeInOutXFromRight,
        AnimationKind::FadeInOutYFromTop,
        AnimationKind::FadeInOutYFromBottom,
    ];

    /// 在注册表中的槽位
    pub fn index(self) -> usize {
        self as usize
    }

    /// 稳定名称（kebab-case），用于配置和命令行
    pub fn name(self) -> &'static str {
        match self {
            AnimationKind::FadeAlpha => "fade-alpha",
            AnimationKind::FadeHot => "fade-hot",
            AnimationKind::FadeWidth => "fade-width",
            AnimationKind::FadeHeight => "fade-height",
            AnimationKind::FadeInOutXFromLeft => "fade-in-out-x-from-left",
            AnimationKind::FadeInOutXFromRight => "fade-in-out-x-from-right",
            AnimationKind::FadeInOutYFromTop => "fade-in-out-y-from-top",
            AnimationKind::FadeInOutYFromBottom => "fade-in-out-y-from-bottom",
        }
    }

    /// 同一坐标轴上方向相反的滑动类型
    pub fn opposite_slide(self) -> Option<AnimationKind> {
        match self {
            AnimationKind::FadeInOutXFromLeft => Some(AnimationKind::FadeInOutXFromRight),
            AnimationKind::FadeInOutXFromRight => Some(AnimationKind::FadeInOutXFromLeft),
            AnimationKind::FadeInOutYFromTop => Some(AnimationKind::FadeInOutYFromBottom),
            AnimationKind::FadeInOutYFromBottom => Some(AnimationKind::FadeInOutYFromTop),
            _ => None,
        }
    }

    /// 是否由显示/隐藏驱动（悬停高亮除外）
    pub fn is_visibility(self) -> bool {
        self != AnimationKind::FadeHot
    }
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationKind {
    type Err = AnimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| AnimError::UnknownKind {
                name: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in AnimationKind::ALL.into_iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_names() {
        for kind in AnimationKind::ALL {
            assert_eq!(kind.name().parse::<AnimationKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }

        let err = "fade-rainbow".parse::<AnimationKind>().unwrap_err();
        assert!(matches!(err, AnimError::UnknownKind { ref name } if name == "fade-rainbow"));
    }

    #[test]
    fn test_serde_uses_kebab_names() {
        let json = serde_json::to_string(&AnimationKind::FadeInOutYFromBottom).unwrap();
        assert_eq!(json, r#""fade-in-out-y-from-bottom""#);
    }

    #[test]
    fn test_opposite_slide() {
        assert_eq!(
            AnimationKind::FadeInOutXFromLeft.opposite_slide(),
            Some(AnimationKind::FadeInOutXFromRight)
        );
        assert_eq!(
            AnimationKind::FadeInOutYFromBottom.opposite_slide(),
            Some(AnimationKind::FadeInOutYFromTop)
        );
        assert_eq!(AnimationKind::FadeAlpha.opposite_slide(), None);
    }
}
