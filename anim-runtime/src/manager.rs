//! # Manager 模块
//!
//! 每个控件持有一个 [`AnimationManager`]：按 [`AnimationKind`] 索引的固定槽位表，
//! 每个槽位最多一个播放器（`None` 表示未启用）。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut manager = AnimationManager::new(timer);
//! manager.set_fade_alpha(true);
//! manager.set_fade_hot(true);
//!
//! manager.appear(&widget);       // 透明度 0 -> 255
//! manager.mouse_enter(&widget);  // 悬停高亮
//! manager.disappear(&widget);    // 反向播放，完成后隐藏
//! ```
//!
//! 采样值通过 [`Animatable`] 交给控件，控件以弱引用持有，
//! 控件销毁后回调不再生效。

use std::rc::{Rc, Weak};

use tracing::debug;

use crate::config::{AnimationConfig, PresetConfig};
use crate::kind::AnimationKind;
use crate::player::AnimationPlayer;
use crate::timer::TimerService;

/// 透明度动画的取值上限
pub const ALPHA_MAX: i64 = 255;

/// 可动画对象接口
///
/// 控件实现此 trait 接收采样值，自行决定如何使用（透明度、尺寸、偏移……）。
pub trait Animatable {
    /// 应用某类动画的当前值
    fn apply(&self, kind: AnimationKind, value: i64);

    /// 显示/隐藏控件
    fn set_visible(&self, _visible: bool) {}
}

/// 动画管理器
pub struct AnimationManager {
    timer: Rc<dyn TimerService>,
    config: AnimationConfig,
    players: [Option<AnimationPlayer>; AnimationKind::COUNT],
}

impl std::fmt::Debug for AnimationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationManager")
            .field("enabled", &self.enabled_kinds())
            .field("animating", &self.is_animating())
            .finish()
    }
}

impl AnimationManager {
    /// 使用默认配置创建
    pub fn new(timer: Rc<dyn TimerService>) -> Self {
        Self::with_config(timer, AnimationConfig::default())
    }

    pub fn with_config(timer: Rc<dyn TimerService>, config: AnimationConfig) -> Self {
        Self {
            timer,
            config,
            players: std::array::from_fn(|_| None),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// 替换配置，并重新应用到已启用的播放器
    pub fn set_config(&mut self, config: AnimationConfig) {
        self.config = config;
        for kind in AnimationKind::ALL {
            if let Some(player) = &self.players[kind.index()] {
                Self::configure(&self.config, kind, player);
            }
        }
    }

    /// 某类动画使用的预设
    pub fn preset(&self, kind: AnimationKind) -> &PresetConfig {
        self.config.preset(kind)
    }

    // ========== 槽位 ==========

    /// 查找播放器，不会创建
    pub fn get_player(&self, kind: AnimationKind) -> Option<&AnimationPlayer> {
        self.players[kind.index()].as_ref()
    }

    /// 启用或禁用某类动画
    ///
    /// # 返回
    /// - 启用：该类型的播放器（首次启用时创建并按预设配置）
    /// - 禁用：`None`，已有的播放器被取消并销毁
    pub fn set_enabled(&mut self, kind: AnimationKind, enable: bool) -> Option<&AnimationPlayer> {
        let slot = &mut self.players[kind.index()];
        if !enable {
            if slot.take().is_some() {
                debug!(kind = %kind, "禁用动画");
            }
            return None;
        }

        if slot.is_none() {
            let player = AnimationPlayer::new(self.timer.clone());
            Self::configure(&self.config, kind, &player);
            if matches!(kind, AnimationKind::FadeAlpha | AnimationKind::FadeHot) {
                player.set_start_value(0);
                player.set_end_value(ALPHA_MAX);
            }
            debug!(kind = %kind, "启用动画");
            *slot = Some(player);
        }
        slot.as_ref()
    }

    /// 应用 tick 间隔与预设，不改变起止值
    fn configure(config: &AnimationConfig, kind: AnimationKind, player: &AnimationPlayer) {
        player.set_tick_interval(config.tick_interval_ms);
        player.apply_preset(config.preset(kind));
    }

    pub fn set_fade_hot(&mut self, enable: bool) -> Option<&AnimationPlayer> {
        self.set_enabled(AnimationKind::FadeHot, enable)
    }

    pub fn set_fade_alpha(&mut self, enable: bool) -> Option<&AnimationPlayer> {
        self.set_enabled(AnimationKind::FadeAlpha, enable)
    }

    /// 宽度伸缩，起止值由控件设置
    pub fn set_fade_width(&mut self, enable: bool) -> Option<&AnimationPlayer> {
        self.set_enabled(AnimationKind::FadeWidth, enable)
    }

    /// 高度伸缩，起止值由控件设置
    pub fn set_fade_height(&mut self, enable: bool) -> Option<&AnimationPlayer> {
        self.set_enabled(AnimationKind::FadeHeight, enable)
    }

    /// 水平滑入滑出；启用一个方向会禁用另一个方向
    pub fn set_fade_in_out_x(
        &mut self,
        enable: bool,
        from_right: bool,
    ) -> Option<&AnimationPlayer> {
        let kind = if from_right {
            AnimationKind::FadeInOutXFromRight
        } else {
            AnimationKind::FadeInOutXFromLeft
        };
        self.set_slide(kind, enable)
    }

    /// 垂直滑入滑出；启用一个方向会禁用另一个方向
    pub fn set_fade_in_out_y(
        &mut self,
        enable: bool,
        from_bottom: bool,
    ) -> Option<&AnimationPlayer> {
        let kind = if from_bottom {
            AnimationKind::FadeInOutYFromBottom
        } else {
            AnimationKind::FadeInOutYFromTop
        };
        self.set_slide(kind, enable)
    }

    fn set_slide(&mut self, kind: AnimationKind, enable: bool) -> Option<&AnimationPlayer> {
        if enable && let Some(opposite) = kind.opposite_slide() {
            self.set_enabled(opposite, false);
        }
        self.set_enabled(kind, enable)
    }

    /// 取消并销毁全部播放器
    pub fn clear(&mut self) {
        for slot in &mut self.players {
            slot.take();
        }
        debug!("清空动画");
    }

    // ========== 查询 ==========

    /// 已启用的类型
    pub fn enabled_kinds(&self) -> Vec<AnimationKind> {
        AnimationKind::ALL
            .into_iter()
            .filter(|kind| self.players[kind.index()].is_some())
            .collect()
    }

    /// 是否有播放器正在播放
    pub fn is_animating(&self) -> bool {
        self.players.iter().flatten().any(AnimationPlayer::is_playing)
    }

    // ========== 驱动 ==========

    /// 显示控件并播放全部显示类动画
    ///
    /// # 返回
    /// 开始播放的播放器数量
    pub fn appear<T: Animatable + 'static>(&self, target: &Rc<T>) -> usize {
        target.set_visible(true);
        let mut launched = 0;
        for (kind, player) in self.visibility_players() {
            bind(player, kind, target);
            // 覆盖上一次 disappear 留下的隐藏回调
            player.set_complete_callback(|| {});
            if drive(player, false) {
                launched += 1;
            }
        }
        launched
    }

    /// 反向播放全部显示类动画，结束后隐藏控件
    ///
    /// 没有需要播放的动画时立即隐藏。
    pub fn disappear<T: Animatable + 'static>(&self, target: &Rc<T>) -> usize {
        let mut launched = 0;
        for (kind, player) in self.visibility_players() {
            bind(player, kind, target);
            let weak = Rc::downgrade(target);
            player.set_complete_callback(move || {
                if let Some(target) = weak.upgrade() {
                    target.set_visible(false);
                }
            });
            if drive(player, true) {
                launched += 1;
            }
        }
        if launched == 0 {
            target.set_visible(false);
        }
        launched
    }

    /// 悬停高亮
    pub fn mouse_enter<T: Animatable + 'static>(&self, target: &Rc<T>) -> bool {
        self.drive_hot(target, false)
    }

    /// 取消悬停高亮
    pub fn mouse_leave<T: Animatable + 'static>(&self, target: &Rc<T>) -> bool {
        self.drive_hot(target, true)
    }

    fn drive_hot<T: Animatable + 'static>(&self, target: &Rc<T>, toward_reversed: bool) -> bool {
        let Some(player) = self.get_player(AnimationKind::FadeHot) else {
            return false;
        };
        bind(player, AnimationKind::FadeHot, target);
        drive(player, toward_reversed)
    }

    fn visibility_players(&self) -> impl Iterator<Item = (AnimationKind, &AnimationPlayer)> {
        AnimationKind::ALL
            .into_iter()
            .filter(|kind| kind.is_visibility())
            .filter_map(|kind| self.get_player(kind).map(|player| (kind, player)))
    }
}

/// 把播放器的采样值转发给控件
fn bind<T: Animatable + 'static>(player: &AnimationPlayer, kind: AnimationKind, target: &Rc<T>) {
    let weak: Weak<T> = Rc::downgrade(target);
    player.set_callback(move |value| {
        if let Some(target) = weak.upgrade() {
            target.apply(kind, value);
        }
    });
}

/// 让播放器朝指定方向播放
///
/// 方向不同时原地反向；方向相同且未到达终点时继续播放（中途停止的从当前值出发）；
/// 正在朝该方向播放或已停在终点时不做任何事。
fn drive(player: &AnimationPlayer, toward_reversed: bool) -> bool {
    if player.is_reversed() != toward_reversed {
        player.reverse_continue();
        true
    } else if !player.is_playing() && player.current_value() != player.end_value() {
        player.resume();
        true
    } else {
        false
    }
}
