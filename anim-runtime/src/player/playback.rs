use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use super::{CompleteCallback, DEFAULT_TICK_INTERVAL_MS, PlayCallback};
use crate::curve::{Curve, EaseCurve, Timing};
use crate::timer::{CancelFlag, Repeat, TimerCallback, TimerService};

struct PlayerInner<C> {
    timer: Rc<dyn TimerService>,
    curve: C,

    start_value: i64,
    end_value: i64,
    current_value: i64,
    /// 当前周期的出发点（反向时可能是中途的当前值）
    origin_value: i64,

    timing: Timing,
    /// 当前周期规划出的总时长，`None` 表示下次 tick 需要重新规划
    planned_total_ms: Option<u64>,
    elapsed_ms: u64,
    tick_interval_ms: u64,
    start_timestamp_ms: u64,

    playing: bool,
    /// 尚未开始过任何周期（`init()` 后恢复为 true）
    first_run: bool,
    reversed: bool,

    /// 周期计数，用于识别过期的完成
    cycle: u64,
    cancel: CancelFlag,

    play_callback: Option<PlayCallback>,
    complete_callback: Option<CompleteCallback>,
}

impl<C: Curve> PlayerInner<C> {
    fn new(timer: Rc<dyn TimerService>, curve: C) -> Self {
        Self {
            timer,
            curve,
            start_value: 0,
            end_value: 0,
            current_value: 0,
            origin_value: 0,
            timing: Timing::default(),
            planned_total_ms: None,
            elapsed_ms: 0,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            start_timestamp_ms: 0,
            playing: false,
            first_run: true,
            reversed: false,
            cycle: 0,
            cancel: CancelFlag::new(),
            play_callback: None,
            complete_callback: None,
        }
    }

    /// 取消定时器并结束当前周期，不触发任何回调
    fn halt(&mut self) {
        self.cancel.cancel();
        self.playing = false;
        self.cycle = self.cycle.wrapping_add(1);
    }

    fn rewind(&mut self) {
        self.halt();
        self.planned_total_ms = None;
        self.elapsed_ms = 0;
        self.start_timestamp_ms = 0;
    }

    /// 惰性规划当前周期
    fn planned_total(&mut self) -> u64 {
        if let Some(total) = self.planned_total_ms {
            return total;
        }
        let distance = self.origin_value.abs_diff(self.end_value) as f64;
        let total = self.curve.plan(distance, self.timing);
        debug!(distance, total_ms = total, "规划动画周期");
        self.planned_total_ms = Some(total);
        total
    }

    /// 当前值是否停在起止值之间（播放中，或中途被停止）
    fn is_mid_flight(&self) -> bool {
        let lo = self.start_value.min(self.end_value);
        let hi = self.start_value.max(self.end_value);
        self.playing || (lo < self.current_value && self.current_value < hi)
    }

    /// 按曲线采样，结果限制在 [origin, end] 区间内
    fn sample(&self) -> i64 {
        let travel = self.curve.travel(self.elapsed_ms).round() as i64;
        let value = if self.end_value >= self.origin_value {
            self.origin_value.saturating_add(travel)
        } else {
            self.origin_value.saturating_sub(travel)
        };
        let lo = self.origin_value.min(self.end_value);
        let hi = self.origin_value.max(self.end_value);
        value.clamp(lo, hi)
    }
}

/// 动画播放器
///
/// 单线程、基于定时器回调驱动。所有方法都接受 `&self`，
/// 因此可以在播放/完成回调中通过 [`WeakPlayer`] 重新操作同一个播放器。
///
/// 拥有型句柄（由 `new`/`with_curve` 创建）被 drop 时会取消定时器；
/// 通过 [`WeakPlayer::upgrade`] 得到的句柄不拥有播放器。
pub struct AnimationPlayer<C: Curve = EaseCurve> {
    inner: Rc<RefCell<PlayerInner<C>>>,
    owner: bool,
}

/// 播放器的弱引用
pub struct WeakPlayer<C: Curve = EaseCurve> {
    inner: Weak<RefCell<PlayerInner<C>>>,
}

impl<C: Curve> Clone for WeakPlayer<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Curve> WeakPlayer<C> {
    /// 播放器仍然存活时返回一个非拥有句柄
    pub fn upgrade(&self) -> Option<AnimationPlayer<C>> {
        self.inner.upgrade().map(|inner| AnimationPlayer {
            inner,
            owner: false,
        })
    }
}

impl<C: Curve> fmt::Debug for WeakPlayer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakPlayer")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl AnimationPlayer<EaseCurve> {
    /// 使用默认曲线（匀速）创建播放器
    pub fn new(timer: Rc<dyn TimerService>) -> Self {
        Self::with_curve(timer, EaseCurve::default())
    }
}

impl<C: Curve> AnimationPlayer<C> {
    /// 使用指定曲线创建播放器
    pub fn with_curve(timer: Rc<dyn TimerService>, curve: C) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PlayerInner::new(timer, curve))),
            owner: true,
        }
    }

    /// 创建弱引用，供回调引用自身
    pub fn downgrade(&self) -> WeakPlayer<C> {
        WeakPlayer {
            inner: Rc::downgrade(&self.inner),
        }
    }

    // ========== 生命周期 ==========

    /// 恢复初始状态
    ///
    /// 数值清零、`first_run` 置回 true、取消定时器、曲线参数恢复默认。
    /// 回调和 tick 间隔保留。
    pub fn init(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.rewind();
        inner.start_value = 0;
        inner.end_value = 0;
        inner.current_value = 0;
        inner.origin_value = 0;
        inner.timing = Timing::default();
        inner.first_run = true;
        inner.reversed = false;
        inner.curve.reset();
    }

    /// 回到周期开始前的状态，保留起止值、时长模型和曲线参数
    pub fn reset(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.rewind();
        inner.current_value = inner.start_value;
        inner.origin_value = inner.start_value;
    }

    /// 取消定时器、丢弃回调并恢复初始状态
    ///
    /// 可以在任何状态下调用，包括回调内部。
    pub fn clear(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.play_callback = None;
            inner.complete_callback = None;
        }
        self.init();
    }

    /// 从起始值开始播放
    ///
    /// 正在播放时相当于重新开始。注册周期 tick 后立即同步采样一次。
    pub fn start(&self) {
        let origin = self.inner.borrow().start_value;
        self.launch(origin);
    }

    /// 停止播放，当前值保持不变，不触发完成回调
    pub fn stop(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.playing {
            debug!(current = inner.current_value, "停止播放");
        }
        inner.halt();
    }

    /// 按当前方向从起始值播放到结束值
    pub fn continue_play(&self) {
        self.start();
    }

    /// 朝结束值继续播放
    ///
    /// 当前值停在起止值之间时从当前值出发，否则等同于 [`start`](Self::start)。
    pub fn resume(&self) {
        let origin = {
            let inner = self.inner.borrow();
            if inner.is_mid_flight() {
                inner.current_value
            } else {
                inner.start_value
            }
        };
        self.launch(origin);
    }

    /// 交换起止值并播放
    ///
    /// 播放中或中途停止时，新周期从当前值出发，避免跳变。
    pub fn reverse_continue(&self) {
        let origin = {
            let mut inner = self.inner.borrow_mut();
            let inner = &mut *inner;
            std::mem::swap(&mut inner.start_value, &mut inner.end_value);
            inner.reversed = !inner.reversed;
            if inner.is_mid_flight() {
                inner.current_value
            } else {
                inner.start_value
            }
        };
        self.launch(origin);
    }

    fn launch(&self, origin: i64) {
        let (timer, token, interval_ms) = {
            let mut inner = self.inner.borrow_mut();
            inner.rewind();
            inner.origin_value = origin;
            inner.current_value = origin;
            inner.playing = true;
            inner.first_run = false;
            inner.start_timestamp_ms = inner.timer.now_ms();
            debug!(
                origin,
                end = inner.end_value,
                reversed = inner.reversed,
                now_ms = inner.start_timestamp_ms,
                "开始播放"
            );
            (
                inner.timer.clone(),
                inner.cancel.token(),
                inner.tick_interval_ms,
            )
        };

        let weak = Rc::downgrade(&self.inner);
        let callback: TimerCallback = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                play_tick(&inner);
            }
        });
        timer.add_timer(token, callback, interval_ms, Repeat::Forever);

        play_tick(&self.inner);
    }

    // ========== 配置 ==========

    /// 修改会影响当前周期的参数
    ///
    /// 播放中也允许修改：记录警告，下一次 tick 重新规划，已用时间继续累计。
    fn reconfigure<R>(
        &self,
        field: &'static str,
        apply: impl FnOnce(&mut PlayerInner<C>) -> R,
    ) -> R {
        let mut inner = self.inner.borrow_mut();
        if inner.playing {
            warn!(field, "播放中修改动画参数，下一次 tick 生效");
        }
        inner.planned_total_ms = None;
        apply(&mut *inner)
    }

    /// 设置起始值；未播放时当前值也停在起始值
    pub fn set_start_value(&self, value: i64) {
        self.reconfigure("start_value", |inner| {
            inner.start_value = value;
            inner.origin_value = value;
            if !inner.playing {
                inner.current_value = value;
            }
        });
    }

    pub fn set_end_value(&self, value: i64) {
        self.reconfigure("end_value", |inner| inner.end_value = value);
    }

    /// 固定总时长模型
    pub fn set_total_millis(&self, total_ms: u64) {
        self.reconfigure("total_millis", |inner| {
            inner.timing = Timing::FixedDuration { total_ms };
        });
    }

    /// 固定速度模型（单位/毫秒）
    pub fn set_linear_speed(&self, units_per_ms: f64) {
        self.reconfigure("linear_speed", |inner| {
            inner.timing = Timing::FixedSpeed { units_per_ms };
        });
    }

    pub fn set_timing(&self, timing: Timing) {
        self.reconfigure("timing", |inner| inner.timing = timing);
    }

    /// 修改曲线参数
    pub fn update_curve<R>(&self, update: impl FnOnce(&mut C) -> R) -> R {
        self.reconfigure("curve", |inner| update(&mut inner.curve))
    }

    /// 读取曲线
    pub fn with_curve_ref<R>(&self, read: impl FnOnce(&C) -> R) -> R {
        read(&self.inner.borrow().curve)
    }

    /// tick 间隔，下一个周期生效（至少 1ms）
    pub fn set_tick_interval(&self, interval_ms: u64) {
        self.inner.borrow_mut().tick_interval_ms = interval_ms.max(1);
    }

    pub fn set_first_run(&self, first_run: bool) {
        self.inner.borrow_mut().first_run = first_run;
    }

    /// 设置播放回调
    pub fn set_callback(&self, callback: impl Fn(i64) + 'static) {
        self.inner.borrow_mut().play_callback = Some(Rc::new(callback));
    }

    /// 设置完成回调
    pub fn set_complete_callback(&self, callback: impl Fn() + 'static) {
        self.inner.borrow_mut().complete_callback = Some(Rc::new(callback));
    }

    // ========== 查询 ==========

    pub fn start_value(&self) -> i64 {
        self.inner.borrow().start_value
    }

    pub fn end_value(&self) -> i64 {
        self.inner.borrow().end_value
    }

    pub fn current_value(&self) -> i64 {
        self.inner.borrow().current_value
    }

    pub fn elapsed_millis(&self) -> u64 {
        self.inner.borrow().elapsed_ms
    }

    /// 总时长：已规划的周期取规划值，否则取配置的固定时长（固定速度模型下为 0）
    pub fn total_millis(&self) -> u64 {
        let inner = self.inner.borrow();
        match (inner.planned_total_ms, inner.timing) {
            (Some(total), _) => total,
            (None, Timing::FixedDuration { total_ms }) => total_ms,
            (None, Timing::FixedSpeed { .. }) => 0,
        }
    }

    pub fn timing(&self) -> Timing {
        self.inner.borrow().timing
    }

    pub fn tick_interval(&self) -> u64 {
        self.inner.borrow().tick_interval_ms
    }

    pub fn is_playing(&self) -> bool {
        self.inner.borrow().playing
    }

    pub fn is_first_run(&self) -> bool {
        self.inner.borrow().first_run
    }

    pub fn is_reversed(&self) -> bool {
        self.inner.borrow().reversed
    }
}

/// 一次 tick：采样、调用播放回调，到达终点时完成
fn play_tick<C: Curve>(cell: &Rc<RefCell<PlayerInner<C>>>) {
    let (cycle, value, finished, play_callback) = {
        let Ok(mut guard) = cell.try_borrow_mut() else {
            trace!("播放器正忙，跳过本次 tick");
            return;
        };
        let inner = &mut *guard;
        if !inner.playing {
            return;
        }

        inner.elapsed_ms = inner.timer.now_ms().saturating_sub(inner.start_timestamp_ms);
        let total = inner.planned_total();
        let finished = inner.elapsed_ms >= total;
        inner.current_value = if finished {
            inner.end_value
        } else {
            inner.sample()
        };
        trace!(
            elapsed_ms = inner.elapsed_ms,
            value = inner.current_value,
            "动画采样"
        );

        (
            inner.cycle,
            inner.current_value,
            finished,
            inner.play_callback.clone(),
        )
    };

    if let Some(callback) = play_callback {
        callback(value);
    }
    if finished {
        complete(cell, cycle);
    }
}

/// 结束周期：取消定时器 → playing = false → 最后调用完成回调
fn complete<C: Curve>(cell: &Rc<RefCell<PlayerInner<C>>>, cycle: u64) {
    let complete_callback = {
        let Ok(mut inner) = cell.try_borrow_mut() else {
            return;
        };
        // 播放回调内重新开始、停止或清空过
        if inner.cycle != cycle || !inner.playing {
            trace!("忽略过期的完成");
            return;
        }
        inner.cancel.cancel();
        inner.playing = false;
        debug!(end = inner.end_value, elapsed_ms = inner.elapsed_ms, "动画完成");
        inner.complete_callback.clone()
    };

    if let Some(callback) = complete_callback {
        callback();
    }
}

impl<C: Curve> Drop for AnimationPlayer<C> {
    fn drop(&mut self) {
        if self.owner
            && let Ok(mut inner) = self.inner.try_borrow_mut()
        {
            inner.halt();
        }
    }
}

impl<C: Curve> fmt::Debug for AnimationPlayer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Ok(inner) = self.inner.try_borrow() else {
            return f.write_str("AnimationPlayer { <borrowed> }");
        };
        f.debug_struct("AnimationPlayer")
            .field("start_value", &inner.start_value)
            .field("end_value", &inner.end_value)
            .field("current_value", &inner.current_value)
            .field("timing", &inner.timing)
            .field("elapsed_ms", &inner.elapsed_ms)
            .field("playing", &inner.playing)
            .field("reversed", &inner.reversed)
            .field("curve", &inner.curve)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::TimerQueue;

    fn player() -> (Rc<TimerQueue>, AnimationPlayer) {
        let queue = Rc::new(TimerQueue::new());
        let player = AnimationPlayer::new(queue.clone());
        (queue, player)
    }

    #[test]
    fn test_defaults() {
        let (_queue, player) = player();
        assert_eq!(player.tick_interval(), DEFAULT_TICK_INTERVAL_MS);
        assert_eq!(player.total_millis(), 0);
        assert!(!player.is_playing());
        assert!(player.is_first_run());
        assert!(!player.is_reversed());
    }

    #[test]
    fn test_start_samples_synchronously() {
        let (queue, player) = player();
        player.set_start_value(10);
        player.set_end_value(20);
        player.set_total_millis(100);

        player.start();
        assert!(player.is_playing());
        assert_eq!(player.current_value(), 10);
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn test_stop_keeps_current_value() {
        let (queue, player) = player();
        player.set_end_value(100);
        player.set_total_millis(100);
        player.start();
        queue.advance(30);

        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.current_value(), 30);
        assert!(queue.is_idle());

        queue.advance(100);
        assert_eq!(player.current_value(), 30);
    }

    #[test]
    fn test_init_restores_defaults_but_keeps_interval() {
        let (queue, player) = player();
        player.set_tick_interval(16);
        player.set_start_value(5);
        player.set_end_value(50);
        player.set_total_millis(100);
        player.update_curve(|c| c.set_speed_up_ratio(0.5));
        player.set_first_run(false);
        player.reverse_continue();

        player.init();
        assert_eq!(player.start_value(), 0);
        assert_eq!(player.end_value(), 0);
        assert_eq!(player.current_value(), 0);
        assert_eq!(player.timing(), Timing::FixedDuration { total_ms: 0 });
        assert_eq!(player.tick_interval(), 16);
        assert!(player.is_first_run());
        assert!(!player.is_reversed());
        assert!(!player.is_playing());
        assert_eq!(player.with_curve_ref(|c| c.speed_up_ratio()), 0.0);
        assert!(queue.is_idle());

        // 幂等
        player.init();
        assert_eq!(player.current_value(), 0);
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let (queue, player) = player();
        player.set_start_value(5);
        player.set_end_value(50);
        player.set_total_millis(100);
        player.update_curve(|c| c.set_speed_down_ratio(0.4));
        player.set_first_run(false);
        player.start();
        queue.advance(40);

        player.reset();
        assert!(!player.is_playing());
        assert_eq!(player.start_value(), 5);
        assert_eq!(player.end_value(), 50);
        assert_eq!(player.current_value(), 5);
        assert_eq!(player.elapsed_millis(), 0);
        assert_eq!(player.total_millis(), 100);
        assert!(!player.is_first_run());
        assert_eq!(player.with_curve_ref(|c| c.speed_down_ratio()), 0.4);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_clear_drops_callbacks() {
        let (queue, player) = player();
        let calls = Rc::new(std::cell::Cell::new(0));
        let c = calls.clone();
        player.set_callback(move |_| c.set(c.get() + 1));
        player.set_end_value(10);
        player.set_total_millis(50);

        player.clear();
        player.set_end_value(10);
        player.set_total_millis(50);
        player.start();
        queue.advance(100);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_linear_speed_model() {
        let (queue, player) = player();
        player.set_end_value(100);
        player.set_linear_speed(2.0);
        assert_eq!(player.total_millis(), 0);

        player.start();
        assert_eq!(player.total_millis(), 50);
        queue.advance(20);
        assert_eq!(player.current_value(), 40);
        queue.advance(30);
        assert_eq!(player.current_value(), 100);
        assert!(!player.is_playing());
    }

    #[test]
    fn test_weak_handle_does_not_stop_on_drop() {
        let (queue, player) = player();
        player.set_end_value(100);
        player.set_total_millis(100);
        player.start();

        let weak = player.downgrade();
        drop(weak.upgrade());
        assert!(player.is_playing());

        queue.advance(20);
        assert_eq!(player.current_value(), 20);
    }

    #[test]
    fn test_dropping_owner_cancels_timer() {
        let (queue, player) = player();
        player.set_end_value(100);
        player.set_total_millis(100);
        player.start();
        let weak = player.downgrade();

        drop(player);
        assert!(weak.upgrade().is_none());
        assert!(queue.is_idle());
    }
}
