//! # 播放集成测试
//!
//! 通过虚拟时钟驱动 AnimationPlayer，检查采样序列与完成回调。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anim_runtime::{AnimationPlayer, Curve, EasingFunction, TimerQueue, TimerService, TweenCurve};

/// 记录采样 (时刻, 值) 与完成次数
struct Probe {
    samples: Rc<RefCell<Vec<(u64, i64)>>>,
    completions: Rc<Cell<u32>>,
}

impl Probe {
    fn attach<C: Curve>(player: &AnimationPlayer<C>, queue: &Rc<TimerQueue>) -> Self {
        let samples = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0));

        let s = samples.clone();
        let q = queue.clone();
        player.set_callback(move |value| s.borrow_mut().push((q.now_ms(), value)));

        let c = completions.clone();
        player.set_complete_callback(move || c.set(c.get() + 1));

        Self {
            samples,
            completions,
        }
    }

    fn values(&self) -> Vec<i64> {
        self.samples.borrow().iter().map(|(_, v)| *v).collect()
    }

    fn len(&self) -> usize {
        self.samples.borrow().len()
    }

    fn trace(&self) -> String {
        self.samples
            .borrow()
            .iter()
            .map(|(t, v)| format!("{t} {v}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn setup() -> (Rc<TimerQueue>, AnimationPlayer) {
    let queue = Rc::new(TimerQueue::new());
    let player = AnimationPlayer::new(queue.clone());
    (queue, player)
}

fn linear(player: &AnimationPlayer, from: i64, to: i64, total_ms: u64) {
    player.set_start_value(from);
    player.set_end_value(to);
    player.set_total_millis(total_ms);
}

fn eased(player: &AnimationPlayer, from: i64, to: i64, total_ms: u64) {
    linear(player, from, to, total_ms);
    player.set_speed_up_ratio(0.3);
    player.set_speed_down_ratio(0.7);
}

/// 纯线性：0→100，100ms
#[test]
fn test_linear_scenario() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    assert_eq!(probe.values(), vec![0]);

    queue.advance(50);
    assert_eq!(player.current_value(), 50);
    assert_eq!(player.elapsed_millis(), 50);
    assert_eq!(probe.completions.get(), 0);

    queue.advance(50);
    assert_eq!(player.current_value(), 100);
    assert_eq!(probe.completions.get(), 1);
    assert!(!player.is_playing());
    assert!(queue.is_idle());

    // 完成后不再有任何回调
    let len = probe.len();
    queue.advance(500);
    assert_eq!(probe.len(), len);
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_reverse_mid_flight_trace() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(40);
    player.reverse_continue();
    queue.run_until_idle(10, 1_000);

    let mut trace = probe.trace();
    trace.push_str(&format!("\ncompletions {}", probe.completions.get()));
    insta::assert_snapshot!(trace, @r"
    0 0
    10 10
    20 20
    30 30
    40 40
    40 40
    50 36
    60 32
    70 28
    80 24
    90 20
    100 16
    110 12
    120 8
    130 4
    140 0
    completions 1
    ");
}

#[test]
fn test_owner_dropped_mid_flight() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(10);
    let len = probe.len();

    drop(player);
    queue.advance(200);
    assert_eq!(probe.len(), len);
    assert_eq!(probe.completions.get(), 0);
    assert!(queue.is_idle());
}

#[test]
fn test_restart_yields_single_completion() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(30);
    player.start();
    assert_eq!(queue.pending(), 1);
    assert_eq!(player.current_value(), 0);

    queue.advance(100);
    assert_eq!(player.current_value(), 100);
    assert_eq!(probe.completions.get(), 1);

    // 重新开始后的采样从起点重新计时，只有一条 tick 流
    let after_restart: Vec<_> = probe.samples.borrow()[4..]
        .iter()
        .map(|(t, _)| *t)
        .collect();
    assert_eq!(
        after_restart,
        vec![30, 40, 50, 60, 70, 80, 90, 100, 110, 120, 130]
    );
}

#[test]
fn test_redundant_stop_never_completes() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(20);
    player.stop();
    player.stop();
    queue.advance(200);
    assert_eq!(probe.completions.get(), 0);
    assert_eq!(player.current_value(), 20);

    player.start();
    queue.advance(100);
    player.stop();
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_double_reverse_restores_direction() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(30);
    player.reverse_continue();
    assert!(player.is_reversed());
    assert_eq!((player.start_value(), player.end_value()), (100, 0));

    queue.advance(20);
    let turning_point = player.current_value();
    assert!(turning_point < 30);

    player.reverse_continue();
    assert!(!player.is_reversed());
    assert_eq!((player.start_value(), player.end_value()), (0, 100));
    assert_eq!(player.current_value(), turning_point);

    queue.run_until_idle(10, 1_000);
    assert_eq!(player.current_value(), 100);
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_reverse_when_idle_plays_back() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(100);
    assert_eq!(player.current_value(), 100);

    player.reverse_continue();
    assert_eq!(player.current_value(), 100);
    queue.advance(50);
    assert_eq!(player.current_value(), 50);
    queue.advance(50);
    assert_eq!(player.current_value(), 0);
    assert_eq!(probe.completions.get(), 2);

    player.reverse_continue();
    queue.advance(100);
    assert_eq!(player.current_value(), 100);
    assert!(!player.is_reversed());
}

#[test]
fn test_reentrant_start_from_completion() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    let weak = player.downgrade();
    let completions = probe.completions.clone();
    player.set_complete_callback(move || {
        completions.set(completions.get() + 1);
        if completions.get() == 1
            && let Some(player) = weak.upgrade()
        {
            player.start();
        }
    });

    player.start();
    queue.advance(100);
    assert_eq!(probe.completions.get(), 1);
    assert!(player.is_playing());
    assert_eq!(player.current_value(), 0);

    queue.advance(100);
    assert_eq!(probe.completions.get(), 2);
    assert!(!player.is_playing());
    assert_eq!(player.current_value(), 100);
    assert!(queue.is_idle());
}

#[test]
fn test_restart_from_play_callback_skips_stale_completion() {
    let (queue, player) = setup();
    let completions = Rc::new(Cell::new(0));
    linear(&player, 0, 100, 100);

    let weak = player.downgrade();
    let restarted = Rc::new(Cell::new(false));
    let r = restarted.clone();
    player.set_callback(move |value| {
        if value == 100
            && !r.get()
            && let Some(player) = weak.upgrade()
        {
            r.set(true);
            player.start();
        }
    });
    let c = completions.clone();
    player.set_complete_callback(move || c.set(c.get() + 1));

    player.start();
    queue.advance(100);
    assert!(restarted.get());
    assert_eq!(completions.get(), 0);
    assert!(player.is_playing());

    queue.advance(100);
    assert_eq!(completions.get(), 1);
}

#[test]
fn test_clear_inside_play_callback() {
    let (queue, player) = setup();
    let completions = Rc::new(Cell::new(0));
    linear(&player, 0, 100, 100);

    let weak = player.downgrade();
    player.set_callback(move |value| {
        if value >= 50
            && let Some(player) = weak.upgrade()
        {
            player.clear();
        }
    });
    let c = completions.clone();
    player.set_complete_callback(move || c.set(c.get() + 1));

    player.start();
    queue.advance(200);
    assert_eq!(completions.get(), 0);
    assert!(!player.is_playing());
    assert_eq!(player.end_value(), 0);
    assert!(queue.is_idle());
}

#[test]
fn test_hard_cap() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    eased(&player, 0, 255, 250);
    player.set_max_total_millis(Some(150));

    player.start();
    queue.advance(150);
    assert_eq!(player.current_value(), 255);
    assert_eq!(player.total_millis(), 150);
    assert_eq!(probe.completions.get(), 1);
    assert!(!player.is_playing());

    let values = probe.values();
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
}

#[test]
fn test_eased_samples_are_monotonic() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    eased(&player, 0, 255, 250);

    player.start();
    queue.run_until_idle(10, 1_000);

    let values = probe.values();
    assert_eq!(values.first(), Some(&0));
    assert_eq!(values.last(), Some(&255));
    assert!(values.windows(2).all(|w| w[0] <= w[1]), "{values:?}");
    // 加速段起步比匀速慢
    assert!(values[1] < 255 / 25);
}

#[test]
fn test_decreasing_samples_are_monotonic() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    eased(&player, 255, 0, 250);

    player.start();
    queue.run_until_idle(10, 1_000);

    let values = probe.values();
    assert_eq!(values.first(), Some(&255));
    assert_eq!(values.last(), Some(&0));
    assert!(values.windows(2).all(|w| w[0] >= w[1]), "{values:?}");
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_degenerate_cycles_complete_synchronously() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);

    // 起止相同
    linear(&player, 40, 40, 100);
    player.start();
    assert_eq!(probe.values(), vec![40]);
    assert_eq!(probe.completions.get(), 1);
    assert!(!player.is_playing());
    assert!(queue.is_idle());

    // 时长为 0
    linear(&player, 0, 80, 0);
    player.start();
    assert_eq!(player.current_value(), 80);
    assert_eq!(probe.completions.get(), 2);

    // 速度非法
    player.set_linear_speed(0.0);
    player.start();
    assert_eq!(player.current_value(), 80);
    assert_eq!(probe.completions.get(), 3);
}

#[test]
fn test_reconfigure_while_playing() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(50);
    player.set_end_value(200);

    // 按新距离重新规划，已用时间继续累计
    queue.advance(10);
    assert_eq!(player.current_value(), 120);
    queue.advance(40);
    assert_eq!(player.current_value(), 200);
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_tick_interval_controls_sample_rate() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);
    player.set_tick_interval(25);

    player.start();
    queue.run_until_idle(25, 1_000);
    assert_eq!(probe.values(), vec![0, 25, 50, 75, 100]);
}

#[test]
fn test_first_run_clears_once_playback_starts() {
    let (queue, player) = setup();
    linear(&player, 0, 10, 10);
    assert!(player.is_first_run());

    player.start();
    assert!(!player.is_first_run());
    queue.advance(10);
    assert!(!player.is_first_run());

    // reset 保留，init 恢复
    player.reset();
    assert!(!player.is_first_run());
    player.init();
    assert!(player.is_first_run());

    player.reverse_continue();
    assert!(!player.is_first_run());
}

#[test]
fn test_reverse_after_stop_departs_from_current_value() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    player.start();
    queue.advance(30);
    player.stop();
    assert_eq!(player.current_value(), 30);

    player.reverse_continue();
    assert_eq!(player.current_value(), 30);
    queue.advance(50);
    assert_eq!(player.current_value(), 15);
    queue.advance(50);
    assert_eq!(player.current_value(), 0);
    assert_eq!(probe.completions.get(), 1);
}

#[test]
fn test_resume_after_stop() {
    let (queue, player) = setup();
    linear(&player, 0, 100, 100);
    player.set_linear_speed(1.0);

    player.start();
    queue.advance(40);
    player.stop();

    player.resume();
    assert_eq!(player.current_value(), 40);
    queue.advance(60);
    assert_eq!(player.current_value(), 100);
    assert!(!player.is_playing());

    // 已在终点时从起始值重新开始
    player.resume();
    assert_eq!(player.current_value(), 0);
}

#[test]
fn test_huge_tick_interval() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, 0, 100, 100);

    queue.advance(5);
    player.set_tick_interval(u64::MAX);
    player.start();
    assert_eq!(probe.values(), vec![0]);

    // 下一次 tick 远在时钟范围之外
    queue.advance(1_000);
    assert!(player.is_playing());
    assert_eq!(player.current_value(), 0);

    player.stop();
    assert!(queue.is_idle());
}

#[test]
fn test_extreme_values() {
    let (queue, player) = setup();
    let probe = Probe::attach(&player, &queue);
    linear(&player, i64::MIN, i64::MAX, 100);

    player.start();
    queue.run_until_idle(10, 1_000);
    let values = probe.values();
    assert_eq!(values.first(), Some(&i64::MIN));
    assert_eq!(values.last(), Some(&i64::MAX));
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(probe.completions.get(), 1);

    // 中途反向同样不会溢出
    player.start();
    queue.advance(50);
    player.reverse_continue();
    queue.run_until_idle(10, 1_000);
    assert_eq!(player.current_value(), i64::MIN);
    assert_eq!(probe.completions.get(), 2);
}

#[test]
fn test_tween_curve_player() {
    let queue = Rc::new(TimerQueue::new());
    let player =
        AnimationPlayer::with_curve(queue.clone(), TweenCurve::new(EasingFunction::EaseInQuad));
    let probe = Probe::attach(&player, &queue);
    player.set_end_value(100);
    player.set_total_millis(100);

    player.start();
    queue.advance(50);
    assert_eq!(player.current_value(), 25);
    queue.advance(50);
    assert_eq!(player.current_value(), 100);
    assert_eq!(probe.completions.get(), 1);
}
