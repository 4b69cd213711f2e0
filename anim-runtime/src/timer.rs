//! # Timer 模块
//!
//! 播放引擎与定时器服务之间的边界。
//!
//! 引擎从不自己计时，只消费一个 [`TimerService`]：
//! - `now_ms()`：当前时钟（毫秒）
//! - `add_timer()`：注册一个与取消令牌绑定的周期回调
//!
//! ## 取消模型
//!
//! ```text
//! CancelFlag (Rc<()>，由播放器持有)
//!     │ token()
//!     ▼
//! CancelToken (Weak<()>，交给定时器服务)
//! ```
//!
//! `CancelFlag::cancel()` 或播放器被销毁都会让已发出的令牌失效，
//! 定时器服务在调用回调前检查令牌，失效的回调永远不会再被调用。
//!
//! [`TimerQueue`] 是一个确定性的虚拟时钟实现，由宿主（或测试）
//! 通过 `advance()` 推进时间。

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

/// 定时器回调
pub type TimerCallback = Rc<dyn Fn()>;

/// 取消标志
///
/// 持有强引用的一方。调用 [`cancel`](Self::cancel) 后，
/// 之前通过 [`token`](Self::token) 发出的所有令牌都会失效。
#[derive(Debug, Default)]
pub struct CancelFlag {
    alive: Rc<()>,
}

impl CancelFlag {
    /// 创建新的取消标志
    pub fn new() -> Self {
        Self::default()
    }

    /// 发出一个绑定到当前代的令牌
    pub fn token(&self) -> CancelToken {
        CancelToken {
            alive: Rc::downgrade(&self.alive),
        }
    }

    /// 使已发出的全部令牌失效
    pub fn cancel(&mut self) {
        self.alive = Rc::new(());
    }

    /// 是否存在仍然有效的令牌
    pub fn has_outstanding(&self) -> bool {
        Rc::weak_count(&self.alive) > 0
    }
}

/// 取消令牌（弱引用）
#[derive(Debug, Clone)]
pub struct CancelToken {
    alive: Weak<()>,
}

impl CancelToken {
    /// 令牌是否已失效
    pub fn is_cancelled(&self) -> bool {
        self.alive.strong_count() == 0
    }
}

/// 重复次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// 一直重复，直到令牌失效
    Forever,
    /// 重复指定次数
    Times(u32),
}

/// 定时器服务
///
/// 由宿主的消息循环实现。所有调用都发生在同一个线程上。
pub trait TimerService {
    /// 当前时钟（毫秒）
    fn now_ms(&self) -> u64;

    /// 注册周期回调
    ///
    /// 第一次回调发生在 `interval_ms` 之后。令牌失效后不得再调用 `callback`。
    fn add_timer(
        &self,
        token: CancelToken,
        callback: TimerCallback,
        interval_ms: u64,
        repeat: Repeat,
    );
}

struct TimerEntry {
    id: u64,
    token: CancelToken,
    callback: TimerCallback,
    interval_ms: u64,
    due_ms: u64,
    remaining: Option<u32>,
}

/// 虚拟时钟定时器队列
///
/// 时间只在调用 [`advance`](Self::advance) 时前进；到期的回调按到期时间
/// （相同时按注册顺序）依次触发，触发时 `now_ms()` 等于该回调的到期时刻。
/// 回调内可以重新注册或取消定时器。
pub struct TimerQueue {
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    entries: RefCell<Vec<TimerEntry>>,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TimerQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now_ms", &self.now_ms.get())
            .field("pending", &self.entries.borrow().len())
            .finish()
    }
}

impl TimerQueue {
    /// 创建时钟为 0 的队列
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            next_id: Cell::new(1),
            entries: RefCell::new(Vec::new()),
        }
    }

    /// 有效的定时器数量
    pub fn pending(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| !e.token.is_cancelled())
            .count()
    }

    /// 是否没有有效的定时器
    pub fn is_idle(&self) -> bool {
        self.pending() == 0
    }

    /// 推进时钟并触发期间到期的回调
    ///
    /// # 返回
    /// 触发的回调次数
    pub fn advance(&self, delta_ms: u64) -> usize {
        let target = self.now_ms.get().saturating_add(delta_ms);
        let mut fired = 0;

        while let Some(callback) = self.pop_due(target) {
            // 调用回调时不持有 entries 的借用，回调可以重入 add_timer
            callback();
            fired += 1;
        }

        self.now_ms.set(target);
        fired
    }

    /// 一直推进，直到没有有效定时器或超过 `limit_ms`
    ///
    /// # 返回
    /// 实际推进的时长
    pub fn run_until_idle(&self, step_ms: u64, limit_ms: u64) -> u64 {
        let step = step_ms.max(1);
        let mut advanced = 0;
        while !self.is_idle() && advanced < limit_ms {
            let delta = step.min(limit_ms - advanced);
            self.advance(delta);
            advanced += delta;
        }
        advanced
    }

    /// 取出下一个不晚于 `target` 的回调，并更新其下次到期时间
    fn pop_due(&self, target: u64) -> Option<TimerCallback> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|e| !e.token.is_cancelled());

        let index = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= target)
            .min_by_key(|(_, e)| (e.due_ms, e.id))
            .map(|(i, _)| i)?;

        let entry = &mut entries[index];
        self.now_ms.set(entry.due_ms);
        let callback = entry.callback.clone();
        trace!(timer = entry.id, now_ms = entry.due_ms, "定时器触发");

        let exhausted = match entry.remaining.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                *left == 0
            }
            None => false,
        };
        // 下次到期超出时钟范围的定时器不会再触发
        let next_due = entry.due_ms.checked_add(entry.interval_ms);
        if let Some(next_due) = next_due {
            entry.due_ms = next_due;
        }
        if exhausted || next_due.is_none() {
            entries.remove(index);
        }

        Some(callback)
    }
}

impl TimerService for TimerQueue {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn add_timer(
        &self,
        token: CancelToken,
        callback: TimerCallback,
        interval_ms: u64,
        repeat: Repeat,
    ) {
        let remaining = match repeat {
            Repeat::Forever => None,
            Repeat::Times(0) => return,
            Repeat::Times(n) => Some(n),
        };
        // 间隔为 0 会让 advance 原地打转
        let interval_ms = interval_ms.max(1);

        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push(TimerEntry {
            id,
            token,
            callback,
            interval_ms,
            due_ms: self.now_ms.get().saturating_add(interval_ms),
            remaining,
        });
    }
}
