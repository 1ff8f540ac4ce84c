/// One-shot tasks that become due after a delay, on the caller's tick loop.
#[derive(Clone, Debug)]
pub struct DeferredQueue<T> {
    now: f64,
    seq: u64,
    tasks: Vec<(f64, u64, T)>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            now: 0.0,
            seq: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T> DeferredQueue<T> {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay_secs` have elapsed. A zero delay fires on the next advance.
    pub fn schedule(&mut self, delay_secs: f64, task: T) {
        let due = self.now + delay_secs.max(0.0);
        self.tasks.push((due, self.seq, task));
        self.seq += 1;
    }

    /// Advance the clock and take every due task, earliest first.
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        self.now += dt.max(0.0);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.0 <= now);
        self.tasks = pending;
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        due.into_iter().map(|(_, _, t)| t).collect()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
