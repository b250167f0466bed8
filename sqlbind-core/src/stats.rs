use std::sync::{
    Arc, LazyLock,
    atomic::{AtomicU64, Ordering},
};

/// Diagnostic counters, they never influence query behavior.
#[derive(Debug, Default)]
pub struct Stats {
    statements: AtomicU64,
    prepares: AtomicU64,
    executions: AtomicU64,
}

/// Point in time copy of [`Stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub statements: u64,
    pub prepares: u64,
    pub executions: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide counters, used when no other instance is injected.
    pub fn global() -> Arc<Stats> {
        static GLOBAL: LazyLock<Arc<Stats>> = LazyLock::new(|| Arc::new(Stats::new()));
        GLOBAL.clone()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            statements: self.statements.load(Ordering::Relaxed),
            prepares: self.prepares.load(Ordering::Relaxed),
            executions: self.executions.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn statement_created(&self) {
        self.statements.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn prepare_issued(&self) {
        self.prepares.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn execution_issued(&self) {
        self.executions.fetch_add(1, Ordering::Relaxed);
    }
}
