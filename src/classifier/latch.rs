use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// One-deep handoff from the INT1 interrupt handler to the polling task.
///
/// `signal` is the only writer of the timestamp fields and runs in interrupt
/// context; `take` is the only reader of `pending` outside it. A knock that
/// lands between two `take` calls is seen by exactly one of them.
pub struct KnockLatch {
    pending: AtomicBool,
    seen: AtomicBool,
    last_accept_ms: AtomicU32,
    refractory_ms: u32,
}

impl KnockLatch {
    pub const fn new(refractory_ms: u32) -> Self {
        Self {
            pending: AtomicBool::new(false),
            seen: AtomicBool::new(false),
            last_accept_ms: AtomicU32::new(0),
            refractory_ms,
        }
    }

    /// Records an edge unless it falls inside the refractory window of the last
    /// accepted one. Returns whether it was accepted.
    pub fn signal(&self, now_ms: u32) -> bool {
        if self.seen.load(Ordering::Relaxed) {
            let since = now_ms.wrapping_sub(self.last_accept_ms.load(Ordering::Relaxed));
            if since < self.refractory_ms {
                return false;
            }
        }
        self.last_accept_ms.store(now_ms, Ordering::Relaxed);
        self.seen.store(true, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
        true
    }

    /// Read-and-clear in one step.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::KnockLatch;

    #[test]
    fn take_clears_pending() {
        let latch = KnockLatch::new(300);
        assert!(!latch.take());

        assert!(latch.signal(10));
        assert!(latch.is_pending());
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn edges_inside_refractory_window_are_dropped() {
        let latch = KnockLatch::new(300);
        assert!(latch.signal(1_000));
        assert!(latch.take());

        assert!(!latch.signal(1_100));
        assert!(!latch.signal(1_299));
        assert!(!latch.take());

        assert!(latch.signal(1_300));
        assert!(latch.take());
    }

    #[test]
    fn several_edges_before_take_collapse_to_one() {
        let latch = KnockLatch::new(0);
        assert!(latch.signal(1));
        assert!(latch.signal(2));
        assert!(latch.take());
        assert!(!latch.take());
    }

    #[test]
    fn refractory_survives_counter_wrap() {
        let latch = KnockLatch::new(300);
        assert!(latch.signal(u32::MAX - 100));
        assert!(!latch.signal(50));
        assert!(latch.signal(250));
    }

    #[test]
    fn shared_across_threads() {
        static LATCH: KnockLatch = KnockLatch::new(0);
        let producer = std::thread::spawn(|| {
            for now_ms in 0..1_000 {
                LATCH.signal(now_ms);
            }
        });
        let mut taken = 0;
        while !producer.is_finished() || LATCH.is_pending() {
            if LATCH.take() {
                taken += 1;
            }
        }
        producer.join().expect("producer");
        assert!(taken >= 1);
        assert!(!LATCH.is_pending());
    }
}
