//! 页面访问计数器
//!
//! 每次页面访问在派发前递增一次，与动作最终成功与否无关。

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use shop_shared::observability::metrics::page_impressions_counter;

/// 单调递增的页面访问计数器
///
/// 本地原子值供进程内读取，同时同步到 Prometheus 计数器供外部抓取。
/// Prometheus 句柄在构造时从当时的 recorder 解析，之后递增不再查表。
pub struct ImpressionCounter {
    count: AtomicU64,
    exported: metrics::Counter,
}

impl ImpressionCounter {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            exported: page_impressions_counter(),
        }
    }

    /// 单次原子递增，不持有任何锁
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.exported.increment(1);
    }

    pub fn value(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for ImpressionCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImpressionCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImpressionCounter")
            .field("count", &self.value())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_increment() {
        let counter = ImpressionCounter::new();
        assert_eq!(counter.value(), 0);

        counter.increment();
        counter.increment();
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_concurrent_increments_not_lost() {
        let counter = Arc::new(ImpressionCounter::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..10_000 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counter.value(), 80_000);
    }

    #[test]
    fn test_mirrored_to_prometheus() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        // 句柄在构造时解析，之后的递增无需 recorder 处于作用域内
        let counter = ::metrics::with_local_recorder(&recorder, ImpressionCounter::new);
        for _ in 0..5 {
            counter.increment();
        }

        assert_eq!(counter.value(), 5);
        assert!(
            handle
                .render()
                .contains("owlshop_page_impressions_simulated_total 5")
        );
    }
}
