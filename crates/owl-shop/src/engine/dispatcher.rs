//! 页面访问调度循环
//!
//! 每个间隔内连续派发 `request_rate` 次页面访问，然后休眠一个间隔。
//! 每次访问在独立的 tokio 任务中选择并执行一个动作，调度循环从不等待动作完成：
//! 发出的速率是精确的，完成的速率取决于下游生产者的延迟。
//! 在途任务数量没有上限，也没有排队或背压。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::{debug, error, info};

use super::action::Action;
use super::chooser::Chooser;
use super::counter::ImpressionCounter;
use crate::error::EngineError;

/// 调度循环配置，构造后不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    request_rate: u32,
    request_rate_interval: Duration,
}

impl SimulationConfig {
    pub fn new(request_rate: u32, request_rate_interval: Duration) -> Result<Self, EngineError> {
        if request_rate == 0 {
            return Err(EngineError::InvalidSimulationConfig(
                "request_rate 必须大于 0".to_string(),
            ));
        }
        if request_rate_interval.is_zero() {
            return Err(EngineError::InvalidSimulationConfig(
                "request_rate_interval 必须大于 0".to_string(),
            ));
        }
        Ok(Self {
            request_rate,
            request_rate_interval,
        })
    }

    pub fn request_rate(&self) -> u32 {
        self.request_rate
    }

    pub fn request_rate_interval(&self) -> Duration {
        self.request_rate_interval
    }
}

/// 动作 panic 时的处理函数，参数为失败描述
pub type FatalHandler = Arc<dyn Fn(&str) + Send + Sync>;

/// 默认处理：记录错误后终止进程
fn exit_process() -> FatalHandler {
    Arc::new(|reason: &str| {
        error!(reason, "页面访问执行失败，进程终止");
        std::process::exit(1);
    })
}

/// 页面访问调度器
pub struct ImpressionDispatcher {
    config: SimulationConfig,
    chooser: Arc<Chooser<Action>>,
    counter: Arc<ImpressionCounter>,
    on_fatal: FatalHandler,
}

impl ImpressionDispatcher {
    pub fn new(
        config: SimulationConfig,
        chooser: Arc<Chooser<Action>>,
        counter: Arc<ImpressionCounter>,
    ) -> Self {
        Self {
            config,
            chooser,
            counter,
            on_fatal: exit_process(),
        }
    }

    /// 替换致命错误处理函数（测试中用于观察而非退出）
    pub fn with_fatal_handler(mut self, on_fatal: FatalHandler) -> Self {
        self.on_fatal = on_fatal;
        self
    }

    pub fn counter(&self) -> &Arc<ImpressionCounter> {
        &self.counter
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// 持续运行，直到进程被外部终止
    pub async fn run(&self) {
        info!(
            request_rate = self.config.request_rate,
            interval = ?self.config.request_rate_interval,
            "开始模拟页面访问"
        );
        loop {
            self.tick();
            tokio::time::sleep(self.config.request_rate_interval).await;
        }
    }

    /// 只运行指定数量的间隔
    pub async fn run_ticks(&self, ticks: u64) {
        info!(
            request_rate = self.config.request_rate,
            interval = ?self.config.request_rate_interval,
            ticks,
            "开始模拟页面访问"
        );
        for _ in 0..ticks {
            self.tick();
            tokio::time::sleep(self.config.request_rate_interval).await;
        }
        info!(impressions = self.counter.value(), "模拟结束");
    }

    /// 一个间隔：连续派发 `request_rate` 次访问，无抖动
    pub fn tick(&self) {
        for _ in 0..self.config.request_rate {
            self.counter.increment();
            self.dispatch_impression();
        }
        debug!(total = self.counter.value(), "本轮页面访问已派发");
    }

    /// 派发一次页面访问，不等待其完成
    pub fn dispatch_impression(&self) {
        let chooser = Arc::clone(&self.chooser);
        let on_fatal = Arc::clone(&self.on_fatal);

        tokio::spawn(async move {
            let action = chooser.pick().clone();
            let name = action.name();

            let outcome = AssertUnwindSafe(async move { action.invoke().await })
                .catch_unwind()
                .await;

            if let Err(panic) = outcome {
                let reason = format!("动作 {} panic: {}", name, panic_message(panic.as_ref()));
                on_fatal(&reason);
            }
        });
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::chooser::Choice;
    use parking_lot::Mutex;

    async fn explode() {
        panic!("publish invariant broken")
    }

    fn noop_chooser() -> Arc<Chooser<Action>> {
        Arc::new(Chooser::new(vec![Choice::new(Action::new("noop", || async {}), 1)]).unwrap())
    }

    #[test]
    fn test_simulation_config_validation() {
        assert!(SimulationConfig::new(0, Duration::from_secs(1)).is_err());
        assert!(SimulationConfig::new(10, Duration::ZERO).is_err());

        let config = SimulationConfig::new(10, Duration::from_millis(500)).unwrap();
        assert_eq!(config.request_rate(), 10);
        assert_eq!(config.request_rate_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");

        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[tokio::test]
    async fn test_tick_issues_exact_rate() {
        let config = SimulationConfig::new(25, Duration::from_millis(10)).unwrap();
        let counter = Arc::new(ImpressionCounter::new());
        let dispatcher = ImpressionDispatcher::new(config, noop_chooser(), Arc::clone(&counter));

        dispatcher.tick();
        assert_eq!(counter.value(), 25);
        dispatcher.tick();
        assert_eq!(counter.value(), 50);
    }

    #[tokio::test]
    async fn test_panicking_action_reaches_fatal_handler() {
        let chooser = Arc::new(
            Chooser::new(vec![Choice::new(
                Action::new("explode", explode),
                1,
            )])
            .unwrap(),
        );
        let reasons = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&reasons);

        let config = SimulationConfig::new(1, Duration::from_millis(10)).unwrap();
        let dispatcher =
            ImpressionDispatcher::new(config, chooser, Arc::new(ImpressionCounter::new()))
                .with_fatal_handler(Arc::new(move |reason: &str| {
                    sink.lock().push(reason.to_string())
                }));

        dispatcher.tick();
        for _ in 0..20 {
            if !reasons.lock().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let reasons = reasons.lock();
        assert_eq!(reasons.len(), 1);
        assert!(reasons[0].contains("explode"));
        assert!(reasons[0].contains("publish invariant broken"));
        // 计数发生在派发之前，失败的访问同样计入
        assert_eq!(dispatcher.counter().value(), 1);
    }
}
