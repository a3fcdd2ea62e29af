//! 模拟动作
//!
//! 动作是零参数、无返回值的异步工作单元（如“创建一个客户”）。
//! 注册时即确定类型，调度时无需任何运行期类型判断。

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

type ActionFn = dyn Fn() -> BoxFuture<'static, ()> + Send + Sync;

/// 可被调度循环调用的动作句柄
///
/// 克隆开销只是一次引用计数，动作本身归其所属生产者所有。
#[derive(Clone)]
pub struct Action {
    name: &'static str,
    run: Arc<ActionFn>,
}

impl Action {
    pub fn new<F, Fut>(name: &'static str, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            run: Arc::new(move || f().boxed()),
        }
    }

    /// 绑定到某个生产者的方法上
    ///
    /// ```ignore
    /// let create = Action::bind("customer.create", customer_svc, |svc| async move {
    ///     svc.create_customer().await
    /// });
    /// ```
    pub fn bind<S, F, Fut>(name: &'static str, target: Arc<S>, f: F) -> Self
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::new(name, move || f(Arc::clone(&target)))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 执行一次动作
    pub fn invoke(&self) -> BoxFuture<'static, ()> {
        (self.run)()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}
