//! 命令中间件（Command Middleware）
//!
//! 以"洋葱"方式包裹命令处理器：先注册的中间件位于最外层。
//! 对于按 `[A, B, C]` 注册的中间件，调用顺序为
//! `A 前 → B 前 → C 前 → handler → C 后 → B 后 → A 后`；
//! 任一中间件返回错误（不调用 `next`）即短路，内层不再执行。
//!
//! 内置中间件：
//! - [`LoggingMiddleware`]：记录开始/结束，不吞错误；
//! - [`ValidationMiddleware`]：按命令名称查找校验器，失败即拒绝；
//! - [`PerformanceMiddleware`]：每次分发恰好记录一次耗时指标，慢命令额外告警；
//! - [`CacheInvalidationMiddleware`]：命令成功后失效相关查询缓存。
//!
mod invalidation;
mod logging;
mod performance;
mod validation;

pub use invalidation::CacheInvalidationMiddleware;
pub use logging::LoggingMiddleware;
pub use performance::{
    CommandMetric, CommandStats, InMemoryMetrics, MetricsSink, PerformanceMiddleware,
    TracingMetricsSink,
};
pub use validation::ValidationMiddleware;

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::command::Command;
use crate::envelope::CommandEnvelope;
use crate::error::AppResult;
use crate::registry::TypeKey;

/// 类型擦除后的处理器输出
pub type BoxAnySend = Box<dyn Any + Send>;

pub(crate) type HandlerFuture<'a> = BoxFuture<'a, AppResult<BoxAnySend>>;

/// 类型擦除后的处理函数（命令与查询共用）
pub(crate) type ErasedHandlerFn =
    Arc<dyn for<'a> Fn(&'a (dyn Any + Send + Sync)) -> HandlerFuture<'a> + Send + Sync>;

/// 以 `for<'a>` 约束包装闭包，确保闭包签名被推断为高阶生命周期
pub(crate) fn erase_handler_fn<F>(f: F) -> ErasedHandlerFn
where
    F: for<'a> Fn(&'a (dyn Any + Send + Sync)) -> HandlerFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 一次命令调用的只读视图（在中间件之间传递）
#[derive(Clone, Copy)]
pub struct CommandCall<'a> {
    pub name: &'static str,
    pub type_key: TypeKey,
    pub invalidates: &'static [&'static str],
    pub envelope: &'a CommandEnvelope,
    command: &'a (dyn Any + Send + Sync),
}

impl<'a> CommandCall<'a> {
    pub fn new<C: Command>(cmd: &'a C) -> Self {
        Self {
            name: C::NAME,
            type_key: TypeKey::of::<C>(),
            invalidates: C::INVALIDATES,
            envelope: cmd.envelope(),
            command: cmd,
        }
    }

    /// 还原为具体命令类型
    pub fn downcast<C: Command>(&self) -> Option<&'a C> {
        self.command.downcast_ref::<C>()
    }

    pub(crate) fn as_any(&self) -> &'a (dyn Any + Send + Sync) {
        self.command
    }
}

/// 剩余的中间件链 + 最终处理器
pub struct Next<'a> {
    chain: &'a [Arc<dyn CommandMiddleware>],
    handler: &'a ErasedHandlerFn,
}

impl<'a> Next<'a> {
    pub(crate) fn new(chain: &'a [Arc<dyn CommandMiddleware>], handler: &'a ErasedHandlerFn) -> Self {
        Self { chain, handler }
    }

    /// 调用下一层；链为空时调用处理器
    pub fn run(self, call: CommandCall<'a>) -> HandlerFuture<'a> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(
                call,
                Next {
                    chain: rest,
                    handler: self.handler,
                },
            ),
            None => (self.handler)(call.as_any()),
        }
    }
}

#[async_trait]
pub trait CommandMiddleware: Send + Sync {
    /// 中间件名称（用于日志与诊断）
    fn name(&self) -> &'static str;

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::validation::FieldError;
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    struct Recording {
        label: &'static str,
        trace: Trace,
        fail: bool,
    }

    #[async_trait]
    impl CommandMiddleware for Recording {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
            self.trace.lock().unwrap().push(format!("{}-before", self.label));
            if self.fail {
                return Err(AppError::CommandValidation {
                    command: call.name,
                    errors: vec![FieldError::new("x", "rejected")],
                });
            }
            let out = next.run(call).await;
            self.trace.lock().unwrap().push(format!("{}-after", self.label));
            out
        }
    }

    struct Ping {
        envelope: CommandEnvelope,
    }

    impl Command for Ping {
        const NAME: &'static str = "Ping";
        type Output = ();

        fn envelope(&self) -> &CommandEnvelope {
            &self.envelope
        }
    }

    fn recording_handler(trace: Trace) -> ErasedHandlerFn {
        erase_handler_fn(move |_cmd| {
            let trace = trace.clone();
            Box::pin(async move {
                trace.lock().unwrap().push("handler".to_string());
                Ok(Box::new(()) as BoxAnySend)
            })
        })
    }

    fn chain(trace: &Trace, failing: Option<&'static str>) -> Vec<Arc<dyn CommandMiddleware>> {
        ["A", "B", "C"]
            .into_iter()
            .map(|label| {
                Arc::new(Recording {
                    label,
                    trace: trace.clone(),
                    fail: failing == Some(label),
                }) as Arc<dyn CommandMiddleware>
            })
            .collect()
    }

    #[tokio::test]
    async fn onion_order_on_success() {
        let trace: Trace = Arc::default();
        let middlewares = chain(&trace, None);
        let handler = recording_handler(trace.clone());
        let cmd = Ping {
            envelope: CommandEnvelope::default(),
        };

        Next::new(&middlewares, &handler)
            .run(CommandCall::new(&cmd))
            .await
            .unwrap();

        assert_eq!(
            *trace.lock().unwrap(),
            vec!["A-before", "B-before", "C-before", "handler", "C-after", "B-after", "A-after"]
        );
    }

    #[tokio::test]
    async fn innermost_short_circuit_truncates() {
        let trace: Trace = Arc::default();
        let middlewares = chain(&trace, Some("C"));
        let handler = recording_handler(trace.clone());
        let cmd = Ping {
            envelope: CommandEnvelope::default(),
        };

        let err = Next::new(&middlewares, &handler)
            .run(CommandCall::new(&cmd))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::CommandValidation { command: "Ping", .. }));
        assert_eq!(
            *trace.lock().unwrap(),
            vec!["A-before", "B-before", "C-before", "B-after", "A-after"]
        );
    }

    #[tokio::test]
    async fn empty_chain_calls_handler_directly() {
        let trace: Trace = Arc::default();
        let handler = recording_handler(trace.clone());
        let cmd = Ping {
            envelope: CommandEnvelope::default(),
        };

        Next::new(&[], &handler).run(CommandCall::new(&cmd)).await.unwrap();
        assert_eq!(*trace.lock().unwrap(), vec!["handler"]);
    }

    #[test]
    fn call_downcasts_to_its_own_type_only() {
        struct Other {
            envelope: CommandEnvelope,
        }
        impl Command for Other {
            const NAME: &'static str = "Other";
            type Output = ();
            fn envelope(&self) -> &CommandEnvelope {
                &self.envelope
            }
        }

        let cmd = Ping {
            envelope: CommandEnvelope::default(),
        };
        let call = CommandCall::new(&cmd);
        assert!(call.downcast::<Ping>().is_some());
        assert!(call.downcast::<Other>().is_none());
    }
}
