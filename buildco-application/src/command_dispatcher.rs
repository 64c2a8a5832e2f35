use std::any::type_name;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::command::Command;
use crate::command_bus::CommandBus;
use crate::command_handler::CommandHandler;
use crate::config::DispatcherConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::{
    BoxAnySend, CommandCall, CommandMiddleware, ErasedHandlerFn, Next, erase_handler_fn,
};
use crate::registry::{HandlerRegistry, TypeKey};
use crate::result::ExecutionResult;

/// 进程内命令分发器
///
/// - 以 `Command::NAME` 注册处理器，运行时以类型擦除方式调度；
/// - 处理器在任何中间件运行之前解析，未注册的命令立即以 `HandlerNotFound` 失败；
/// - 中间件按添加顺序由外到内包裹处理器。
pub struct CommandDispatcher {
    handlers: HandlerRegistry<ErasedHandlerFn>,
    middlewares: Vec<Arc<dyn CommandMiddleware>>,
    timeout: Option<Duration>,
}

impl Default for CommandDispatcher {
    fn default() -> Self {
        Self::new(&DispatcherConfig::default())
    }
}

impl CommandDispatcher {
    pub fn new(config: &DispatcherConfig) -> Self {
        Self {
            handlers: HandlerRegistry::new("command", config.allow_handler_override),
            middlewares: Vec::new(),
            timeout: config.dispatch_timeout,
        }
    }

    /// 追加一层中间件（位于已有中间件之内）
    pub fn with_middleware<M>(mut self, middleware: M) -> Self
    where
        M: CommandMiddleware + 'static,
    {
        self.middlewares.push(Arc::new(middleware));
        self
    }

    pub fn push_middleware(&mut self, middleware: Arc<dyn CommandMiddleware>) {
        self.middlewares.push(middleware);
    }

    /// 中间件名称，由外到内
    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.middlewares.iter().map(|m| m.name()).collect()
    }

    /// 注册命令处理器
    pub fn register<C, H>(&self, handler: Arc<H>) -> AppResult<()>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        let f = erase_handler_fn(move |any| {
            let handler = handler.clone();

            Box::pin(async move {
                // 键与闭包同一泛型 C，正常情况下 downcast 不会失败
                let Some(cmd) = any.downcast_ref::<C>() else {
                    return Err(AppError::TypeMismatch {
                        expected: type_name::<C>(),
                        found: "unknown",
                    });
                };
                let out = handler.handle(cmd).await?;
                Ok(Box::new(out) as BoxAnySend)
            })
        });

        self.handlers.register(C::NAME, TypeKey::of::<C>(), f)?;
        tracing::debug!(command.name = C::NAME, "command handler registered");
        Ok(())
    }

    /// 已注册的命令名称（排序）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.list_registered()
    }

    pub fn is_registered<C: Command>(&self) -> bool {
        self.handlers.contains(C::NAME)
    }
}

#[async_trait]
impl CommandBus for CommandDispatcher {
    async fn dispatch<C>(&self, cmd: C) -> AppResult<ExecutionResult<C::Output>>
    where
        C: Command,
    {
        let started = Instant::now();
        let source_id = cmd.envelope().id();
        let handler = self.handlers.resolve(C::NAME, TypeKey::of::<C>())?;

        let run = Next::new(&self.middlewares, &handler).run(CommandCall::new(&cmd));
        let out = match self.timeout {
            Some(after) => tokio::time::timeout(after, run)
                .await
                .map_err(|_| AppError::Timeout {
                    name: C::NAME,
                    after,
                })??,
            None => run.await?,
        };

        let output = out.downcast::<C::Output>().map_err(|_| AppError::TypeMismatch {
            expected: type_name::<C::Output>(),
            found: "unknown",
        })?;

        Ok(ExecutionResult::success(source_id, *output).with_duration(started.elapsed()))
    }
}
