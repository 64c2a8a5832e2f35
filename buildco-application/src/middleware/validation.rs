use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use super::{BoxAnySend, CommandCall, CommandMiddleware, Next};
use crate::command::Command;
use crate::error::{AppError, AppResult};
use crate::registry::{HandlerRegistry, TypeKey};
use crate::validation::{CommandValidator, ValidationReport};

type ErasedValidatorFn = Arc<
    dyn for<'a> Fn(&'a (dyn Any + Send + Sync)) -> BoxFuture<'a, AppResult<ValidationReport>>
        + Send
        + Sync,
>;

fn erase_validator_fn<F>(f: F) -> ErasedValidatorFn
where
    F: for<'a> Fn(&'a (dyn Any + Send + Sync)) -> BoxFuture<'a, AppResult<ValidationReport>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// 按命令名称查找校验器并在处理器之前运行
///
/// - 没有注册校验器的命令直接放行；
/// - 报告不通过时返回 [`AppError::CommandValidation`]，不调用内层。
pub struct ValidationMiddleware {
    validators: HandlerRegistry<ErasedValidatorFn>,
}

impl Default for ValidationMiddleware {
    fn default() -> Self {
        Self {
            validators: HandlerRegistry::new("validator", false),
        }
    }
}

impl ValidationMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为命令 `C` 注册校验器；同一命令只能有一个校验器
    pub fn register<C, V>(&self, validator: Arc<V>) -> AppResult<()>
    where
        C: Command,
        V: CommandValidator<C> + 'static,
    {
        let f = erase_validator_fn(move |any| {
            let validator = validator.clone();
            Box::pin(async move {
                let Some(cmd) = any.downcast_ref::<C>() else {
                    return Err(AppError::TypeMismatch {
                        expected: C::NAME,
                        found: "unknown",
                    });
                };
                Ok(validator.validate(cmd).await)
            })
        });

        self.validators.register(C::NAME, TypeKey::of::<C>(), f)
    }

    pub fn registered(&self) -> Vec<&'static str> {
        self.validators.list_registered()
    }
}

#[async_trait]
impl CommandMiddleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "validation"
    }

    async fn handle<'a>(&self, call: CommandCall<'a>, next: Next<'a>) -> AppResult<BoxAnySend> {
        let Some(validate) = self.validators.get(call.name, call.type_key)? else {
            return next.run(call).await;
        };

        let report = validate(call.as_any()).await?;
        if !report.is_valid() {
            tracing::warn!(
                command.name = call.name,
                command.id = %call.envelope.id(),
                errors = report.errors().len(),
                "command rejected by validator"
            );
            return Err(AppError::CommandValidation {
                command: call.name,
                errors: report.into_errors(),
            });
        }

        next.run(call).await
    }
}
