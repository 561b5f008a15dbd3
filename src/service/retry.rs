use crate::config::RetryConfig;
use crate::error::ExtractError;
use backon::Retryable;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// 限流重试: delay = base * (attempt + 1) + jitter, 不超过 max_delay
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    pub max_delay: Duration,
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次失败 (从 0 开始) 后的等待时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        };
        (self.base_delay * (attempt + 1) + jitter).min(self.max_delay)
    }

    /// 各次重试前的等待序列, 共 max_attempts - 1 项
    fn schedule(&self) -> std::vec::IntoIter<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for(attempt))
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// 执行 `op`, 仅在限流时重试; 其他错误立即返回
    pub async fn run<T, F, Fut>(&self, page_no: u32, op: F) -> Result<T, ExtractError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExtractError>>,
    {
        let mut retried = 0;
        let result = op
            .retry(self.schedule())
            .when(ExtractError::is_transient)
            .notify(|err: &ExtractError, delay: Duration| {
                retried += 1;
                tracing::warn!(
                    "Page {} rate limited (attempt {}/{}), retrying in {:?}: {}",
                    page_no,
                    retried,
                    self.max_attempts,
                    delay,
                    err
                );
            })
            .await;

        match result {
            Err(err) if err.is_transient() => Err(ExtractError::ExtractionFatal(format!(
                "gave up after {} attempts: {err}",
                self.max_attempts
            ))),
            other => other,
        }
    }
}
