//! Database operation retry
//!
//! Transient failures (deadlocks, lock timeouts, lost connections) are
//! retried with exponential backoff and jitter. Everything else, unique
//! violations included, surfaces immediately.

use sea_orm::DbErr;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                let code_str = code.as_ref();
                return matches!(
                    code_str,
                    // MySQL deadlock / lock wait timeout
                    "1213" | "1205" |
                    // PostgreSQL serialization failure / deadlock
                    "40001" | "40P01" |
                    // SQLite BUSY / LOCKED
                    "5" | "6"
                );
            }
            is_retryable_error_message(&sqlx_err.to_string().to_lowercase())
        }
        RuntimeErr::Internal(msg) => is_retryable_error_message(&msg.to_lowercase()),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_error_message(err_str: &str) -> bool {
    err_str.contains("deadlock")
        || err_str.contains("lock wait timeout")
        || err_str.contains("database is locked")
        || err_str.contains("serialization failure")
}

#[derive(Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Run an operation, retrying retryable errors with exponential backoff.
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Exponential backoff with 0-25% jitter.
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt - 1));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_is_retryable_error_connection_acquire() {
        let err = DbErr::ConnectionAcquire(sea_orm::error::ConnAcquireErr::Timeout);
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_deadlock() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "Deadlock found when trying to get lock".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_is_retryable_error_database_locked() {
        let err = DbErr::Query(sea_orm::error::RuntimeErr::Internal(
            "database is locked".to_string(),
        ));
        assert!(is_retryable_error(&err));
    }

    #[test]
    fn test_unique_violation_is_not_retryable() {
        let err = DbErr::Exec(sea_orm::error::RuntimeErr::Internal(
            "UNIQUE constraint failed: links.alias".to_string(),
        ));
        assert!(!is_retryable_error(&err));
    }

    #[test]
    fn test_calculate_backoff_exponential_and_capped() {
        let delay1 = calculate_backoff(1, 100, 2000);
        assert!((100..=125).contains(&delay1));

        let delay2 = calculate_backoff(2, 100, 2000);
        assert!((200..=250).contains(&delay2));

        let capped = calculate_backoff(10, 100, 2000);
        assert!((2000..=2500).contains(&capped));
    }

    #[tokio::test]
    async fn test_with_retry_success_after_retries() {
        let config = RetryConfig {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay_ms: 50,
        };
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            let count = call_count.fetch_add(1, Ordering::SeqCst);
            async move {
                if count < 2 {
                    Err(DbErr::ConnectionAcquire(
                        sea_orm::error::ConnAcquireErr::Timeout,
                    ))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_with_retry_non_retryable_error_no_retry() {
        let config = RetryConfig::default();
        let call_count = AtomicU32::new(0);

        let result = with_retry("test_op", config, || {
            call_count.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>(DbErr::RecordNotFound("not found".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
