/*!
 * Utility functions and helpers for lazyconnect.
 */
use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::Error;

/// Run a future with a timeout
///
/// # Arguments
///
/// * `duration` - The timeout duration
/// * `future` - The future to run
///
/// # Returns
///
/// The result of the future, or a timeout error if the timeout is reached.
/// Any error type that can absorb a core [`Error`] can be used.
pub async fn with_timeout<F, T, E>(duration: Duration, future: F) -> std::result::Result<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: From<Error>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::timeout(format!(
            "Operation timed out after {}ms",
            duration_to_millis(duration)
        ))
        .into()),
    }
}

/// Convert a Duration to milliseconds
pub fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_secs() * 1000 + u64::from(duration.subsec_millis())
}

/// Convert milliseconds to a Duration
pub fn millis_to_duration(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test_log::test(tokio::test)]
    async fn test_with_timeout_success() {
        let result: Result<i32> = with_timeout(Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[test_log::test(tokio::test)]
    async fn test_with_timeout_failure() {
        let result = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, Error>(42)
        })
        .await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[test]
    fn test_duration_conversions() {
        let duration = Duration::from_millis(1234);
        let millis = duration_to_millis(duration);
        assert_eq!(millis, 1234);
        assert_eq!(millis_to_duration(millis), duration);
    }

    #[test]
    fn test_with_timeout_blocking() {
        let result = tokio_test::block_on(async {
            with_timeout(Duration::from_millis(50), async { Ok::<_, Error>("done") }).await
        });
        assert_eq!(result.unwrap(), "done");
    }
}
