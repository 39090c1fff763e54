use std::future::Future;
use std::time::Duration;

use pulse_core::PulseError;

/// Await `fut` under an optional deadline.
///
/// On expiry returns `PulseError::RequestTimeout` labeled with `operation`.
pub(crate) async fn with_request_deadline<T, Fut>(
    deadline: Option<Duration>,
    operation: &str,
    fut: Fut,
) -> Result<T, PulseError>
where
    Fut: Future<Output = Result<T, PulseError>>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| PulseError::request_timeout(operation))?,
        None => fut.await,
    }
}
