use std::future::Future;
use std::time::Duration;

/// Await `fut` and emit a `performance` warning when it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = std::time::Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_inner_output() {
        let out = warn_if_slow("noop", Duration::from_secs(1), async { 41 + 1 }).await;
        assert_eq!(out, 42);
    }
}
