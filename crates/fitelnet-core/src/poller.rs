// ── Batch poller ──
//
// Turns the device's asynchronous submit / poll / delete protocol into one
// awaitable call: submit, sleep, poll until the status leaves `Processing`
// (bounded by an attempt budget), then optionally delete the record.

use std::future::Future;
use std::time::Duration;

use fitelnet_api::{BatchAccepted, BatchResult, CliCommand, ClisId};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::config::PollSettings;
use crate::error::CoreError;

/// The three batch operations the poller needs from a device.
///
/// Implemented by [`FitelnetDevice`](crate::FitelnetDevice); tests supply
/// scripted fakes.
pub trait BatchApi {
    fn submit_batch(
        &self,
        commands: &[CliCommand],
    ) -> impl Future<Output = Result<BatchAccepted, CoreError>> + Send;

    fn fetch_result(
        &self,
        clis_id: &ClisId,
    ) -> impl Future<Output = Result<BatchResult, CoreError>> + Send;

    fn delete_result(&self, clis_id: &ClisId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Submit `commands` and wait for the batch to reach a terminal status.
///
/// Performs at most `settings.max_retries + 1` fetches. A terminal result is
/// returned unchanged whatever its status; when
/// `settings.delete_on_completion` is set the record is deleted first and a
/// failed delete is returned as the error. If every attempt sees
/// `Processing`, fails with [`CoreError::Timeout`] and leaves the record on
/// the device.
///
/// Sleeps and requests race `cancel`; cancellation yields
/// [`CoreError::Cancelled`] and also leaves the record in place. The final
/// cleanup delete is not raced.
pub async fn wait_for_batch<A>(
    api: &A,
    commands: &[CliCommand],
    settings: &PollSettings,
    cancel: &CancellationToken,
) -> Result<BatchResult, CoreError>
where
    A: BatchApi + Sync,
{
    let attempts = settings.attempts()?;

    let accepted = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(CoreError::Cancelled { clis_id: None }),
        res = api.submit_batch(commands) => res?,
    };
    let clis_id = accepted.clis_id;
    debug!(%clis_id, total = commands.len(), attempts, "batch accepted");

    pause(settings.initial_delay, cancel, &clis_id).await?;

    for attempt in 1..=attempts {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(cancelled(&clis_id)),
            res = api.fetch_result(&clis_id) => res?,
        };

        if result.is_terminal() {
            debug!(%clis_id, attempt, status = %result.status, "batch finished");
            if settings.delete_on_completion {
                api.delete_result(&clis_id).await?;
                debug!(%clis_id, "batch result deleted");
            }
            return Ok(result);
        }

        trace!(%clis_id, attempt, "batch still processing");
        if attempt < attempts {
            pause(settings.interval, cancel, &clis_id).await?;
        }
    }

    warn!(%clis_id, attempts, "batch still processing after last attempt");
    Err(CoreError::Timeout { clis_id, attempts })
}

async fn pause(
    duration: Duration,
    cancel: &CancellationToken,
    clis_id: &ClisId,
) -> Result<(), CoreError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(cancelled(clis_id)),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

fn cancelled(clis_id: &ClisId) -> CoreError {
    debug!(%clis_id, "batch wait cancelled");
    CoreError::Cancelled {
        clis_id: Some(clis_id.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use fitelnet_api::{BatchStatus, CommandOutcome, StatusKind};
    use pretty_assertions::assert_eq;

    use super::*;

    // ── Scripted fake ───────────────────────────────────────────────

    #[derive(Default)]
    struct FakeApi {
        /// Statuses returned by successive fetches; the last one repeats.
        script: Mutex<VecDeque<BatchStatus>>,
        submit_error: Mutex<Option<CoreError>>,
        fetch_error_at: Option<u32>,
        delete_fails: bool,
        /// Cancel this token when the given fetch number is served.
        cancel_on_fetch: Option<(u32, CancellationToken)>,
        submits: AtomicU32,
        fetches: AtomicU32,
        deletes: AtomicU32,
    }

    impl FakeApi {
        fn scripted(statuses: &[BatchStatus]) -> Self {
            Self {
                script: Mutex::new(statuses.iter().cloned().collect()),
                ..Self::default()
            }
        }

        fn counts(&self) -> (u32, u32, u32) {
            (
                self.submits.load(Ordering::SeqCst),
                self.fetches.load(Ordering::SeqCst),
                self.deletes.load(Ordering::SeqCst),
            )
        }
    }

    fn result_with(status: BatchStatus, entries: usize) -> BatchResult {
        BatchResult {
            clis_id: Some(ClisId::Number(7)),
            status,
            entries: (0..entries)
                .map(|i| CommandOutcome {
                    cmd: format!("show {i}"),
                    on_fail: None,
                    result: Some("success".into()),
                    message: None,
                    contents: vec![format!("line {i}")],
                })
                .collect(),
            total: Some(entries),
        }
    }

    impl BatchApi for FakeApi {
        async fn submit_batch(&self, commands: &[CliCommand]) -> Result<BatchAccepted, CoreError> {
            if let Some(err) = self.submit_error.lock().unwrap().take() {
                return Err(err);
            }
            self.submits.fetch_add(1, Ordering::SeqCst);
            assert!(!commands.is_empty());
            Ok(BatchAccepted {
                clis_id: ClisId::Number(7),
                expires_in: Some(3600),
            })
        }

        async fn fetch_result(&self, clis_id: &ClisId) -> Result<BatchResult, CoreError> {
            assert_eq!(clis_id, &ClisId::Number(7));
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((at, token)) = &self.cancel_on_fetch {
                if *at == n {
                    token.cancel();
                }
            }
            if self.fetch_error_at == Some(n) {
                return Err(CoreError::Api {
                    status: 503,
                    message: "busy".into(),
                });
            }
            let status = {
                let mut script = self.script.lock().unwrap();
                if script.len() > 1 {
                    script.pop_front().unwrap()
                } else {
                    script
                        .front()
                        .cloned()
                        .unwrap_or_else(|| BatchStatus::from("Processing"))
                }
            };
            Ok(result_with(status, 2))
        }

        async fn delete_result(&self, clis_id: &ClisId) -> Result<(), CoreError> {
            assert_eq!(clis_id, &ClisId::Number(7));
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.delete_fails {
                return Err(CoreError::Api {
                    status: 500,
                    message: "delete failed".into(),
                });
            }
            Ok(())
        }
    }

    fn cmds() -> Vec<CliCommand> {
        vec![CliCommand::from("show version"), CliCommand::exit_on_fail("show ip route")]
    }

    fn settings(max_retries: i32, delete: bool) -> PollSettings {
        PollSettings {
            max_retries,
            delete_on_completion: delete,
            ..PollSettings::default()
        }
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn processing_then_success_deletes_once() {
        let api = FakeApi::scripted(&[
            BatchStatus::from("Processing"),
            BatchStatus::from("Success"),
        ]);
        let start = tokio::time::Instant::now();

        let result = wait_for_batch(&api, &cmds(), &settings(5, true), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result, result_with(BatchStatus::from("Success"), 2));
        assert_eq!(api.counts(), (1, 2, 1));
        // initial delay + one interval
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1600), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn first_terminal_fetch_is_the_only_fetch() {
        for retries in 0..=5 {
            let api = FakeApi::scripted(&[BatchStatus::from("Failure")]);
            let result =
                wait_for_batch(&api, &cmds(), &settings(retries, false), &CancellationToken::new())
                    .await
                    .unwrap();
            assert_eq!(result.status.kind(), StatusKind::Failure);
            assert_eq!(api.counts(), (1, 1, 0), "retries={retries}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_times_out_without_delete() {
        for retries in 0..=5 {
            let api = FakeApi::scripted(&[BatchStatus::from("Processing")]);
            let err =
                wait_for_batch(&api, &cmds(), &settings(retries, true), &CancellationToken::new())
                    .await
                    .unwrap_err();

            let expected = u32::try_from(retries).unwrap() + 1;
            match err {
                CoreError::Timeout { clis_id, attempts } => {
                    assert_eq!(clis_id, ClisId::Number(7));
                    assert_eq!(attempts, expected);
                }
                other => panic!("expected Timeout, got {other:?}"),
            }
            assert_eq!(api.counts(), (1, expected, 0), "retries={retries}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn partial_failure_is_returned_verbatim() {
        let api = FakeApi::scripted(&[
            BatchStatus::from("Processing"),
            BatchStatus::from("Processing"),
            BatchStatus::from("PartialFailure"),
        ]);
        let result = wait_for_batch(&api, &cmds(), &settings(2, true), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.status.as_str(), "PartialFailure");
        assert_eq!(api.counts(), (1, 3, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn negative_retries_fail_before_submission() {
        let api = FakeApi::scripted(&[BatchStatus::from("Success")]);
        let err = wait_for_batch(&api, &cmds(), &settings(-1, true), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert_eq!(api.counts(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_failure_propagates_unchanged() {
        let api = FakeApi::scripted(&[BatchStatus::from("Success")]);
        *api.submit_error.lock().unwrap() = Some(CoreError::Validation {
            message: "At least one command must be provided.".into(),
        });

        let err = wait_for_batch(&api, &cmds(), &settings(5, true), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(
            matches!(err, CoreError::Validation { ref message } if message.starts_with("At least"))
        );
        assert_eq!(api.counts(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn cleanup_failure_is_surfaced() {
        let api = FakeApi {
            delete_fails: true,
            ..FakeApi::scripted(&[BatchStatus::from("Success")])
        };
        let err = wait_for_batch(&api, &cmds(), &settings(5, true), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(api.counts(), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_is_not_retried() {
        let api = FakeApi {
            fetch_error_at: Some(2),
            ..FakeApi::scripted(&[BatchStatus::from("Processing")])
        };
        let err = wait_for_batch(&api, &cmds(), &settings(5, true), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(api.counts(), (1, 2, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_between_attempts_keeps_record() {
        let token = CancellationToken::new();
        let api = FakeApi {
            cancel_on_fetch: Some((2, token.clone())),
            ..FakeApi::scripted(&[BatchStatus::from("Processing")])
        };
        let err = wait_for_batch(&api, &cmds(), &settings(10, true), &token)
            .await
            .unwrap_err();
        assert_eq!(err.stranded_batch(), Some(&ClisId::Number(7)));
        assert!(matches!(err, CoreError::Cancelled { .. }));
        assert_eq!(api.counts(), (1, 2, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_before_submission() {
        let token = CancellationToken::new();
        token.cancel();
        let api = FakeApi::scripted(&[BatchStatus::from("Success")]);
        let err = wait_for_batch(&api, &cmds(), &settings(5, true), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled { clis_id: None }));
        assert_eq!(api.counts(), (0, 0, 0));
    }
}
