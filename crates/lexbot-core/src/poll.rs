//! Status polling for asynchronous remote transitions.
//!
//! The bot service offers no push notification for builds, version
//! snapshots or alias updates, so the only way to know one has finished is
//! to query its status until it leaves the transient set. The loop here is
//! the single place that waits; callers see it as an explicit `.await`.

use std::time::Duration;

use tokio::time::Instant;

use lexbot_types::config::PollSettings;
use lexbot_types::error::BotError;
use lexbot_types::status::BotStatus;

/// Polling cadence: exponential backoff from `initial_interval`, capped at
/// `max_interval`, giving up after `timeout`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    /// Growth factor between polls. Values below 1.0, and non-finite
    /// values, are treated as 1.0.
    pub multiplier: f64,
    pub timeout: Duration,
}

impl PollPolicy {
    /// Poll at a fixed rate.
    pub fn fixed(interval: Duration, timeout: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            timeout,
        }
    }

    fn growth(&self) -> f64 {
        if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        }
    }

    /// Grow `current` by the multiplier. Anything past the cap, including a
    /// product too large for a `Duration`, becomes the cap.
    fn next_interval(&self, current: Duration) -> Duration {
        let cap = self.max_interval.max(self.initial_interval);
        Duration::try_from_secs_f64(current.as_secs_f64() * self.growth())
            .unwrap_or(cap)
            .min(cap)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollSettings::default())
    }
}

impl From<&PollSettings> for PollPolicy {
    fn from(settings: &PollSettings) -> Self {
        Self {
            initial_interval: Duration::from_millis(settings.interval_ms),
            max_interval: Duration::from_millis(settings.max_interval_ms),
            multiplier: if settings.backoff_multiplier.is_finite() {
                settings.backoff_multiplier.max(1.0)
            } else {
                1.0
            },
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// Where a poll loop reads status from, and what a `Failed` status means
/// for it.
pub trait StatusProbe: Send {
    /// Short description for logs (e.g. "build of X1/pt_BR").
    fn label(&self) -> String;

    /// Query the current remote status once.
    fn query(&mut self) -> impl std::future::Future<Output = Result<BotStatus, BotError>> + Send;

    /// The error to report when the status reaches `Failed`.
    fn failure(&self) -> BotError;
}

/// A status that left the transient set without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableStatus {
    pub status: BotStatus,
    /// Number of status queries issued.
    pub queries: u32,
    /// Number of poll-interval sleeps between queries.
    pub waits: u32,
}

/// Query `probe` until its status is stable.
///
/// - Transient (`Creating`, `Versioning`, `Importing`, `Updating`): sleep and
///   query again.
/// - `Failed`: return `probe.failure()`.
/// - Anything else: return it.
///
/// Query errors propagate immediately. Exceeding `policy.timeout` returns
/// [`BotError::PollTimeout`] with the last observed status.
pub async fn wait_until_stable<P: StatusProbe>(
    probe: &mut P,
    policy: &PollPolicy,
) -> Result<StableStatus, BotError> {
    let started = Instant::now();
    let mut interval = policy.initial_interval;
    let mut queries = 0;
    let mut waits = 0;

    loop {
        let status = probe.query().await?;
        queries += 1;
        tracing::debug!(target_label = %probe.label(), %status, queries, "polled status");

        if status.is_failed() {
            tracing::warn!(target_label = %probe.label(), queries, "remote status is Failed");
            return Err(probe.failure());
        }

        if !status.is_transient() {
            tracing::info!(target_label = %probe.label(), %status, queries, waits, "status settled");
            return Ok(StableStatus {
                status,
                queries,
                waits,
            });
        }

        let waited = started.elapsed();
        if waited + interval > policy.timeout {
            tracing::warn!(target_label = %probe.label(), ?waited, %status, "poll timeout");
            return Err(BotError::PollTimeout {
                waited,
                last_status: status,
            });
        }

        tokio::time::sleep(interval).await;
        waits += 1;
        interval = policy.next_interval(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedProbe {
        statuses: VecDeque<BotStatus>,
    }

    impl ScriptedProbe {
        fn new(statuses: &[BotStatus]) -> Self {
            Self {
                statuses: statuses.iter().copied().collect(),
            }
        }
    }

    impl StatusProbe for ScriptedProbe {
        fn label(&self) -> String {
            "scripted".to_string()
        }

        async fn query(&mut self) -> Result<BotStatus, BotError> {
            // Repeat the last status once the script runs out.
            match self.statuses.len() {
                0 => Ok(BotStatus::Updating),
                1 => Ok(self.statuses[0]),
                _ => Ok(self.statuses.pop_front().unwrap_or(BotStatus::Updating)),
            }
        }

        fn failure(&self) -> BotError {
            BotError::BuildFailed {
                bot_id: "BOT".to_string(),
                locale: "pt_BR".to_string(),
            }
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy::fixed(Duration::from_secs(5), Duration::from_secs(600))
    }

    #[tokio::test(start_paused = true)]
    async fn test_updating_twice_then_available() {
        let mut probe = ScriptedProbe::new(&[
            BotStatus::Updating,
            BotStatus::Updating,
            BotStatus::Available,
        ]);
        let stable = wait_until_stable(&mut probe, &policy()).await.unwrap();
        assert_eq!(stable.status, BotStatus::Available);
        assert_eq!(stable.waits, 2);
        assert_eq!(stable.queries, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_is_an_error_not_success() {
        let mut probe = ScriptedProbe::new(&[BotStatus::Updating, BotStatus::Failed]);
        let err = wait_until_stable(&mut probe, &policy()).await.unwrap_err();
        assert!(matches!(err, BotError::BuildFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediately_stable_needs_no_wait() {
        let mut probe = ScriptedProbe::new(&[BotStatus::Inactive]);
        let stable = wait_until_stable(&mut probe, &policy()).await.unwrap();
        assert_eq!(stable.status, BotStatus::Inactive);
        assert_eq!(stable.waits, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_transient_state_keeps_polling() {
        let mut probe = ScriptedProbe::new(&[
            BotStatus::Creating,
            BotStatus::Versioning,
            BotStatus::Importing,
            BotStatus::Updating,
            BotStatus::Available,
        ]);
        let stable = wait_until_stable(&mut probe, &policy()).await.unwrap();
        assert_eq!(stable.waits, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_last_status() {
        let mut probe = ScriptedProbe::new(&[BotStatus::Versioning]);
        let policy = PollPolicy::fixed(Duration::from_secs(5), Duration::from_secs(12));
        let err = wait_until_stable(&mut probe, &policy).await.unwrap_err();
        match err {
            BotError::PollTimeout { last_status, .. } => {
                assert_eq!(last_status, BotStatus::Versioning)
            }
            other => panic!("expected PollTimeout, got {other:?}"),
        }
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(5),
            multiplier: 2.0,
            timeout: Duration::from_secs(60),
        };
        let second = policy.next_interval(policy.initial_interval);
        assert_eq!(second, Duration::from_secs(4));
        assert_eq!(policy.next_interval(second), Duration::from_secs(5));
    }

    #[test]
    fn test_multiplier_below_one_is_fixed_rate() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(30),
            multiplier: 0.5,
            timeout: Duration::from_secs(60),
        };
        assert_eq!(policy.next_interval(Duration::from_secs(3)), Duration::from_secs(3));
    }

    #[test]
    fn test_policy_from_settings() {
        let policy = PollPolicy::from(&PollSettings::default());
        assert_eq!(policy.initial_interval, Duration::from_secs(5));
        assert_eq!(policy.max_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_non_finite_multiplier_from_settings_is_fixed_rate() {
        for multiplier in [f64::INFINITY, f64::NAN, -2.0] {
            let policy = PollPolicy::from(&PollSettings {
                backoff_multiplier: multiplier,
                ..PollSettings::default()
            });
            assert_eq!(policy.multiplier, 1.0);
        }
    }

    #[test]
    fn test_oversized_growth_is_capped_not_overflowed() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            multiplier: 1e300,
            timeout: Duration::from_secs(600),
        };
        assert_eq!(
            policy.next_interval(Duration::from_secs(5)),
            Duration::from_secs(30)
        );

        let policy = PollPolicy {
            multiplier: f64::INFINITY,
            ..policy
        };
        assert_eq!(
            policy.next_interval(Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_multiplier_from_config_still_settles() {
        let policy = PollPolicy::from(&PollSettings {
            backoff_multiplier: 1e300,
            ..PollSettings::default()
        });
        let mut statuses = ScriptedProbe::new(&[
            BotStatus::Updating,
            BotStatus::Updating,
            BotStatus::Available,
        ]);
        let stable = wait_until_stable(&mut statuses, &policy).await.unwrap();
        assert_eq!(stable.status, BotStatus::Available);
        assert_eq!(stable.waits, 2);
    }
}
