use serde::Serialize;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::agent::AgentChannel;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActionOutcome {
    /// Resolved on the client; nothing was sent to the agent.
    Applied,
    /// Dispatched and the agent went idle within the timeout.
    Confirmed,
    /// Dispatched but the agent was still busy at the timeout. The agent
    /// may yet finish; callers keep their pending UI.
    Ambiguous,
    /// The waiting view went away before an outcome was known.
    Cancelled,
}

/// Sample `channel.is_busy()` every `poll_interval` until it reads idle,
/// `timeout` elapses, or `cancel` fires. The first sample is immediate.
pub async fn wait_for_idle(
    channel: &dyn AgentChannel,
    poll_interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ActionOutcome {
    let deadline = Instant::now() + timeout;
    let mut ticker = time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return ActionOutcome::Cancelled,
            _ = ticker.tick() => {
                if !channel.is_busy() {
                    return ActionOutcome::Confirmed;
                }
                if Instant::now() >= deadline {
                    return ActionOutcome::Ambiguous;
                }
            }
        }
    }
}
