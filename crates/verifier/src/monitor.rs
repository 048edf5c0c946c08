use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::verifier::BlockVerifier;

/// Continuous verification loop over new rollup blocks.
///
/// Polls the provider head and verifies every block from `next_block` up to
/// it, in order. Consecutive failures beyond the configured threshold pause
/// the loop for `failure_pause` before resuming. Cancellation is checked at
/// every await point; StateStore mutations happen synchronously between
/// awaits, so cancelling never leaves the store mid-mutation.
pub struct Monitor {
    verifier: BlockVerifier,
    next_block: u64,
}

impl Monitor {
    pub fn new(verifier: BlockVerifier, start_block: u64) -> Self {
        Self {
            verifier,
            next_block: start_block,
        }
    }

    /// Runs until `token` is cancelled, then hands the verifier back.
    pub async fn run(mut self, token: CancellationToken) -> BlockVerifier {
        info!(start_block = self.next_block, "starting block monitor");
        let mut consecutive_failures: u32 = 0;

        loop {
            let head = tokio::select! {
                _ = token.cancelled() => break,
                head = self.verifier.latest_block_number() => head,
            };

            match head {
                Ok(head) => {
                    while self.next_block <= head {
                        let result = tokio::select! {
                            _ = token.cancelled() => {
                                info!("block monitor cancelled");
                                return self.verifier;
                            }
                            result = self.verifier.verify_block(self.next_block) => result,
                        };
                        self.next_block += 1;

                        if result.is_valid {
                            consecutive_failures = 0;
                        } else {
                            consecutive_failures += 1;
                        }

                        // block_delay bounds the request rate on every path;
                        // hitting the failure threshold lengthens the wait to
                        // failure_pause instead.
                        let config = self.verifier.config();
                        let wait = if consecutive_failures >= config.max_consecutive_failures {
                            warn!(
                                failures = consecutive_failures,
                                pause = ?config.failure_pause,
                                "too many consecutive failures, pausing"
                            );
                            consecutive_failures = 0;
                            config.failure_pause
                        } else {
                            config.block_delay
                        };
                        tokio::select! {
                            _ = token.cancelled() => {
                                info!("block monitor cancelled");
                                return self.verifier;
                            }
                            _ = tokio::time::sleep(wait) => {}
                        }
                    }
                }
                Err(err) => {
                    error!("Failed to fetch provider head: {err}");
                    consecutive_failures += 1;
                    if self.pause_on_failures(&token, &mut consecutive_failures).await {
                        return self.verifier;
                    }
                }
            }

            // caught up, wait for the head to advance
            let poll = self.verifier.config().head_poll_interval;
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(poll) => {}
            }
        }

        info!("block monitor cancelled");
        self.verifier
    }

    /// Pauses when the failure threshold is hit. Returns true if cancelled
    /// while pausing.
    async fn pause_on_failures(
        &self,
        token: &CancellationToken,
        consecutive_failures: &mut u32,
    ) -> bool {
        let config = self.verifier.config();
        if *consecutive_failures < config.max_consecutive_failures {
            return false;
        }
        warn!(
            failures = *consecutive_failures,
            pause = ?config.failure_pause,
            "too many consecutive failures, pausing"
        );
        *consecutive_failures = 0;
        tokio::select! {
            _ = token.cancelled() => {
                info!("block monitor cancelled");
                true
            }
            _ = tokio::time::sleep(config.failure_pause) => false,
        }
    }
}
