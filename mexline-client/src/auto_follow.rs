//! Automatic follow of configured newsletters.
//!
//! Every time the connection reports `open`, each configured newsletter is
//! checked and followed if the account is not subscribed. Ids are handled one
//! at a time; a failure on one id is logged and the pass moves on.

use crate::client::NewsletterClient;
use crate::events::ConnectionUpdate;
use mexline_protocol::NewsletterJid;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Capacity of the pass report channel.
const REPORT_CHANNEL_CAPACITY: usize = 16;

/// What a pass did for one newsletter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowOutcome {
    /// Already subscribed, nothing sent.
    AlreadyFollowing,
    /// A follow request was sent and answered.
    Followed,
    /// The follow request failed; the error was logged and dropped.
    FollowFailed,
}

/// Summary of one reconciliation pass, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: Vec<(NewsletterJid, FollowOutcome)>,
}

impl ReconcileReport {
    /// Returns the outcome recorded for `jid`.
    pub fn outcome(&self, jid: &NewsletterJid) -> Option<FollowOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == jid)
            .map(|(_, outcome)| *outcome)
    }

    pub fn count(&self, outcome: FollowOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == outcome).count()
    }
}

/// Reconciles subscription state for a fixed set of newsletters.
#[derive(Clone)]
pub struct AutoFollower {
    client: NewsletterClient,
    newsletters: Arc<[NewsletterJid]>,
}

impl AutoFollower {
    pub fn new(client: NewsletterClient, newsletters: Vec<NewsletterJid>) -> Self {
        Self {
            client,
            newsletters: newsletters.into(),
        }
    }

    pub fn newsletters(&self) -> &[NewsletterJid] {
        &self.newsletters
    }

    /// Runs one pass over every configured newsletter.
    ///
    /// Never fails: errors are logged and recorded in the report.
    pub async fn run_pass(&self) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for jid in self.newsletters.iter() {
            let outcome = self.reconcile(jid).await;
            report.outcomes.push((jid.clone(), outcome));
        }

        tracing::info!(
            "Auto-follow pass complete: {} followed, {} already following, {} failed",
            report.count(FollowOutcome::Followed),
            report.count(FollowOutcome::AlreadyFollowing),
            report.count(FollowOutcome::FollowFailed)
        );
        report
    }

    async fn reconcile(&self, jid: &NewsletterJid) -> FollowOutcome {
        if self.client.is_following(jid).await {
            tracing::debug!("Already following {}", jid);
            return FollowOutcome::AlreadyFollowing;
        }

        match self.client.follow(jid).await {
            Ok(_) => {
                tracing::debug!("Followed {}", jid);
                FollowOutcome::Followed
            }
            Err(e) => {
                tracing::warn!("Auto-follow of {} failed: {}", jid, e);
                FollowOutcome::FollowFailed
            }
        }
    }

    /// Starts listening for connection updates on a background task.
    ///
    /// Each `open` update triggers [`run_pass`](Self::run_pass). Passes run
    /// one after another; the task ends when the update channel closes or the
    /// returned handle is shut down or dropped.
    pub fn spawn(self, mut updates: broadcast::Receiver<ConnectionUpdate>) -> AutoFollowHandle {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        let report_tx = reports.clone();

        let task = tokio::spawn(async move {
            tracing::debug!(
                "Auto-follow listening for {} newsletter(s)",
                self.newsletters.len()
            );

            loop {
                match updates.recv().await {
                    Ok(update) if update.is_open() => {
                        let report = self.run_pass().await;
                        // Nobody listening for reports is fine
                        let _ = report_tx.send(report);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Auto-follow lagged, skipped {} connection update(s)",
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Connection update channel closed, auto-follow stopping");
                        break;
                    }
                }
            }
        });

        AutoFollowHandle {
            task: Some(task),
            reports,
        }
    }
}

/// Handle to a running auto-follow listener.
///
/// Dropping the handle stops the listener and releases its subscription.
pub struct AutoFollowHandle {
    task: Option<JoinHandle<()>>,
    reports: broadcast::Sender<ReconcileReport>,
}

impl AutoFollowHandle {
    /// Subscribes to reports of completed passes.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<ReconcileReport> {
        self.reports.subscribe()
    }

    /// Returns whether the listener task is still alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops the listener and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for AutoFollowHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
