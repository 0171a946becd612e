//! Change notifications for live-updating views.
//!
//! Services publish an event after every successful durable write.
//! Views hold a topic-scoped [`Subscription`]; dropping the
//! subscription releases its slot on the bus, so a subscription lives
//! exactly as long as the view that opened it.

use tokio::sync::broadcast;
use uuid::Uuid;

/// What changed. Events carry ids only; subscribers re-read current
/// state through the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    ProfileUpdated {
        user_id: Uuid,
    },
    ProgressUpdated {
        user_id: Uuid,
        role_id: Uuid,
    },
    ReviewUpdated {
        user_id: Uuid,
        role_id: Uuid,
        step_id: Uuid,
    },
}

/// Scope of interest for one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// One user's profile document.
    Profile(Uuid),
    /// One user's progress within one role.
    Progress(Uuid, Uuid),
    /// Any review entry mutation.
    Reviews,
}

impl Topic {
    fn matches(self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (Topic::Profile(user_id), ChangeEvent::ProfileUpdated { user_id: changed }) => {
                user_id == *changed
            }
            (
                Topic::Progress(user_id, role_id),
                ChangeEvent::ProgressUpdated {
                    user_id: changed_user,
                    role_id: changed_role,
                },
            ) => user_id == *changed_user && role_id == *changed_role,
            (Topic::Reviews, ChangeEvent::ReviewUpdated { .. }) => true,
            _ => false,
        }
    }
}

/// Broadcast bus shared by all services. Cloning is cheap and every
/// clone publishes to the same subscribers.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        // Slow subscribers miss events rather than block writers.
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    /// Publish an event. A bus with no subscribers drops it silently.
    pub(crate) fn publish(&self, event: ChangeEvent) {
        let _ = self.tx.send(event);
    }

    /// Open a subscription scoped to `topic`.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            topic,
        }
    }

    /// Live subscriptions across all topics.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// A topic-scoped subscription. Events outside the topic are skipped;
/// dropping the value unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<ChangeEvent>,
    topic: Topic,
}

impl Subscription {
    /// Next event matching the topic, or `None` once the bus is gone.
    /// Events missed under lag are skipped; callers re-read state
    /// through the services rather than replaying history.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.topic.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_filter_by_id() {
        let user = Uuid::new_v4();
        let role = Uuid::new_v4();
        let other = Uuid::new_v4();

        let event = ChangeEvent::ProgressUpdated {
            user_id: user,
            role_id: role,
        };
        assert!(Topic::Progress(user, role).matches(&event));
        assert!(!Topic::Progress(user, other).matches(&event));
        assert!(!Topic::Profile(user).matches(&event));
    }

    #[test]
    fn review_topic_matches_any_entry() {
        let event = ChangeEvent::ReviewUpdated {
            user_id: Uuid::new_v4(),
            role_id: Uuid::new_v4(),
            step_id: Uuid::new_v4(),
        };
        assert!(Topic::Reviews.matches(&event));
        assert!(!Topic::Reviews.matches(&ChangeEvent::ProfileUpdated {
            user_id: Uuid::new_v4(),
        }));
    }
}
