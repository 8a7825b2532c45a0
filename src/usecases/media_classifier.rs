//! Media-density classification: rolling per-chat profiles, HOT/WARM/COLD,
//! suppression of cold chats, and edge-triggered warm-up notifications.
//!
//! Profiles and the suppression set live behind one lock, so a recorded
//! message or bulk sample is applied atomically and live-stream updates may
//! interleave freely with a concurrent sample pass on the same chat. Warm-up
//! events are sent after the lock is released.

use crate::domain::{ChatMediaProfile, MediaClass, Message, WarmupEvent};
use crate::shared::config::ClassifierThresholds;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Default)]
struct ClassifierState {
    profiles: HashMap<i64, ChatMediaProfile>,
    suppressed: HashSet<i64>,
}

pub struct MediaDensityClassifier {
    thresholds: ClassifierThresholds,
    state: Mutex<ClassifierState>,
    warmup_tx: mpsc::UnboundedSender<WarmupEvent>,
}

impl MediaDensityClassifier {
    pub fn new(
        thresholds: ClassifierThresholds,
        warmup_tx: mpsc::UnboundedSender<WarmupEvent>,
    ) -> Self {
        Self {
            thresholds,
            state: Mutex::new(ClassifierState::default()),
            warmup_tx,
        }
    }

    fn class_of(&self, profile: &ChatMediaProfile) -> MediaClass {
        let t = &self.thresholds;
        if profile.media_count >= t.hot_min_media || profile.media_ratio() >= t.hot_min_ratio {
            MediaClass::Hot
        } else if profile.media_count >= t.warm_min_media
            && profile.media_ratio() >= t.warm_min_ratio
        {
            MediaClass::Warm
        } else {
            MediaClass::Cold
        }
    }

    /// Fold one live message into the chat's profile. A suppressed chat whose
    /// class rises out of COLD is unsuppressed, firing the warm-up event
    /// exactly once per transition.
    pub fn record_message(&self, message: &Message) {
        let event = {
            let mut state = self.state.lock();
            let profile = state.profiles.entry(message.chat_id).or_default();
            profile.observe(message);
            let class = self.class_of(profile);
            if class != MediaClass::Cold && state.suppressed.remove(&message.chat_id) {
                Some(WarmupEvent {
                    chat_id: message.chat_id,
                    class,
                })
            } else {
                None
            }
        };
        if let Some(event) = event {
            self.fire_warmup(event);
        }
    }

    /// Fold a bulk history sample into the profile. A resulting COLD class
    /// suppresses the chat; a climb out of COLD unsuppresses it and fires the
    /// warm-up event.
    pub fn record_sample(&self, chat_id: i64, messages: &[Message]) {
        let (class, event) = {
            let mut state = self.state.lock();
            let profile = state.profiles.entry(chat_id).or_default();
            for message in messages {
                profile.observe(message);
            }
            let class = self.class_of(profile);
            let event = if class == MediaClass::Cold {
                state.suppressed.insert(chat_id);
                None
            } else if state.suppressed.remove(&chat_id) {
                Some(WarmupEvent { chat_id, class })
            } else {
                None
            };
            (class, event)
        };
        debug!(chat_id, sample = messages.len(), class = ?class, "sample recorded");
        if let Some(event) = event {
            self.fire_warmup(event);
        }
    }

    /// Current class of a profiled chat; `None` when nothing was sampled yet.
    pub fn classify(&self, chat_id: i64) -> Option<MediaClass> {
        let state = self.state.lock();
        state.profiles.get(&chat_id).map(|p| self.class_of(p))
    }

    /// Classes for every profiled chat that is not suppressed.
    pub fn get_active_chats(&self) -> HashMap<i64, MediaClass> {
        let state = self.state.lock();
        state
            .profiles
            .iter()
            .filter(|(chat_id, _)| !state.suppressed.contains(*chat_id))
            .map(|(chat_id, profile)| (*chat_id, self.class_of(profile)))
            .collect()
    }

    pub fn is_suppressed(&self, chat_id: i64) -> bool {
        self.state.lock().suppressed.contains(&chat_id)
    }

    /// Snapshot of one chat's counters.
    pub fn profile(&self, chat_id: i64) -> Option<ChatMediaProfile> {
        self.state.lock().profiles.get(&chat_id).copied()
    }

    /// Drop all profiles and suppression state. Intended for tests.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.profiles.clear();
        state.suppressed.clear();
    }

    fn fire_warmup(&self, event: WarmupEvent) {
        debug!(chat_id = event.chat_id, class = ?event.class, "chat warmed up");
        if self.warmup_tx.send(event).is_err() {
            warn!(chat_id = event.chat_id, "warm-up channel closed, dropping event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageContent;
    use std::sync::Arc;

    fn message(chat_id: i64, id: i64, media: bool) -> Message {
        Message {
            id,
            chat_id,
            sender_id: Some(7),
            date: 1_700_000_000 + id,
            content: if media {
                MessageContent::Photo {
                    width: 800,
                    height: 600,
                    size_bytes: 1 << 16,
                    remote_id: format!("p{id}"),
                }
            } else {
                MessageContent::Text {
                    text: format!("message {id}"),
                }
            },
            reply_to_message_id: None,
            is_forwarded: false,
        }
    }

    /// `media` media messages followed by text filler up to `total`.
    fn sample(chat_id: i64, media: u64, total: u64) -> Vec<Message> {
        (0..total)
            .map(|n| message(chat_id, n as i64 + 1, n < media))
            .collect()
    }

    fn classifier() -> (
        MediaDensityClassifier,
        mpsc::UnboundedReceiver<WarmupEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            MediaDensityClassifier::new(ClassifierThresholds::default(), tx),
            rx,
        )
    }

    #[test]
    fn classifies_hot_warm_cold() {
        let (clf, _rx) = classifier();
        clf.record_sample(1, &sample(1, 25, 40));
        clf.record_sample(2, &sample(2, 4, 50));
        clf.record_sample(3, &sample(3, 1, 100));
        assert_eq!(clf.classify(1), Some(MediaClass::Hot));
        assert_eq!(clf.classify(2), Some(MediaClass::Warm));
        assert_eq!(clf.classify(3), Some(MediaClass::Cold));
        assert_eq!(clf.classify(99), None);
    }

    #[test]
    fn high_ratio_alone_is_hot() {
        let (clf, _rx) = classifier();
        // 2 media in 5: far below the count cutoff, but ratio 0.4.
        clf.record_sample(1, &sample(1, 2, 5));
        assert_eq!(clf.classify(1), Some(MediaClass::Hot));
    }

    #[test]
    fn cold_sample_suppresses_and_hides_from_active() {
        let (clf, _rx) = classifier();
        clf.record_sample(1, &sample(1, 1, 100));
        clf.record_sample(2, &sample(2, 25, 40));
        assert!(clf.is_suppressed(1));
        assert!(!clf.is_suppressed(2));

        let active = clf.get_active_chats();
        assert!(!active.contains_key(&1));
        assert_eq!(active.get(&2), Some(&MediaClass::Hot));
    }

    #[test]
    fn live_cold_chat_is_not_suppressed() {
        let (clf, _rx) = classifier();
        // Only record_sample suppresses; a cold live-profiled chat stays active.
        clf.record_message(&message(1, 1, false));
        assert_eq!(clf.classify(1), Some(MediaClass::Cold));
        assert!(!clf.is_suppressed(1));
        assert_eq!(clf.get_active_chats().get(&1), Some(&MediaClass::Cold));
    }

    #[test]
    fn warmup_fires_exactly_once_across_samples() {
        let (clf, mut rx) = classifier();
        clf.record_sample(1, &sample(1, 1, 100));
        assert!(clf.is_suppressed(1));
        assert!(rx.try_recv().is_err());

        // 10 more media messages lift the profile to 11/110: WARM.
        clf.record_sample(1, &sample(1, 10, 10));
        let event = rx.try_recv().expect("warm-up after leaving COLD");
        assert_eq!(event.chat_id, 1);
        assert_ne!(event.class, MediaClass::Cold);
        assert!(!clf.is_suppressed(1));

        // Still non-COLD: no refire.
        clf.record_sample(1, &sample(1, 10, 10));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn live_messages_unsuppress_a_cold_chat() {
        let (clf, mut rx) = classifier();
        // 1 media in 30: COLD, suppressed.
        clf.record_sample(1, &sample(1, 1, 30));
        assert!(clf.is_suppressed(1));

        // Two more media messages: counts 2 then 3; WARM is reached at 3
        // (ratio 3/32 ≈ 0.094).
        clf.record_message(&message(1, 31, true));
        assert!(rx.try_recv().is_err());
        assert!(clf.is_suppressed(1));

        clf.record_message(&message(1, 32, true));
        let event = rx.try_recv().expect("warm-up on the message crossing WARM");
        assert_eq!(event.class, MediaClass::Warm);
        assert!(!clf.is_suppressed(1));

        clf.record_message(&message(1, 33, true));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_warmup_channel_drops_event_without_panicking() {
        let (clf, rx) = classifier();
        drop(rx);
        clf.record_sample(1, &sample(1, 1, 30));
        clf.record_sample(1, &sample(1, 10, 10));
        assert!(!clf.is_suppressed(1));
    }

    #[test]
    fn reset_clears_profiles_and_suppression() {
        let (clf, _rx) = classifier();
        clf.record_sample(1, &sample(1, 1, 100));
        clf.reset();
        assert_eq!(clf.classify(1), None);
        assert!(!clf.is_suppressed(1));
        assert!(clf.get_active_chats().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_lose_no_updates() {
        let (clf, _rx) = classifier();
        let clf = Arc::new(clf);
        let mut handles = Vec::new();
        for task in 0..8 {
            let clf = Arc::clone(&clf);
            handles.push(tokio::spawn(async move {
                for n in 0..50 {
                    clf.record_message(&message(1, task * 50 + n + 1, n % 2 == 0));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        let profile = clf.profile(1).expect("profile exists");
        assert_eq!(profile.total_count, 400);
        assert_eq!(profile.media_count, 200);
    }
}
