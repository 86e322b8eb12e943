//! Delayed character-by-character text reveal.

use std::time::Duration;

use campaign_core::config::CopilotConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What is on screen at one instant of a reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealFrame {
    pub displayed: String,
    pub started: bool,
    pub cursor_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    delay: Duration,
    speed: Duration,
}

impl Typewriter {
    /// 1500 ms before the first tick, then one character every 30 ms.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_timing(text, Duration::from_millis(1500), Duration::from_millis(30))
    }

    pub fn from_config(text: impl Into<String>, config: &CopilotConfig) -> Self {
        Self::with_timing(
            text,
            Duration::from_millis(config.typewriter_delay_ms),
            Duration::from_millis(config.typewriter_speed_ms),
        )
    }

    pub fn with_timing(text: impl Into<String>, delay: Duration, speed: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
            speed,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Time from start until the last character is shown. Saturates at
    /// `Duration::MAX`.
    pub fn total_duration(&self) -> Duration {
        let chars = u32::try_from(self.char_count()).unwrap_or(u32::MAX);
        self.speed
            .checked_mul(chars)
            .map_or(Duration::MAX, |typing| self.delay.saturating_add(typing))
    }

    fn frame(&self, started: bool, revealed: usize) -> RevealFrame {
        let total = self.char_count();
        let revealed = revealed.min(total);
        let displayed = match self.text.char_indices().nth(revealed) {
            Some((byte, _)) => self.text[..byte].to_string(),
            None => self.text.clone(),
        };
        RevealFrame {
            displayed,
            started,
            cursor_visible: started && revealed < total,
        }
    }

    /// Frame shown `elapsed` after the reveal began.
    pub fn frame_at(&self, elapsed: Duration) -> RevealFrame {
        let Some(running) = elapsed.checked_sub(self.delay) else {
            return self.frame(false, 0);
        };
        let revealed = if self.speed.is_zero() {
            self.char_count()
        } else {
            (running.as_nanos() / self.speed.as_nanos()) as usize
        };
        self.frame(true, revealed)
    }

    /// Run the reveal in the background, publishing every frame. The task
    /// stops as soon as `token` is cancelled and leaves the last frame in
    /// place.
    pub fn spawn(
        self,
        token: CancellationToken,
    ) -> (watch::Receiver<RevealFrame>, JoinHandle<RevealOutcome>) {
        let (tx, rx) = watch::channel(self.frame(false, 0));
        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => return RevealOutcome::Cancelled,
                _ = tokio::time::sleep(self.delay) => {}
            }
            tx.send_replace(self.frame(true, 0));

            let total = self.char_count();
            for revealed in 1..=total {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!(revealed = revealed - 1, total, "Reveal cancelled");
                        return RevealOutcome::Cancelled;
                    }
                    _ = tokio::time::sleep(self.speed) => {}
                }
                tx.send_replace(self.frame(true, revealed));
            }
            RevealOutcome::Completed
        });
        (rx, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_frame_timeline() {
        let tw = Typewriter::new("Hello");
        let before = tw.frame_at(ms(1499));
        assert!(!before.started);
        assert_eq!(before.displayed, "");
        assert!(!before.cursor_visible);

        let start = tw.frame_at(ms(1500));
        assert!(start.started);
        assert_eq!(start.displayed, "");
        assert!(start.cursor_visible);

        assert_eq!(tw.frame_at(ms(1529)).displayed, "");
        assert_eq!(tw.frame_at(ms(1530)).displayed, "H");
        assert_eq!(tw.frame_at(ms(1590)).displayed, "Hel");

        let done = tw.frame_at(ms(1650));
        assert_eq!(done.displayed, "Hello");
        assert!(!done.cursor_visible);
        assert_eq!(tw.frame_at(ms(60_000)), done);
        assert_eq!(tw.total_duration(), ms(1650));
    }

    #[test]
    fn test_reveals_characters_not_bytes() {
        let tw = Typewriter::with_timing("Héllo ≥ 3%", ms(0), ms(10));
        assert_eq!(tw.char_count(), 10);
        assert_eq!(tw.frame_at(ms(20)).displayed, "Hé");
        assert_eq!(tw.frame_at(ms(70)).displayed, "Héllo ≥");
    }

    #[test]
    fn test_empty_text_has_no_cursor() {
        let frame = Typewriter::new("").frame_at(ms(2000));
        assert!(frame.started);
        assert!(!frame.cursor_visible);
    }

    #[test]
    fn test_zero_speed_reveals_everything() {
        let tw = Typewriter::with_timing("abc", ms(5), Duration::ZERO);
        assert_eq!(tw.frame_at(ms(5)).displayed, "abc");
    }

    #[test]
    fn test_total_duration_saturates() {
        let slow =
            Typewriter::with_timing("abc", Duration::ZERO, Duration::from_secs(u64::MAX / 2));
        assert_eq!(slow.total_duration(), Duration::MAX);

        let late = Typewriter::with_timing("abc", Duration::MAX, ms(30));
        assert_eq!(late.total_duration(), Duration::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_reveal_completes() {
        let (rx, handle) = Typewriter::new("Hi there").spawn(CancellationToken::new());
        assert!(!rx.borrow().started);
        assert_eq!(handle.await.unwrap(), RevealOutcome::Completed);
        let last = rx.borrow().clone();
        assert_eq!(last.displayed, "Hi there");
        assert!(!last.cursor_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_reveal_follows_clock() {
        let (rx, handle) = Typewriter::new("Hello").spawn(CancellationToken::new());

        tokio::time::sleep(ms(1400)).await;
        assert!(!rx.borrow().started);

        tokio::time::sleep(ms(115)).await; // 1515
        assert!(rx.borrow().started);
        assert_eq!(rx.borrow().displayed, "");

        tokio::time::sleep(ms(60)).await; // 1575
        assert_eq!(rx.borrow().displayed, "He");

        assert_eq!(handle.await.unwrap(), RevealOutcome::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_frames() {
        let token = CancellationToken::new();
        let (rx, handle) = Typewriter::new("Hello").spawn(token.clone());

        tokio::time::sleep(ms(1545)).await;
        assert_eq!(rx.borrow().displayed, "H");
        token.cancel();
        assert_eq!(handle.await.unwrap(), RevealOutcome::Cancelled);

        tokio::time::sleep(ms(1000)).await;
        assert_eq!(rx.borrow().displayed, "H");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let (rx, handle) = Typewriter::new("Hello").spawn(token);
        assert_eq!(handle.await.unwrap(), RevealOutcome::Cancelled);
        assert!(!rx.borrow().started);
    }
}
