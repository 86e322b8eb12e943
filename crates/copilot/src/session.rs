//! Co-pilot chat session bound to one campaign.
//!
//! The view opens with an analysis of the campaign's rates against targets.
//! Every message the user sends schedules the scripted assistant reply after
//! a fixed delay. Pending replies are tied to the view's cancellation token:
//! once the view is closed or dropped, nothing is appended any more.

use std::sync::Arc;
use std::time::Duration;

use campaign_core::config::{CopilotConfig, TargetsConfig};
use campaign_core::format;
use campaign_core::types::Campaign;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const PRESET_PROMPTS: [&str; 4] = [
    "Optimize subject line",
    "Change image",
    "Adapt to VIP segment",
    "Target CR ≥ 3%",
];

pub const CANNED_REPLY: &str = "I've analyzed your request. Here's my suggestion: Consider \
using a more action-oriented subject line with urgency. I can also recommend updating the \
hero image to showcase product benefits more clearly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn versus(actual: f64, target: f64) -> String {
    let label = format::percent(target);
    if actual < target {
        format!("below the {label} target")
    } else {
        format!("at or above the {label} target")
    }
}

/// Opening assistant message for `campaign`.
pub fn analysis_message(campaign: &Campaign, targets: &TargetsConfig) -> String {
    let ctr = campaign.click_through_rate;
    let cr = campaign.conversion_rate;
    let ctr_advice = if ctr < targets.ctr {
        "• Sharpen the headline with a stronger call to action\n\
         • Test a more visible placement for the CTA button"
    } else {
        "• Keep the current headline and CTA placement\n\
         • Try a bolder offer to push CTR further"
    };
    let cr_advice = if cr < targets.conversion_rate {
        "• Shorten the landing page and remove friction\n\
         • Reinforce trust signals near the checkout"
    } else {
        "• Great result, keep this structure\n\
         • Consider raising the target"
    };

    format!(
        "I've analyzed your variant. Here are my recommendations to improve performance:\n\n\
         📊 Current CTR: {} ({})\n{ctr_advice}\n\n\
         💰 Current CR: {} ({})\n{cr_advice}\n\n\
         🎯 Priority actions:\n\
         1. Add urgency to the headline\n\
         2. Improve the contrast of the main button\n\
         3. Simplify the user journey\n\n\
         What would you like to optimize first?",
        format::percent(ctr),
        versus(ctr, targets.ctr),
        format::percent(cr),
        versus(cr, targets.conversion_rate),
    )
}

/// Chat view for one campaign. Must be used inside a tokio runtime.
pub struct CopilotView {
    campaign_id: String,
    campaign_title: String,
    transcript: Arc<Mutex<Vec<ChatMessage>>>,
    draft: String,
    unsaved_changes: bool,
    reply_delay: Duration,
    token: CancellationToken,
    pending: Vec<JoinHandle<()>>,
}

impl CopilotView {
    pub fn open(campaign: &Campaign, targets: &TargetsConfig, config: &CopilotConfig) -> Self {
        info!(campaign_id = %campaign.id, "Opening co-pilot");
        Self {
            campaign_id: campaign.id.clone(),
            campaign_title: campaign.title.clone(),
            transcript: Arc::new(Mutex::new(vec![ChatMessage::assistant(analysis_message(
                campaign, targets,
            ))])),
            draft: String::new(),
            unsaved_changes: false,
            reply_delay: Duration::from_millis(config.reply_delay_ms),
            token: CancellationToken::new(),
            pending: Vec::new(),
        }
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    pub fn campaign_title(&self) -> &str {
        &self.campaign_title
    }

    pub fn presets(&self) -> &'static [&'static str] {
        &PRESET_PROMPTS
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Copy preset `index` into the draft. Returns the prompt, or `None`
    /// for an unknown index.
    pub fn apply_preset(&mut self, index: usize) -> Option<&'static str> {
        let prompt = PRESET_PROMPTS.get(index).copied()?;
        self.draft = prompt.to_string();
        Some(prompt)
    }

    /// Send the current draft. Blank drafts and closed views send nothing.
    pub fn send(&mut self) -> bool {
        if self.is_closed() || self.draft.trim().is_empty() {
            return false;
        }
        let content = std::mem::take(&mut self.draft);
        self.transcript.lock().push(ChatMessage::user(content));
        self.unsaved_changes = true;

        self.pending.retain(|handle| !handle.is_finished());
        self.pending.push(self.schedule_reply());
        debug!(
            campaign_id = %self.campaign_id,
            pending = self.pending.len(),
            "Reply scheduled"
        );
        true
    }

    fn schedule_reply(&self) -> JoinHandle<()> {
        let transcript = Arc::clone(&self.transcript);
        let token = self.token.clone();
        let delay = self.reply_delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    metrics::counter!("copilot.replies_cancelled").increment(1);
                    debug!("Reply dropped, view closed");
                }
                _ = tokio::time::sleep(delay) => {
                    transcript.lock().push(ChatMessage::assistant(CANNED_REPLY));
                }
            }
        })
    }

    /// Snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().clone()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    pub fn pending_replies(&self) -> usize {
        self.pending.iter().filter(|h| !h.is_finished()).count()
    }

    /// Wait until every scheduled reply has been delivered or dropped.
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Reply task failed");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Tear the view down; pending replies are discarded.
    pub fn close(&mut self) {
        if !self.is_closed() {
            info!(campaign_id = %self.campaign_id, "Closing co-pilot");
            self.token.cancel();
        }
    }
}

impl Drop for CopilotView {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campaign_core::CampaignCatalog;

    fn open_view() -> CopilotView {
        let campaign = CampaignCatalog::with_demo_campaigns().get("1").unwrap();
        CopilotView::open(
            &campaign,
            &TargetsConfig::default(),
            &CopilotConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_opens_with_analysis() {
        let view = open_view();
        let messages = view.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert!(messages[0].content.contains("Current CTR: 4.2% (below the 5.0% target)"));
        assert!(messages[0].content.contains("Priority actions"));
        assert!(!view.has_unsaved_changes());
        assert_eq!(view.presets().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_draft_is_ignored() {
        let mut view = open_view();
        assert!(!view.send());
        view.set_draft("   \n");
        assert!(!view.send());
        assert_eq!(view.messages().len(), 1);
        assert!(!view.has_unsaved_changes());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_arrives_after_delay() {
        let mut view = open_view();
        view.set_draft("Make it pop");
        assert!(view.send());
        assert_eq!(view.draft(), "");
        assert!(view.has_unsaved_changes());

        let messages = view.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Make it pop");

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(view.messages().len(), 2);

        view.settle().await;
        let messages = view.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, CANNED_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_view_never_receives_reply() {
        let mut view = open_view();
        view.set_draft("hello");
        view.send();
        tokio::time::sleep(Duration::from_millis(500)).await;
        view.close();
        view.settle().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(view.messages().len(), 2);

        view.set_draft("again");
        assert!(!view.send());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_view_cancels_replies() {
        let mut view = open_view();
        view.set_draft("hello");
        view.send();
        let transcript = Arc::clone(&view.transcript);
        drop(view);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(transcript.lock().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_preset_fills_draft() {
        let mut view = open_view();
        assert_eq!(view.apply_preset(1), Some("Change image"));
        assert_eq!(view.draft(), "Change image");
        assert_eq!(view.apply_preset(9), None);
        assert!(view.send());
        assert_eq!(view.messages()[1].content, "Change image");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_message_gets_a_reply() {
        let mut view = open_view();
        for text in ["one", "two", "three"] {
            view.set_draft(text);
            view.send();
        }
        assert_eq!(view.pending_replies(), 3);
        view.settle().await;
        let roles: Vec<Role> = view.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Assistant,
                Role::User,
                Role::User,
                Role::User,
                Role::Assistant,
                Role::Assistant,
                Role::Assistant,
            ]
        );
        assert_eq!(view.pending_replies(), 0);
    }

    #[test]
    fn test_analysis_reads_met_targets() {
        let mut campaign = CampaignCatalog::with_demo_campaigns().get("4").unwrap();
        campaign.conversion_rate = 6.0;
        let text = analysis_message(&campaign, &TargetsConfig::default());
        assert!(text.contains("Current CTR: 5.0% (at or above the 5.0% target)"));
        assert!(text.contains("Current CR: 6.0% (at or above the 5.0% target)"));
        assert!(text.contains("keep this structure"));
    }

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains(r#""role":"user""#));
    }
}
