//! Contact page: support form and the scripted live-chat bot.

use std::time::Duration;

use thiserror::Error;
use tokio::time;
use tracing::info;

use crate::config::Config;
use crate::model::is_valid_email;
use crate::reference::support_ticket_number;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Emergency,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "emergency" => Some(Priority::Emergency),
            _ => None,
        }
    }

    /// Hint shown under the priority selector.
    pub fn hint(self) -> &'static str {
        match self {
            Priority::Low => "Response within 24 hours",
            Priority::Medium => "Response within 4 hours",
            Priority::High => "Response within 1 hour",
            Priority::Emergency => "Immediate response - Call us directly",
        }
    }

    /// Emergencies also get the call-us prompt.
    pub fn needs_direct_contact(self) -> bool {
        self == Priority::Emergency
    }
}

/// Expected response time; unknown or missing priorities count as medium.
pub fn response_time(priority: Option<Priority>) -> &'static str {
    match priority {
        Some(Priority::Low) => "24 hours",
        Some(Priority::High) => "1 hour",
        Some(Priority::Emergency) => "15 minutes",
        Some(Priority::Medium) | None => "4 hours",
    }
}

/// Hint shown under the subject selector, if the subject has one.
pub fn subject_hint(subject: &str) -> Option<&'static str> {
    Some(match subject {
        "booking" => "Please include your booking reference number if you have one.",
        "refund" => "Refund requests are processed within 5-7 business days.",
        "event-info" => "Check our FAQ section for common event questions.",
        "technical" => "Please describe the issue and what device/browser you're using.",
        "accessibility" => "We're committed to making our events accessible to everyone.",
        "media" => "Media inquiries will be forwarded to our PR team.",
        "partnership" => "Partnership proposals will be reviewed by our business development team.",
        "feedback" => "We value your feedback and use it to improve our services.",
        _ => return None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub priority: String,
}

impl ContactForm {
    pub fn validate(&self) -> Result<(), ContactError> {
        let required = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("subject", &self.subject),
            ("message", &self.message),
        ];
        let missing: Vec<_> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(ContactError::MissingFields(missing));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(())
    }
}

/// Support ticket opened by a contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportTicket {
    pub number: String,
    pub response_time: &'static str,
}

/// Validate and "send" the form; the send takes the configured contact delay.
pub async fn submit(form: &ContactForm, config: &Config) -> Result<SupportTicket, ContactError> {
    form.validate()?;
    time::sleep(config.contact_submit_delay).await;
    let ticket = SupportTicket {
        number: support_ticket_number(),
        response_time: response_time(Priority::parse(&form.priority)),
    };
    info!(ticket = %ticket.number, subject = %form.subject, "support message sent");
    Ok(ticket)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Human,
    Email,
    Phone,
}

/// Where a quick action sends the visitor, besides the chat itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEffect {
    None,
    /// Chat closed, contact form brought into view.
    FocusContactForm,
    Dial(&'static str),
}

const SUPPORT_PHONE: &str = "tel:+975553629";

/// Keyword reply for a visitor message, and whether quick actions follow it.
pub fn bot_reply(message: &str) -> (&'static str, bool) {
    let lower = message.to_lowercase();

    let reply = if mentions_any(&lower, &["booking", "ticket"]) {
        "I can help you with booking issues! Do you have a booking reference number? If so, please share it and I'll look up your reservation."
    } else if mentions_any(&lower, &["refund", "cancel"]) {
        "For refund requests, I can guide you through the process. Refunds are typically processed within 5-7 business days. What's your booking reference?"
    } else if mentions_any(&lower, &["event", "schedule"]) {
        "I can provide information about our events! Which event are you interested in? You can also check our events page for detailed schedules and information."
    } else if mentions_any(&lower, &["hello", "hi"]) {
        "Hello! I'm here to help with any questions about EventPulse. What can I assist you with today?"
    } else if mentions_any(&lower, &["help"]) {
        "I'm here to help! I can assist with booking issues, event information, refunds, and general questions. What do you need help with?"
    } else {
        "Thanks for your message! For complex issues, I'd recommend connecting with our human support team. Would you like me to transfer you to a live agent?"
    };
    (reply, mentions_any(&lower, &["booking", "refund"]))
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Live-chat widget state.
#[derive(Debug)]
pub struct ChatWidget {
    open: bool,
    reply_delay: Duration,
    messages: Vec<ChatMessage>,
    quick_actions: bool,
}

impl ChatWidget {
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            open: false,
            reply_delay,
            messages: Vec::new(),
            quick_actions: false,
        }
    }

    /// Widget answering after the configured chat reply delay.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chat_reply_delay)
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether the quick action buttons are showing.
    pub fn quick_actions_offered(&self) -> bool {
        self.quick_actions
    }

    /// Post a visitor message and wait for the bot's reply. Blank input is ignored.
    pub async fn send(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.push(Sender::User, text);

        time::sleep(self.reply_delay).await;
        let (reply, offer_actions) = bot_reply(text);
        self.push(Sender::Bot, reply);
        if offer_actions {
            self.quick_actions = true;
        }
    }

    pub async fn quick_action(&mut self, action: QuickAction) -> ChatEffect {
        match action {
            QuickAction::Human => {
                self.push(Sender::Bot, "Connecting you to a human agent...");
                time::sleep(self.reply_delay).await;
                self.push(
                    Sender::Bot,
                    "A support agent will be with you shortly. Average wait time is 2-3 minutes.",
                );
                ChatEffect::None
            }
            QuickAction::Email => {
                self.close();
                ChatEffect::FocusContactForm
            }
            QuickAction::Phone => ChatEffect::Dial(SUPPORT_PHONE),
        }
    }

    fn push(&mut self, sender: Sender, text: &str) {
        self.messages.push(ChatMessage {
            sender,
            text: text.to_string(),
        });
    }
}
