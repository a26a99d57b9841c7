//! Bot copy.

use super::step::{MenuOption, WizardStep};

pub const GREETING: &str = "Hello! How can I help you today?";

pub const ASK_NAME: &str = "Please enter your name:";
pub const ASK_EMAIL: &str = "Please enter your email:";
pub const ASK_PHONE: &str = "Please enter your phone number:";
pub const ASK_URL: &str = "Please enter the website URL to generate leads:";

pub const THANK_YOU: &str = "Thanks for contacting us, we will reach you soon.";
pub const FORM_FAILED: &str =
    "Sorry, there was an error submitting your information. Please try again later.";

pub const REDIRECT_SERVICES: &str = "Redirecting you to our services page...";
pub const REDIRECT_PRICING: &str = "Redirecting you to our pricing page...";

pub const LEADS_FOUND: &str = "Here are the leads I found:";
pub const LEADS_NOT_FOUND: &str = "I couldn't find any leads on that website. Please check the URL and try again, or try a different website.";

pub const CHAT_FAILED: &str = "❌ Failed to fetch response from server.";
pub const CHAT_UNKNOWN_REPLY: &str = "⚠️ Unknown response type.";

pub const MICROPHONE_FAILED: &str =
    "Sorry, I could not access your microphone. Please check your permissions.";

const ASK_A_QUESTION_REPLY: &str = "Feel free to ask any question! I'm here to help.";
const FALLBACK_REPLY: &str = "How can I assist you with that?";

/// Question asked on entering a wizard step.
pub fn step_prompt(step: WizardStep) -> Option<&'static str> {
    match step {
        WizardStep::CollectingName => Some(ASK_NAME),
        WizardStep::CollectingEmail => Some(ASK_EMAIL),
        WizardStep::CollectingPhone => Some(ASK_PHONE),
        WizardStep::CollectingUrl => Some(ASK_URL),
        WizardStep::None => None,
    }
}

/// Announcement shown before following a redirect returned by chat.
pub fn redirecting_to(url: &str) -> String {
    format!("Redirecting you to {url}...")
}

pub fn transcription_failed(reason: &str) -> String {
    format!("Sorry, there was an error transcribing your voice message: {reason}")
}

/// Canned reply for a menu option that does not start the contact form.
pub fn canned_reply(option: &MenuOption) -> &'static str {
    match option {
        MenuOption::AskQuestion => ASK_A_QUESTION_REPLY,
        _ => FALLBACK_REPLY,
    }
}
