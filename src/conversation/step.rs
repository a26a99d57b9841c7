//! Wizard steps and menu options.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position in the lead-capture sequence.
///
/// Progresses CollectingName → CollectingEmail → CollectingPhone, optionally
/// followed by CollectingUrl, and returns to `None` when done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    None,
    CollectingName,
    CollectingEmail,
    CollectingPhone,
    CollectingUrl,
}

impl WizardStep {
    /// Whether moving from `self` to `target` is a legal transition.
    pub fn can_transition_to(&self, target: WizardStep) -> bool {
        use WizardStep as S;
        match (*self, target) {
            // A menu selection (re)starts the contact form from anywhere.
            (_, S::CollectingName) => true,
            (S::CollectingName, S::CollectingEmail) | (S::CollectingEmail, S::CollectingPhone) => {
                true
            }
            (S::None | S::CollectingPhone | S::CollectingUrl, S::CollectingUrl) => true,
            (from, S::None) => from != S::None,
            _ => false,
        }
    }

    /// The contact-form step that follows this one.
    pub fn next_contact_field(&self) -> Option<WizardStep> {
        match self {
            Self::CollectingName => Some(Self::CollectingEmail),
            Self::CollectingEmail => Some(Self::CollectingPhone),
            Self::None | Self::CollectingPhone | Self::CollectingUrl => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::CollectingName => "collecting_name",
            Self::CollectingEmail => "collecting_email",
            Self::CollectingPhone => "collecting_phone",
            Self::CollectingUrl => "collecting_url",
        };
        write!(f, "{s}")
    }
}

/// A button label offered by the greeting menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuOption {
    BookDemo,
    Services,
    Pricing,
    GenerateLeads,
    Leads,
    AskQuestion,
    Other(String),
}

/// What happens once the contact form is known to be complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    /// Announce and then navigate to `path`.
    Redirect {
        path: &'static str,
        announcement: &'static str,
    },
    /// Ask for a website to scrape.
    CollectUrl,
    Done,
}

impl MenuOption {
    /// The greeting menu, in display order.
    pub const GREETING_MENU: [MenuOption; 6] = [
        MenuOption::BookDemo,
        MenuOption::Services,
        MenuOption::GenerateLeads,
        MenuOption::Leads,
        MenuOption::AskQuestion,
        MenuOption::Pricing,
    ];

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Book A Demo" => Self::BookDemo,
            "Services" => Self::Services,
            "Pricing" => Self::Pricing,
            "Generate Leads" => Self::GenerateLeads,
            "Leads" => Self::Leads,
            "Ask a Question" => Self::AskQuestion,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::BookDemo => "Book A Demo",
            Self::Services => "Services",
            Self::Pricing => "Pricing",
            Self::GenerateLeads => "Generate Leads",
            Self::Leads => "Leads",
            Self::AskQuestion => "Ask a Question",
            Self::Other(label) => label,
        }
    }

    /// Options that are gated behind the contact form.
    pub fn requires_contact(&self) -> bool {
        matches!(
            self,
            Self::BookDemo | Self::Services | Self::Pricing | Self::GenerateLeads | Self::Leads
        )
    }

    /// Where the conversation goes after the contact form for this option.
    pub fn follow_up(&self) -> FollowUp {
        match self {
            Self::Services => FollowUp::Redirect {
                path: "/services",
                announcement: super::prompts::REDIRECT_SERVICES,
            },
            Self::Pricing => FollowUp::Redirect {
                path: "/pricing",
                announcement: super::prompts::REDIRECT_PRICING,
            },
            Self::GenerateLeads | Self::Leads => FollowUp::CollectUrl,
            Self::BookDemo | Self::AskQuestion | Self::Other(_) => FollowUp::Done,
        }
    }
}

impl fmt::Display for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
