use cardline_core::domain::classification::Intent;
use serde::Serialize;

pub const GREETING: &str = "Hello! I'm Tracy, your Mastercard Virtual Assistant. For security purposes, I need to verify your identity before we proceed. Please enter your phone number associated with your Mastercard.";

const DEFAULT_ACTIONS: [&str; 3] =
    ["Check account balance", "View recent activity", "Contact support"];

/// Follow-up buttons offered after an answered turn.
pub fn suggested_actions(intent: Intent) -> Vec<String> {
    let actions: &[&str] = match intent {
        Intent::LostCard => {
            &["Freeze card immediately", "Order replacement card", "Review recent transactions"]
        }
        Intent::Dispute => &["View transaction details", "File dispute claim", "Contact merchant"],
        Intent::CheckBalance => {
            &["View recent transactions", "Download statement", "Set up alerts"]
        }
        Intent::FreezeCard => &["Freeze card now", "Unfreeze card", "Order replacement"],
        Intent::Rewards => &["View rewards balance", "Redeem points", "View earning history"],
        Intent::Travel => {
            &["Set travel dates", "View travel benefits", "Check foreign transaction fees"]
        }
        Intent::LiveAgent => &["Transfer to agent", "Schedule callback", "Send secure message"],
        Intent::GeneralInquiry => &["Check balance", "View transactions", "Contact support"],
        Intent::NewCard | Intent::Activate | Intent::Address | Intent::OffTopic => {
            &DEFAULT_ACTIONS
        }
    };
    actions.iter().map(ToString::to_string).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Capability {
    pub id: &'static str,
    pub icon: &'static str,
    pub text: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub capabilities: Vec<Capability>,
    pub greeting: &'static str,
}

/// Capabilities advertised on the welcome screen, in display order.
pub fn capabilities() -> Capabilities {
    let capabilities = vec![
        Capability { id: "1", icon: "💰", text: "Check account balance" },
        Capability { id: "2", icon: "🚨", text: "Report a lost or stolen card" },
        Capability { id: "3", icon: "❄️", text: "Freeze / unfreeze your Mastercard" },
        Capability { id: "9", icon: "✅", text: "Activate a new Mastercard" },
        Capability { id: "8", icon: "✈️", text: "Update travel notification for card use abroad" },
    ];
    Capabilities { capabilities, greeting: GREETING }
}

#[cfg(test)]
mod tests {
    use cardline_core::domain::classification::Intent;

    use super::{capabilities, suggested_actions};

    #[test]
    fn known_intents_map_to_their_rows() {
        assert_eq!(
            suggested_actions(Intent::LostCard),
            vec!["Freeze card immediately", "Order replacement card", "Review recent transactions"]
        );
        assert_eq!(
            suggested_actions(Intent::GeneralInquiry),
            vec!["Check balance", "View transactions", "Contact support"]
        );
    }

    #[test]
    fn intents_without_a_row_use_the_default() {
        for intent in [Intent::Activate, Intent::NewCard, Intent::Address] {
            assert_eq!(
                suggested_actions(intent),
                vec!["Check account balance", "View recent activity", "Contact support"]
            );
        }
    }

    #[test]
    fn capabilities_are_advertised_in_display_order() {
        let advertised = capabilities();
        let ids: Vec<&str> = advertised.capabilities.iter().map(|entry| entry.id).collect();
        assert_eq!(ids, vec!["1", "2", "3", "9", "8"]);
        assert!(advertised.greeting.starts_with("Hello! I'm Tracy"));
    }
}
