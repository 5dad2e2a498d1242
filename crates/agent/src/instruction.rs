use cardline_core::domain::account::{format_cents, format_long_date, Account};
use cardline_core::domain::card::CardStatus;
use cardline_core::domain::classification::{Intent, Sentiment};
use cardline_core::domain::conversation::ChatTurn;

pub const REPLACEMENT_CARD_LAST_FOUR: &str = "1234";

pub const SKIP_DEACTIVATION_DIRECTIVE: &str =
    "Do NOT mention the old card or offer to deactivate it. Only confirm the new card is activated.";

/// Everything the system instruction for one chat turn is built from.
#[derive(Clone, Copy, Debug)]
pub struct InstructionContext<'a> {
    pub account: &'a Account,
    pub intent: Intent,
    pub sentiment: Sentiment,
    /// Card status before this turn's command was applied.
    pub old_card_status: CardStatus,
    pub conversation_tail: &'a [ChatTurn],
}

pub fn deactivation_offer_directive(last_four: &str) -> String {
    format!("Ask whether they want to deactivate the old card ending in {last_four}.")
}

/// The activation step only offers to deactivate the old card when it is
/// still usable.
pub fn activation_directive(old_card_status: CardStatus, last_four: &str) -> String {
    match old_card_status {
        CardStatus::Active => deactivation_offer_directive(last_four),
        CardStatus::Frozen | CardStatus::LostStolen | CardStatus::Deactivated => {
            SKIP_DEACTIVATION_DIRECTIVE.to_string()
        }
    }
}

pub fn build_instruction(context: InstructionContext<'_>) -> String {
    let profile = context.account.profile();
    let mut out = format!(
        "You are Tracy, a professional and empathetic Mastercard Contact Center Virtual Assistant helping customer {}.\n\n",
        profile.holder_name
    );

    out.push_str(&customer_data_section(&context));
    out.push_str(&format!(
        "DETECTED INTENT: {}\nUSER SENTIMENT: {}\n\n",
        context.intent, context.sentiment
    ));
    out.push_str(&capability_section(&context));
    out.push_str(&conversation_section(context.conversation_tail));

    out.push_str("TONE: Professional, warm, concise. Use short clear sentences.");
    if context.sentiment.needs_empathy() {
        out.push_str(" The customer is upset: acknowledge their feelings first and show enhanced empathy.");
    }
    out.push_str("\n\nProvide a helpful, concise response based on the detected intent.");

    out
}

fn customer_data_section(context: &InstructionContext<'_>) -> String {
    let profile = context.account.profile();
    let card = context.account.card();
    format!(
        "CUSTOMER DATA (CONFIDENTIAL, never read back verbatim):\n\
         - Name: {name}\n\
         - Card ending in: {last_four} (never state any other digits)\n\
         - Old Card Status: {old_status} (active, frozen, lost_stolen, or deactivated)\n\
         - Current Card Status: {current_status}\n\
         - Address: {address}\n\
         - Account Status: {standing}\n\
         - Current Balance: {balance}\n\
         - Minimum Payment: {minimum}\n\
         - Next Payment Date: {due}\n\
         - Last Purchase: {purchase_amount} at {merchant}\n\
         - Number of Cards: {cards}\n\n",
        name = profile.holder_name,
        last_four = card.last_four(),
        old_status = context.old_card_status,
        current_status = card.status(),
        address = profile.address,
        standing = profile.standing,
        balance = format_cents(profile.balance_cents),
        minimum = format_cents(profile.minimum_payment_cents),
        due = format_long_date(profile.next_payment_date),
        purchase_amount = format_cents(profile.last_purchase.amount_cents),
        merchant = profile.last_purchase.merchant,
        cards = profile.number_of_cards,
    )
}

fn capability_section(context: &InstructionContext<'_>) -> String {
    let profile = context.account.profile();
    let last_four = context.account.card().last_four();
    format!(
        "CAPABILITY-SPECIFIC INSTRUCTIONS:\n\n\
         1. CHECK BALANCE (intent: check_balance):\n   \
         - Provide the current balance: {balance}\n   \
         - Mention the next payment date and minimum payment if relevant\n\n\
         2. REPORT LOST/STOLEN CARD (intent: lost_card):\n   \
         - Ask the user to type \"confirm\" to report the card ending in {last_four} as lost/stolen\n   \
         - Once confirmed, tell them the card is reported and a new card will arrive in 48 hours\n   \
         - Be empathetic about the situation\n\n\
         3. FREEZE/UNFREEZE CARD (intent: freeze_card):\n   \
         - If freezing: confirm the card ending in {last_four} is now frozen\n   \
         - If unfreezing: confirm the card ending in {last_four} is unfrozen and ready to use\n   \
         - Keep the response brief and clear\n\n\
         4. ACTIVATE NEW CARD (intent: activate):\n   \
         - Ask for the activation code from the new card packaging\n   \
         - Accept any code they provide\n   \
         - Confirm the new card ending in {REPLACEMENT_CARD_LAST_FOUR} is now activated\n   \
         - {activation}\n\n\
         5. TRAVEL NOTIFICATION (intent: travel):\n   \
         - Ask for the city, state/province and country they are travelling to\n   \
         - Once provided, confirm a travel note was added to their file\n   \
         - Wish them a happy and safe trip\n\n",
        balance = format_cents(profile.balance_cents),
        activation = activation_directive(context.old_card_status, last_four),
    )
}

fn conversation_section(tail: &[ChatTurn]) -> String {
    let mut out = String::from("RECENT CONVERSATION:\n");
    if tail.is_empty() {
        out.push_str("(none)\n");
    }
    for turn in tail {
        out.push_str(&format!("{}: {}\n", turn.role.as_str(), turn.content));
    }
    out.push('\n');
    out
}
