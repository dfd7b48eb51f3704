use chrono::{DateTime, Utc};

use super::Message;
use crate::core::paths::endpoints;
use crate::model::{Direction, QuestEvent, TransferEvent};

const INCOMING_COLOR: u32 = 0x00FF00;
const OUTGOING_COLOR: u32 = 0xFF0000;
const QUEST_COLOR: u32 = 0xFFA500;
const FIELD_LIMIT: usize = 1024;
const UNVERIFIED_DISCLAIMER: &str =
    "Disclaimer: Transactions with ❌ involves unverified contracts. Exercise caution.";

/// Anything the watcher announces.
#[derive(Debug, Clone, Copy)]
pub enum Notice<'a> {
    Transfer { event: &'a TransferEvent, direction: Direction },
    Quest(&'a QuestEvent),
}

/// Builds the message for every notice kind.
#[derive(Debug, Clone)]
pub struct Renderer {
    explorer_tx_url: String,
}

impl Default for Renderer {
    fn default() -> Self { Self::new(endpoints::EXPLORER_TX) }
}

impl Renderer {
    pub fn new(explorer_tx_url: impl Into<String>) -> Self {
        Self { explorer_tx_url: explorer_tx_url.into().trim_end_matches('/').to_string() }
    }

    pub fn render(&self, notice: Notice<'_>) -> Message {
        match notice {
            Notice::Transfer { event, direction } => self.transfer(event, direction),
            Notice::Quest(quest) => self.quest(quest),
        }
    }

    fn transfer(&self, event: &TransferEvent, direction: Direction) -> Message {
        let (verb, color, party_label) = match direction {
            Direction::Incoming => ("Received", INCOMING_COLOR, "From"),
            Direction::Outgoing => ("Transferred", OUTGOING_COLOR, "To"),
        };
        let link = format!("{}/{}", self.explorer_tx_url, event.hash);

        Message::new(format!("{verb} Token: {}", event.token_symbol), color)
            .field("Tx Hash", format!("[View on Explorer]({link})"), false)
            .field("Received at", format_timestamp(&event.timestamp), false)
            .field(party_label, direction.counterparty(event), false)
            .field("Amount", format_amount(event.amount), true)
            .field("Verified", if event.verified { "✅" } else { "❌" }, true)
            .footer(UNVERIFIED_DISCLAIMER)
    }

    fn quest(&self, quest: &QuestEvent) -> Message {
        let mut message = Message::new(format!("New Quest: {}", quest.name), QUEST_COLOR);

        if let Some(description) = quest.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            message = message.field("Description", clip(description), false);
        }
        if !quest.rewards.is_empty() {
            let rewards = quest
                .rewards
                .iter()
                .map(|r| format!("{} {}", r.amount, r.symbol))
                .collect::<Vec<_>>()
                .join(", ");
            message = message.field("Rewards", clip(&rewards), false);
        }
        if let Some(end) = &quest.end_time {
            message = message.field("Ends", format_timestamp(end), true).timestamp(*end);
        }
        if let Some(sponsor) = &quest.sponsor {
            message = message.field("Sponsor", sponsor.name.clone(), true);
        }
        if let Some(logo) = quest.logo_url.as_deref().filter(|l| !l.is_empty()) {
            message = message.thumbnail(logo);
        }
        message
    }
}

/// `March 01, 2024 12:01:00 PM UTC`
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%B %d, %Y %I:%M:%S %p UTC").to_string()
}

/// Four decimals with thousands separators: `1,234.5000`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }
    let fixed = format!("{:.4}", amount.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

fn clip(text: &str) -> String {
    match text.char_indices().nth(FIELD_LIMIT - 1) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QuestId, QuestReward, Sponsor};
    use chrono::TimeZone;

    fn transfer() -> TransferEvent {
        TransferEvent {
            hash: "0xfeed".into(),
            token_symbol: "AXS".into(),
            from: "0xsender".into(),
            to: "0xwallet".into(),
            verified: false,
            amount: 1_234_567.891_23,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 1, 5).unwrap(),
        }
    }

    #[test]
    fn amounts() {
        assert_eq!(format_amount(0.5), "0.5000");
        assert_eq!(format_amount(999.0), "999.0000");
        assert_eq!(format_amount(1000.0), "1,000.0000");
        assert_eq!(format_amount(1_234_567.891_23), "1,234,567.8912");
        assert_eq!(format_amount(-12_345.0), "-12,345.0000");
        assert_eq!(format_amount(-0.00001), "0.0000");
    }

    #[test]
    fn timestamps() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 15, 4, 5).unwrap();
        assert_eq!(format_timestamp(&at), "March 01, 2024 03:04:05 PM UTC");
    }

    #[test]
    fn incoming_transfer_message() {
        let event = transfer();
        let message = Renderer::new("https://explorer.test/tx/")
            .render(Notice::Transfer { event: &event, direction: Direction::Incoming });

        assert_eq!(message.title, "Received Token: AXS");
        assert_eq!(message.color, 0x00FF00);
        assert_eq!(message.field_value("Tx Hash"), Some("[View on Explorer](https://explorer.test/tx/0xfeed)"));
        assert_eq!(message.field_value("From"), Some("0xsender"));
        assert_eq!(message.field_value("Amount"), Some("1,234,567.8912"));
        assert_eq!(message.field_value("Verified"), Some("❌"));
        assert!(message.footer.is_some());
    }

    #[test]
    fn outgoing_transfer_names_recipient() {
        let event = transfer();
        let message = Renderer::default().render(Notice::Transfer { event: &event, direction: Direction::Outgoing });
        assert_eq!(message.title, "Transferred Token: AXS");
        assert_eq!(message.color, 0xFF0000);
        assert_eq!(message.field_value("To"), Some("0xwallet"));
        assert_eq!(message.field_value("From"), None);
    }

    #[test]
    fn quest_message_skips_absent_fields() {
        let bare = QuestEvent {
            id: QuestId::from("1"),
            name: "Login".into(),
            description: Some("  ".into()),
            logo_url: None,
            end_time: None,
            rewards: vec![],
            sponsor: None,
        };
        let message = Renderer::default().render(Notice::Quest(&bare));
        assert_eq!(message.title, "New Quest: Login");
        assert!(message.fields.is_empty());
        assert!(message.thumbnail.is_none());

        let full = QuestEvent {
            description: Some("Win a match".into()),
            logo_url: Some("https://cdn.test/logo.png".into()),
            end_time: Utc.timestamp_opt(1_700_000_000, 0).single(),
            rewards: vec![
                QuestReward { amount: "10".into(), symbol: "RON".into() },
                QuestReward { amount: "2".into(), symbol: "AXS".into() },
            ],
            sponsor: Some(Sponsor { name: "Sky Mavis".into() }),
            ..bare
        };
        let message = Renderer::default().render(Notice::Quest(&full));
        assert_eq!(message.field_value("Rewards"), Some("10 RON, 2 AXS"));
        assert_eq!(message.field_value("Sponsor"), Some("Sky Mavis"));
        assert_eq!(message.field_value("Ends"), Some("November 14, 2023 10:13:20 PM UTC"));
        assert_eq!(message.thumbnail.unwrap().url, "https://cdn.test/logo.png");
    }
}
