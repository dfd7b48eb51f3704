//! Feed events: token transfers and quests
//!
//! Both event kinds are decoded straight from the upstream JSON records and
//! are immutable afterwards. Decoding is lenient per record: a page keeps
//! every record that decodes and drops the rest (see [`decode_page`]).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One ERC-20 transfer touching the watched wallet.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferEvent {
    #[serde(rename = "transaction_hash")]
    pub hash: String,
    #[serde(default)]
    pub token_symbol: String,
    #[serde(rename = "from_address")]
    pub from: String,
    #[serde(rename = "to_address")]
    pub to: String,
    #[serde(rename = "verified_contract", default)]
    pub verified: bool,
    #[serde(rename = "value_decimal", deserialize_with = "amount_from_json")]
    pub amount: f64,
    #[serde(rename = "block_timestamp", deserialize_with = "timestamp_from_json")]
    pub timestamp: DateTime<Utc>,
}

/// Which side of a transfer the watched wallet is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    /// Incoming when the destination is the watched wallet, ignoring case.
    pub fn classify(event: &TransferEvent, watched: &str) -> Self {
        if event.to.eq_ignore_ascii_case(watched) {
            Direction::Incoming
        } else {
            Direction::Outgoing
        }
    }

    /// The other party: sender for incoming, recipient for outgoing.
    pub fn counterparty<'a>(&self, event: &'a TransferEvent) -> &'a str {
        match self {
            Direction::Incoming => &event.from,
            Direction::Outgoing => &event.to,
        }
    }
}

/// Quest identity. Feeds send either strings or integers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl QuestId {
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestId {
    fn from(value: &str) -> Self { Self(value.to_string()) }
}

impl<'de> Deserialize<'de> for QuestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(QuestId(s)),
            Value::Number(n) => Ok(QuestId(n.to_string())),
            other => Err(de::Error::custom(format!("invalid quest id: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestReward {
    #[serde(deserialize_with = "amount_text_from_json")]
    pub amount: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sponsor {
    pub name: String,
}

/// One quest from the quest listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestEvent {
    pub id: QuestId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "logo")]
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "epoch_from_json")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rewards: Vec<QuestReward>,
    #[serde(default)]
    pub sponsor: Option<Sponsor>,
}

/// Parse a feed timestamp. A literal `Z` suffix is rewritten to `+00:00`;
/// a timestamp without any offset is taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z') {
        Some(stem) => format!("{stem}+00:00"),
        None => raw.to_string(),
    };
    match DateTime::parse_from_rfc3339(&normalized) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(rfc_err) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(|_| rfc_err),
    }
}

/// Decode every record of a page that is well-formed, logging the rest.
pub fn decode_page<T: DeserializeOwned>(records: Vec<Value>, feed: &str) -> Vec<T> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<T>(record) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(feed, index, error = %e, "skipping malformed feed record");
                None
            }
        })
        .collect()
}

fn timestamp_from_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(|e| de::Error::custom(format!("bad timestamp {raw:?}: {e}")))
}

fn amount_from_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| de::Error::custom("amount out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| de::Error::custom(format!("bad amount {s:?}: {e}"))),
        other => Err(de::Error::custom(format!("invalid amount: {other}"))),
    }
}

fn amount_text_from_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s),
        other => Err(de::Error::custom(format!("invalid reward amount: {other}"))),
    }
}

fn epoch_from_json<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let secs = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(other) => return Err(de::Error::custom(format!("invalid end time: {other}"))),
    };
    let secs = secs.ok_or_else(|| de::Error::custom("end time is not epoch seconds"))?;
    Ok(Utc.timestamp_opt(secs, 0).single())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer(to: &str) -> TransferEvent {
        serde_json::from_value(json!({
            "transaction_hash": "0xabc",
            "token_symbol": "RON",
            "from_address": "0x1111",
            "to_address": to,
            "verified_contract": true,
            "value_decimal": "1234.5",
            "block_timestamp": "2024-03-01T12:01:00.000Z"
        }))
        .unwrap()
    }

    #[test]
    fn decodes_moralis_record() {
        let event = transfer("0x2222");
        assert_eq!(event.hash, "0xabc");
        assert_eq!(event.amount, 1234.5);
        assert!(event.verified);
        assert_eq!(event.timestamp, Utc.with_ymd_and_hms(2024, 3, 1, 12, 1, 0).unwrap());
    }

    #[test]
    fn z_suffix_and_offsets_agree() {
        let z = parse_timestamp("2024-03-01T12:00:00Z").unwrap();
        let offset = parse_timestamp("2024-03-01T14:00:00+02:00").unwrap();
        let bare = parse_timestamp("2024-03-01T12:00:00").unwrap();
        assert_eq!(z, offset);
        assert_eq!(z, bare);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn direction_ignores_address_case() {
        let event = transfer("0xAbCdEf");
        assert_eq!(Direction::classify(&event, "0xabcdef"), Direction::Incoming);
        assert_eq!(Direction::classify(&event, "0xABCDEF"), Direction::Incoming);
        assert_eq!(Direction::classify(&event, "0x1111"), Direction::Outgoing);

        assert_eq!(Direction::Incoming.counterparty(&event), "0x1111");
        assert_eq!(Direction::Outgoing.counterparty(&event), "0xAbCdEf");
    }

    #[test]
    fn quest_ids_accept_numbers_and_strings() {
        let quests: Vec<QuestEvent> = decode_page(
            vec![
                json!({"id": 42, "name": "Daily", "end_time": 1_700_000_000, "rewards": [{"amount": 5, "symbol": "AXS"}], "sponsor": {"name": "Sky Mavis"}}),
                json!({"id": "q-7", "name": "Weekly", "rewards": null}),
                json!({"name": "no id"}),
            ],
            "quests",
        );
        assert_eq!(quests.len(), 2);
        assert_eq!(quests[0].id, QuestId::from("42"));
        assert_eq!(quests[0].rewards[0].amount, "5");
        assert_eq!(quests[0].end_time, Utc.timestamp_opt(1_700_000_000, 0).single());
        assert_eq!(quests[1].id.as_str(), "q-7");
        assert!(quests[1].rewards.is_empty());
        assert!(quests[1].sponsor.is_none());
    }

    #[test]
    fn malformed_transfer_is_skipped_not_fatal() {
        let page: Vec<TransferEvent> = decode_page(
            vec![
                json!({"transaction_hash": "0x1", "from_address": "a", "to_address": "b", "value_decimal": "x", "block_timestamp": "2024-03-01T12:00:00Z"}),
                json!({"transaction_hash": "0x2", "from_address": "a", "to_address": "b", "value_decimal": 3, "block_timestamp": "2024-03-01T12:00:00Z"}),
            ],
            "transfers",
        );
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].hash, "0x2");
    }
}
