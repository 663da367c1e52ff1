//! Defines the core data model for transactions and how it is read from a data source.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};
use time_tz::Tz;

use crate::timezone::to_local;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money came into or left an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money paid into an account, increases the balance.
    Deposit,
    /// Money taken out of an account, decreases the balance.
    Withdraw,
}

/// A single deposit or withdrawal as delivered by the data source.
///
/// Transactions are immutable once loaded. To create a new `Transaction`, use
/// [Transaction::build] or deserialize one from JSON or CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The unique identifier of the transaction.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    /// When the transaction happened. Dates after the current moment are pending.
    #[serde(
        serialize_with = "serialize_epoch_millis",
        deserialize_with = "deserialize_date"
    )]
    pub date: OffsetDateTime,
    /// The amount in minor units, e.g. cents. Never negative.
    #[serde(deserialize_with = "deserialize_minor_units")]
    pub amount: u64,
    /// Whether the amount was deposited or withdrawn.
    pub transaction_type: TransactionType,
    /// The account the transaction belongs to.
    pub account: String,
    /// The industry of the counterparty, e.g. "Food Consumables".
    pub industry: String,
    /// The state the transaction happened in, e.g. "TX".
    pub state: String,
    /// The ISO 4217 currency code of the amount, e.g. "USD".
    pub currency: String,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        amount: u64,
        date: OffsetDateTime,
        transaction_type: TransactionType,
    ) -> TransactionBuilder {
        TransactionBuilder {
            id: String::new(),
            amount,
            date,
            transaction_type,
            account: String::new(),
            industry: String::new(),
            state: String::new(),
            currency: DEFAULT_CURRENCY.to_owned(),
        }
    }

    /// The amount in major units, e.g. dollars rather than cents.
    pub fn amount_in_major_units(&self) -> f64 {
        minor_to_major_units(i128::from(self.amount))
    }

    /// The amount in minor units with the sign given by the transaction type:
    /// positive for deposits and negative for withdrawals.
    pub fn signed_minor_units(&self) -> i128 {
        match self.transaction_type {
            TransactionType::Deposit => i128::from(self.amount),
            TransactionType::Withdraw => -i128::from(self.amount),
        }
    }

    /// Whether the transaction is dated strictly after `now`.
    pub fn is_pending_at(&self, now: OffsetDateTime) -> bool {
        self.date > now
    }

    /// Return the transaction with its date expressed in `timezone`, using
    /// the offset in force on that date.
    ///
    /// The point in time does not change, only the calendar day and month it
    /// falls in when grouping.
    pub fn in_timezone(mut self, timezone: &Tz) -> Self {
        self.date = to_local(self.date, timezone);
        self
    }
}

/// The currency assumed when no transaction says otherwise.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Convert a sum of minor units (e.g. cents) to major units (e.g. dollars).
pub(crate) fn minor_to_major_units(minor_units: i128) -> f64 {
    minor_units as f64 / 100.0
}

/// A builder for creating [Transaction] instances.
///
/// The categorical fields default to empty strings and the currency to
/// [DEFAULT_CURRENCY]. Call [TransactionBuilder::finalize] to create the
/// [Transaction].
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    id: String,
    amount: u64,
    date: OffsetDateTime,
    transaction_type: TransactionType,
    account: String,
    industry: String,
    state: String,
    currency: String,
}

impl TransactionBuilder {
    /// Set the ID of the transaction.
    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_owned();
        self
    }

    /// Set the account of the transaction.
    pub fn account(mut self, account: &str) -> Self {
        self.account = account.to_owned();
        self
    }

    /// Set the industry of the transaction.
    pub fn industry(mut self, industry: &str) -> Self {
        self.industry = industry.to_owned();
        self
    }

    /// Set the state of the transaction.
    pub fn state(mut self, state: &str) -> Self {
        self.state = state.to_owned();
        self
    }

    /// Set the currency code of the transaction.
    pub fn currency(mut self, currency: &str) -> Self {
        self.currency = currency.to_owned();
        self
    }

    /// Create the [Transaction].
    pub fn finalize(self) -> Transaction {
        Transaction {
            id: self.id,
            date: self.date,
            amount: self.amount,
            transaction_type: self.transaction_type,
            account: self.account,
            industry: self.industry,
            state: self.state,
            currency: self.currency,
        }
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

/// Convert a point in time to milliseconds since the Unix epoch.
pub(crate) fn to_epoch_millis(date: OffsetDateTime) -> i64 {
    (date.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Convert milliseconds since the Unix epoch to a point in time (UTC).
///
/// Returns `None` if the timestamp is outside the range `time` supports.
pub(crate) fn from_epoch_millis(millis: i64) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000).ok()
}

/// Parse an RFC 3339 date-time or a `YYYY-MM-DD` calendar date.
///
/// Calendar dates are taken as midnight UTC.
pub(crate) fn parse_date_text(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(date_time) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(date_time);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}

/// The shapes a date may take in the data source.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawDate {
    Millis(i64),
    FractionalMillis(f64),
    Text(String),
}

impl RawDate {
    pub(crate) fn into_date_time(self) -> Option<OffsetDateTime> {
        match self {
            RawDate::Millis(millis) => from_epoch_millis(millis),
            RawDate::FractionalMillis(millis) if millis.is_finite() => {
                from_epoch_millis(millis.floor() as i64)
            }
            RawDate::FractionalMillis(_) => None,
            RawDate::Text(text) => text
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(from_epoch_millis)
                .or_else(|| parse_date_text(&text)),
        }
    }
}

fn serialize_epoch_millis<S: Serializer>(
    date: &OffsetDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(to_epoch_millis(*date))
}

fn deserialize_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    RawDate::deserialize(deserializer)?
        .into_date_time()
        .ok_or_else(|| {
            de::Error::custom(
                "expected epoch milliseconds, an RFC 3339 date-time or a YYYY-MM-DD date",
            )
        })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Integer(u64),
    Negative(i64),
    Decimal(f64),
    Text(String),
}

fn whole_minor_units(amount: f64) -> Option<u64> {
    if amount.is_finite() && amount >= 0.0 && amount.fract() == 0.0 && amount <= u64::MAX as f64 {
        Some(amount as u64)
    } else {
        None
    }
}

fn deserialize_minor_units<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let amount = match RawAmount::deserialize(deserializer)? {
        RawAmount::Integer(amount) => Some(amount),
        RawAmount::Negative(amount) => {
            return Err(de::Error::custom(format!("amount {amount} is negative")));
        }
        RawAmount::Decimal(amount) => whole_minor_units(amount),
        RawAmount::Text(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(whole_minor_units))
        }
    };

    amount.ok_or_else(|| de::Error::custom("amount must be a non-negative whole number of minor units"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Integer(i64),
    Text(String),
}

fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Integer(id) => id.to_string(),
        RawId::Text(id) => id,
    })
}
