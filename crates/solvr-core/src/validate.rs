//! Typed form schemas.
//!
//! Each form is a draft struct with named fields whose `validate` returns
//! either the payload the API accepts or a tagged [`ValidationError`]. The
//! CLI maps variants to display text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::TaskKind;

pub const MAX_TITLE_LEN: usize = 120;
pub const MAX_BODY_LEN: usize = 5000;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 24;
const SOLANA_PUBKEY_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Deadline,
    InitialFund,
    Content,
    Amount,
    Username,
    WalletAddress,
}

impl Field {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::Deadline => "deadline",
            Self::InitialFund => "initial fund",
            Self::Content => "content",
            Self::Amount => "amount",
            Self::Username => "username",
            Self::WalletAddress => "wallet address",
        }
    }

    /// Machine code, e.g. `invalid_title`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Title => "invalid_title",
            Self::Description => "invalid_description",
            Self::Deadline => "invalid_deadline",
            Self::InitialFund => "invalid_initial_fund",
            Self::Content => "invalid_content",
            Self::Amount => "invalid_amount",
            Self::Username => "invalid_username",
            Self::WalletAddress => "invalid_wallet_address",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: Field },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },

    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },

    #[error("{field} contains characters that are not allowed")]
    InvalidCharacters { field: Field },

    #[error("{field} must be greater than zero")]
    NotPositive { field: Field },

    #[error("{field} is not a valid Solana address")]
    InvalidAddress { field: Field },

    #[error("{field} must be in the future")]
    DeadlineInPast { field: Field },
}

impl ValidationError {
    #[must_use]
    pub const fn field(&self) -> Field {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::InvalidCharacters { field }
            | Self::NotPositive { field }
            | Self::InvalidAddress { field }
            | Self::DeadlineInPast { field } => *field,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.field().code()
    }

    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "provide a value",
            Self::TooLong { .. } => "shorten the text",
            Self::TooShort { .. } => "use a longer value",
            Self::InvalidCharacters { field: Field::Username } => {
                "use only letters, digits and underscores"
            }
            Self::InvalidCharacters { .. } => "remove control characters",
            Self::NotPositive { .. } => "use a whole amount of at least 1",
            Self::InvalidAddress { .. } => "paste the base58 public key of your wallet",
            Self::DeadlineInPast { .. } => "pick a deadline after now",
        }
    }
}

fn single_line(field: Field, raw: &str, max: usize) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(value.to_string())
}

fn multi_line(field: Field, raw: &str, max: usize) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if value
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t' && c != '\r')
    {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(value.to_string())
}

fn positive(field: Field, amount: u64) -> Result<u64, ValidationError> {
    if amount == 0 {
        Err(ValidationError::NotPositive { field })
    } else {
        Ok(amount)
    }
}

/// Validate a username's shape (availability is a separate server check).
pub fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let field = Field::Username;
    let value = raw.trim();
    let len = value.chars().count();
    if len == 0 {
        return Err(ValidationError::Empty { field });
    }
    if len < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field,
            min: MIN_USERNAME_LEN,
        });
    }
    if len > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_USERNAME_LEN,
        });
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidCharacters { field });
    }
    Ok(value.to_string())
}

/// A Solana address is the base58 encoding of a 32-byte public key.
pub fn validate_solana_address(raw: &str) -> Result<String, ValidationError> {
    let field = Field::WalletAddress;
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    match bs58::decode(value).into_vec() {
        Ok(bytes) if bytes.len() == SOLANA_PUBKEY_LEN => Ok(value.to_string()),
        _ => Err(ValidationError::InvalidAddress { field }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    pub deadline: Option<DateTime<Utc>>,
    pub initial_fund: Option<u64>,
}

/// Payload for `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub kind: TaskKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_fund: Option<u64>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<NewTask, ValidationError> {
        self.validate_at(Utc::now())
    }

    pub fn validate_at(&self, now: DateTime<Utc>) -> Result<NewTask, ValidationError> {
        let title = single_line(Field::Title, &self.title, MAX_TITLE_LEN)?;
        let description = multi_line(Field::Description, &self.description, MAX_BODY_LEN)?;
        if self.deadline.is_some_and(|deadline| deadline <= now) {
            return Err(ValidationError::DeadlineInPast {
                field: Field::Deadline,
            });
        }
        let initial_fund = self
            .initial_fund
            .map(|amount| positive(Field::InitialFund, amount))
            .transpose()?;
        Ok(NewTask {
            title,
            description,
            kind: self.kind,
            deadline: self.deadline,
            initial_fund,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionDraft {
    pub content: String,
}

/// Payload for `POST /tasks/{id}/solutions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSolution {
    pub content: String,
}

impl SolutionDraft {
    pub fn validate(&self) -> Result<NewSolution, ValidationError> {
        Ok(NewSolution {
            content: multi_line(Field::Content, &self.content, MAX_BODY_LEN)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundDraft {
    pub amount: u64,
}

impl FundDraft {
    pub fn validate(&self) -> Result<u64, ValidationError> {
        positive(Field::Amount, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub username: String,
    pub wallet_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

impl ProfileDraft {
    pub fn validate(&self) -> Result<Profile, ValidationError> {
        let username = validate_username(&self.username)?;
        let wallet_address = self
            .wallet_address
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(validate_solana_address)
            .transpose()?;
        Ok(Profile {
            username,
            wallet_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    // System program id: 32 zero bytes.
    const VALID_ADDRESS: &str = "11111111111111111111111111111111";

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "  Port the parser  ".into(),
            description: "Needs tests.\nAnd docs.".into(),
            kind: TaskKind::Community,
            deadline: None,
            initial_fund: Some(500),
        }
    }

    #[test]
    fn task_draft_trims_and_passes() {
        let task = draft().validate().unwrap();
        assert_eq!(task.title, "Port the parser");
        assert_eq!(task.initial_fund, Some(500));
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut d = draft();
        d.title = "   ".into();
        assert_eq!(
            d.validate(),
            Err(ValidationError::Empty {
                field: Field::Title
            })
        );
    }

    #[test]
    fn long_title_is_rejected() {
        let mut d = draft();
        d.title = "x".repeat(MAX_TITLE_LEN + 1);
        let err = d.validate().unwrap_err();
        assert_eq!(err.field(), Field::Title);
        assert_eq!(err.code(), "invalid_title");
    }

    #[test]
    fn title_control_chars_are_rejected() {
        let mut d = draft();
        d.title = "a\u{7}b".into();
        assert!(matches!(
            d.validate(),
            Err(ValidationError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn past_deadline_is_rejected() {
        let now = Utc::now();
        let mut d = draft();
        d.deadline = Some(now - Duration::hours(1));
        assert!(matches!(
            d.validate_at(now),
            Err(ValidationError::DeadlineInPast { .. })
        ));
        d.deadline = Some(now + Duration::days(3));
        assert!(d.validate_at(now).is_ok());
    }

    #[test]
    fn zero_initial_fund_is_rejected() {
        let mut d = draft();
        d.initial_fund = Some(0);
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::NotPositive {
                field: Field::InitialFund
            }
        );
    }

    #[test]
    fn new_task_serializes_camel_case() {
        let json = serde_json::to_value(draft().validate().unwrap()).unwrap();
        assert_eq!(json["initialFund"], 500);
        assert!(json.get("deadline").is_none());
    }

    #[test]
    fn solution_content_rules() {
        assert!(SolutionDraft { content: "x".into() }.validate().is_ok());
        assert!(SolutionDraft { content: "\n ".into() }.validate().is_err());
        let long = "y".repeat(MAX_BODY_LEN + 1);
        assert!(matches!(
            SolutionDraft { content: long }.validate(),
            Err(ValidationError::TooLong { max: MAX_BODY_LEN, .. })
        ));
    }

    #[test]
    fn fund_amount_must_be_positive() {
        assert_eq!(FundDraft { amount: 10 }.validate(), Ok(10));
        assert!(FundDraft { amount: 0 }.validate().is_err());
    }

    #[test]
    fn username_rules() {
        assert_eq!(validate_username(" ada_99 ").unwrap(), "ada_99");
        assert!(matches!(
            validate_username("ab"),
            Err(ValidationError::TooShort { min: 3, .. })
        ));
        assert!(matches!(
            validate_username(&"a".repeat(25)),
            Err(ValidationError::TooLong { .. })
        ));
        let err = validate_username("ada lovelace").unwrap_err();
        assert_eq!(err.suggestion(), "use only letters, digits and underscores");
    }

    #[test]
    fn solana_address_rules() {
        assert!(validate_solana_address(VALID_ADDRESS).is_ok());
        // 0, O, I and l are outside the base58 alphabet.
        assert!(validate_solana_address("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl").is_err());
        // Valid base58 but too short for a public key.
        assert!(validate_solana_address("3mJr7AoUXx2Wqd").is_err());
        assert!(validate_solana_address("").is_err());
    }

    #[test]
    fn profile_wallet_is_optional() {
        let profile = ProfileDraft {
            username: "grace".into(),
            wallet_address: Some("  ".into()),
        }
        .validate()
        .unwrap();
        assert!(profile.wallet_address.is_none());

        let err = ProfileDraft {
            username: "grace".into(),
            wallet_address: Some("not-an-address".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Field::WalletAddress);
    }

    #[test]
    fn messages_name_the_field() {
        let err = ValidationError::TooLong {
            field: Field::Title,
            max: 120,
        };
        assert_eq!(err.to_string(), "title must be at most 120 characters");
    }
}
