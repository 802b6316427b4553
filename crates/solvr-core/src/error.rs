use std::fmt;

/// Machine-readable error codes shared by the core and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    MissingApiUrl,
    Unauthenticated,
    TaskNotFound,
    ValidationFailed,
    VotingNotApplicable,
    InsufficientRights,
    InvalidVoteAmount,
    SelfVote,
    AlreadyVoted,
    NotPermitted,
    TransportFailed,
    ServerRejected,
    DecodeFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::MissingApiUrl => "E1002",
            Self::Unauthenticated => "E2001",
            Self::TaskNotFound => "E3001",
            Self::ValidationFailed => "E3003",
            Self::VotingNotApplicable => "E4001",
            Self::InsufficientRights => "E4002",
            Self::InvalidVoteAmount => "E4003",
            Self::SelfVote => "E4004",
            Self::AlreadyVoted => "E4005",
            Self::NotPermitted => "E4006",
            Self::TransportFailed => "E5001",
            Self::ServerRejected => "E5002",
            Self::DecodeFailed => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::MissingApiUrl => "API URL not configured",
            Self::Unauthenticated => "Not signed in",
            Self::TaskNotFound => "Task not found",
            Self::ValidationFailed => "Input failed validation",
            Self::VotingNotApplicable => "Voting is not available for this task",
            Self::InsufficientRights => "Not enough voting rights",
            Self::InvalidVoteAmount => "Invalid vote amount",
            Self::SelfVote => "Cannot vote for your own solution",
            Self::AlreadyVoted => "Already voted for this solution",
            Self::NotPermitted => "Action not available for this task",
            Self::TransportFailed => "Network request failed",
            Self::ServerRejected => "Server rejected the request",
            Self::DecodeFailed => "Unexpected server response",
        }
    }

    /// Optional remediation hint that can be surfaced to users.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in the solvr config.toml and retry."),
            Self::MissingApiUrl => Some("Pass --api-url or set SOLVR_API_URL."),
            Self::Unauthenticated => Some("Pass --token or set SOLVR_TOKEN to sign in."),
            Self::TaskNotFound | Self::AlreadyVoted => None,
            Self::ValidationFailed => Some("Correct the highlighted field and retry."),
            Self::VotingNotApplicable => {
                Some("Only contributors of community tasks, or owners of personal tasks, vote.")
            }
            Self::InsufficientRights => Some("Lower the amount to at most your remaining rights."),
            Self::InvalidVoteAmount => Some("Use a positive whole amount."),
            Self::SelfVote => Some("Vote for someone else's solution."),
            Self::NotPermitted => {
                Some("Closed tasks accept nothing; owners cannot solve their own tasks.")
            }
            Self::TransportFailed => Some("Check connectivity and retry."),
            Self::ServerRejected => Some("Read the server message; retry if it was transient."),
            Self::DecodeFailed => Some("Check that --api-url points at a solvr API."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
