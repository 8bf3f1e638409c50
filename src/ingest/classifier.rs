//! Line classifier for sshd and fail2ban log lines.
//!
//! Each recognised line maps to one [`LineType`]. Some types carry exactly
//! one captured field (the user name or the reverse-resolved host), the
//! rest carry none. The pattern table is compiled once on first use and
//! checked in order; the first match wins.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// The closed set of event categories the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    FailedPassword,
    InvalidUser,
    Accepted,
    MaxAuthAttempts,
    BreakInAttempt,
    NoIdentification,
    ConnectionClosed,
    ReceivedDisconnect,
    BadProtocol,
    AuthFailure,
    Ban,
    Unban,
    AlreadyBanned,
    Found,
}

impl LineType {
    pub const ALL: [LineType; 14] = [
        Self::FailedPassword,
        Self::InvalidUser,
        Self::Accepted,
        Self::MaxAuthAttempts,
        Self::BreakInAttempt,
        Self::NoIdentification,
        Self::ConnectionClosed,
        Self::ReceivedDisconnect,
        Self::BadProtocol,
        Self::AuthFailure,
        Self::Ban,
        Self::Unban,
        Self::AlreadyBanned,
        Self::Found,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FailedPassword => "failed_password",
            Self::InvalidUser => "invalid_user",
            Self::Accepted => "accepted",
            Self::MaxAuthAttempts => "max_auth_attempts",
            Self::BreakInAttempt => "break_in_attempt",
            Self::NoIdentification => "no_identification",
            Self::ConnectionClosed => "connection_closed",
            Self::ReceivedDisconnect => "received_disconnect",
            Self::BadProtocol => "bad_protocol",
            Self::AuthFailure => "auth_failure",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::AlreadyBanned => "already_banned",
            Self::Found => "found",
        }
    }

    /// Number of captured fields lines of this type report (0 or 1).
    pub const fn arity(self) -> usize {
        match self {
            Self::FailedPassword
            | Self::InvalidUser
            | Self::Accepted
            | Self::MaxAuthAttempts
            | Self::BreakInAttempt => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The classifier's verdict for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub line_type: LineType,
    /// `None` for zero-arity types, otherwise exactly one field.
    pub fields: Option<Vec<String>>,
}

struct Pattern {
    line_type: LineType,
    regex: Regex,
}

fn pattern(line_type: LineType, expr: &str) -> Pattern {
    Pattern {
        line_type,
        regex: Regex::new(expr).expect("classifier pattern"),
    }
}

// Order matters: "Failed password for invalid user" must win over "invalid user".
static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        pattern(
            LineType::FailedPassword,
            r"Failed (?:password|publickey|none|keyboard-interactive/pam) for (?:invalid user )?(\S+) from",
        ),
        pattern(
            LineType::MaxAuthAttempts,
            r"maximum authentication attempts exceeded for (?:invalid user )?(\S+) from",
        ),
        pattern(LineType::InvalidUser, r"[Ii]nvalid user (\S+) from"),
        pattern(LineType::Accepted, r"Accepted \S+ for (\S+) from"),
        pattern(
            LineType::BreakInAttempt,
            r"reverse mapping checking getaddrinfo for (\S+) \[[\d.]+\] failed",
        ),
        pattern(
            LineType::BreakInAttempt,
            r"Address [\d.]+ maps to ([^,\s]+), but this does not map back",
        ),
        pattern(
            LineType::NoIdentification,
            r"Did not receive identification string from",
        ),
        pattern(LineType::BadProtocol, r"Bad protocol version identification"),
        pattern(LineType::ReceivedDisconnect, r"Received disconnect from"),
        pattern(LineType::ConnectionClosed, r"Connection (?:closed|reset) by"),
        pattern(LineType::AuthFailure, r"authentication failure;.*rhost="),
        pattern(LineType::AlreadyBanned, r"\]\s+\S+\s+already banned"),
        pattern(LineType::Unban, r"\]\s+Unban\s"),
        pattern(LineType::Ban, r"\]\s+Ban\s"),
        pattern(LineType::Found, r"\]\s+Found\s"),
    ]
});

/// Classify a raw log line. Returns `None` for unrecognised lines.
pub fn classify(line: &str) -> Option<Classification> {
    PATTERNS.iter().find_map(|p| {
        let caps = p.regex.captures(line)?;
        let fields = if p.line_type.arity() == 1 {
            let field = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            Some(vec![field])
        } else {
            None
        };
        Some(Classification {
            line_type: p.line_type,
            fields,
        })
    })
}
