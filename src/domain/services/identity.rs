use std::fmt;

/// A user reference as supplied by a caller: a numeric fid or a username alias
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserIdentifier {
    Fid(u64),
    Username(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidIdentifier(pub String);

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid user identifier: '{}'", self.0)
    }
}

impl std::error::Error for InvalidIdentifier {}

impl UserIdentifier {
    /// All-digit input is a fid; anything else is a username (leading `@` dropped)
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidIdentifier(raw.to_string()));
        }

        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            return trimmed
                .parse::<u64>()
                .map(UserIdentifier::Fid)
                .map_err(|_| InvalidIdentifier(raw.to_string()));
        }

        let name = trimmed.strip_prefix('@').unwrap_or(trimmed);
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
        if !valid {
            return Err(InvalidIdentifier(raw.to_string()));
        }

        Ok(UserIdentifier::Username(name.to_lowercase()))
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdentifier::Fid(fid) => write!(f, "fid:{}", fid),
            UserIdentifier::Username(name) => write!(f, "@{}", name),
        }
    }
}
