//! Classification of driver errors into "session lost" and everything else

use orasession_core::{DEFAULT_SESSION_LOST_CODES, Result, SessionError};
use regex::Regex;

/// Decides whether a driver error means the server dropped our session
///
/// Matching is a prefix match of `ORA-<code>` against the error message;
/// the code must end at a word boundary.
#[derive(Debug, Clone)]
pub struct SessionLostClassifier {
    pattern: Option<Regex>,
    codes: Vec<String>,
}

impl SessionLostClassifier {
    /// Build a classifier for the given ORA codes (digits only, e.g. `"03114"`)
    ///
    /// An empty list yields a classifier that never reports session loss.
    pub fn new<S: AsRef<str>>(codes: impl IntoIterator<Item = S>) -> Result<Self> {
        let codes: Vec<String> = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_string())
            .collect();

        if let Some(bad) = codes
            .iter()
            .find(|code| code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()))
        {
            return Err(SessionError::Configuration(format!(
                "invalid session-lost code {:?}: expected digits only",
                bad
            )));
        }

        let pattern = compile(&codes)?;
        Ok(Self { pattern, codes })
    }

    /// Check an error message against the session-lost markers
    pub fn is_session_lost(&self, message: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(message))
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }
}

impl Default for SessionLostClassifier {
    fn default() -> Self {
        let codes: Vec<String> = DEFAULT_SESSION_LOST_CODES
            .iter()
            .map(|code| code.to_string())
            .collect();
        Self {
            pattern: compile(&codes).ok().flatten(),
            codes,
        }
    }
}

fn compile(codes: &[String]) -> Result<Option<Regex>> {
    if codes.is_empty() {
        return Ok(None);
    }

    let alternatives = codes
        .iter()
        .map(|code| regex::escape(code))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"^ORA-(?:{})\b", alternatives))
        .map(Some)
        .map_err(|e| SessionError::Configuration(e.to_string()))
}
