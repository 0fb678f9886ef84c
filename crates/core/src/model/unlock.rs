use serde::{Deserialize, Serialize};

/// Reward category revealed after answering a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnlockKind {
    /// Revealed when the answer was correct.
    Fact,
    /// Revealed when the answer was incorrect.
    Tip,
}

/// A fact or tip revealed to the player as a reward for answering.
///
/// The session keeps unlocks deduplicated by text, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlock {
    pub kind: UnlockKind,
    pub text: String,
}

impl Unlock {
    #[must_use]
    pub fn new(kind: UnlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_lowercase_wire_names() {
        let json = serde_json::to_string(&Unlock::new(UnlockKind::Fact, "x")).unwrap();
        assert!(json.contains(r#""kind":"fact""#));

        let tip: Unlock = serde_json::from_str(r#"{"kind":"tip","text":"y"}"#).unwrap();
        assert_eq!(tip.kind, UnlockKind::Tip);
    }
}
