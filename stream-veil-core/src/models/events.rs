use serde::{Deserialize, Serialize};

use super::constraints::AccessConstraints;

/// Informational events published to the cross-surface messaging channel.
///
/// These are one-way notifications; nothing in the acquisition path depends
/// on a response to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccessEvent {
    Requested {
        wants_audio: bool,
        wants_video: bool,
        at: String,
    },
    Substituted {
        transformed_id: String,
        raw_id: String,
        at: String,
    },
    Denied {
        reason: String,
        at: String,
    },
    Ended {
        stream_id: String,
        at: String,
    },
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl AccessEvent {
    pub fn requested(constraints: &AccessConstraints) -> Self {
        Self::Requested {
            wants_audio: constraints.wants_audio,
            wants_video: constraints.wants_video,
            at: now(),
        }
    }

    pub fn substituted(transformed_id: impl ToString, raw_id: impl ToString) -> Self {
        Self::Substituted {
            transformed_id: transformed_id.to_string(),
            raw_id: raw_id.to_string(),
            at: now(),
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
            at: now(),
        }
    }

    pub fn ended(stream_id: impl ToString) -> Self {
        Self::Ended {
            stream_id: stream_id.to_string(),
            at: now(),
        }
    }

    /// JSON encoding used by channel-based sinks.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_event_round_trips_as_json() {
        let event = AccessEvent::requested(&AccessConstraints::audio());
        let json = event.to_json();

        let back: AccessEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
        assert!(json.contains("\"type\":\"requested\""));
    }

    #[test]
    fn events_carry_timestamps() {
        match AccessEvent::denied("platform refused") {
            AccessEvent::Denied { at, .. } => assert!(!at.is_empty()),
            _ => unreachable!(),
        }
    }
}
