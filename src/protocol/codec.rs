/// Upper bound on any wire payload. Oversized datagrams are discarded
/// without parsing.
pub const MAX_DATAGRAM_LEN: usize = 64;

const READING_PREFIX: &str = "LIGHT:";
const LEGACY_READING_PREFIX: &str = "SENSOR:";
const ANNOUNCE_PREFIX: &str = "MASTER:";
const RESET_PAYLOAD: &str = "RESET";

/// The closed set of messages a node can send or receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Periodic reading from a non-leader (`LIGHT:<int>`).
    Reading(i32),
    /// The leader's announced value (`MASTER:<int>`).
    LeaderAnnounce(i32),
    /// Force every node back to bootstrap (`RESET`). Honored only when it
    /// arrives on the telemetry channel.
    Reset,
}

impl Message {
    /// Decodes a raw payload, or `None` for anything unrecognized:
    /// oversized datagrams, invalid UTF-8, unknown prefixes, bad integers.
    /// Unrecognized traffic never surfaces an error.
    ///
    /// `SENSOR:` is accepted as a legacy alias of `LIGHT:`; older firmware
    /// revisions announced readings under that prefix.
    pub fn parse(payload: &[u8]) -> Option<Message> {
        if payload.len() > MAX_DATAGRAM_LEN {
            return None;
        }

        let text = std::str::from_utf8(payload).ok()?.trim();

        if text == RESET_PAYLOAD {
            return Some(Message::Reset);
        }
        if let Some(rest) = text.strip_prefix(ANNOUNCE_PREFIX) {
            return rest.trim().parse().ok().map(Message::LeaderAnnounce);
        }
        if let Some(rest) = text.strip_prefix(READING_PREFIX) {
            return rest.trim().parse().ok().map(Message::Reading);
        }
        if let Some(rest) = text.strip_prefix(LEGACY_READING_PREFIX) {
            return rest.trim().parse().ok().map(Message::Reading);
        }

        None
    }

    /// Serializes for the wire. Always fits within [`MAX_DATAGRAM_LEN`].
    pub fn encode(&self) -> String {
        match self {
            Message::Reading(value) => format!("{READING_PREFIX}{value}"),
            Message::LeaderAnnounce(value) => format!("{ANNOUNCE_PREFIX}{value}"),
            Message::Reset => RESET_PAYLOAD.to_string(),
        }
    }

    /// The value carried by a reading or announcement.
    pub fn value(&self) -> Option<i32> {
        match self {
            Message::Reading(value) | Message::LeaderAnnounce(value) => Some(*value),
            Message::Reset => None,
        }
    }
}
