//! Tag-value FIX message body and the outbound slot guard.

use super::FixSession;
use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A FIX application message as a MsgType plus tag→value body.
///
/// The engine owns framing (BeginString, BodyLength, sequence numbers,
/// checksum); this type carries only the application-level fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixMessage {
    msg_type: String,
    fields: BTreeMap<u32, String>,
}

impl FixMessage {
    pub fn new(msg_type: &str) -> Self {
        Self {
            msg_type: msg_type.to_string(),
            fields: BTreeMap::new(),
        }
    }

    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    pub fn set_field(&mut self, tag: u32, value: impl fmt::Display) {
        self.fields.insert(tag, value.to_string());
    }

    pub fn has_field(&self, tag: u32) -> bool {
        self.fields.contains_key(&tag)
    }

    pub fn get_str(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    /// First character of the field value. FIX char fields are single-byte on
    /// the wire, so this is the full value for well-formed messages.
    pub fn get_char(&self, tag: u32) -> Option<char> {
        self.fields.get(&tag).and_then(|v| v.chars().next())
    }

    pub fn get_int(&self, tag: u32) -> Option<i32> {
        self.fields.get(&tag).and_then(|v| v.parse().ok())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl fmt::Display for FixMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "35={}", self.msg_type)?;
        for (tag, value) in &self.fields {
            write!(f, "|{}={}", tag, value)?;
        }
        Ok(())
    }
}

/// Scoped guard over a claimed outbound ring-buffer slot.
///
/// Exactly one of two things happens to a claim: [`commit`](Self::commit)
/// publishes it, or the guard aborts it on drop. Populating fields can fail
/// partway through on any code path; the drop-abort guarantees the slot is
/// released in every case.
pub struct OutboundMessage {
    session: Arc<dyn FixSession>,
    token: u64,
    msg: FixMessage,
    committed: bool,
}

impl OutboundMessage {
    /// Claim an outbound slot for `msg_type`. `None` when the engine refuses
    /// the claim (buffer full, session unable to send).
    pub fn claim(session: Arc<dyn FixSession>, msg_type: &str) -> Option<Self> {
        let token = session.try_claim(msg_type)?;
        Some(Self {
            session,
            token,
            msg: FixMessage::new(msg_type),
            committed: false,
        })
    }

    pub fn set_field(&mut self, tag: u32, value: impl fmt::Display) {
        self.msg.set_field(tag, value);
    }

    /// Mutable view of the message body for field populators.
    pub fn body_mut(&mut self) -> &mut FixMessage {
        &mut self.msg
    }

    pub fn msg_type(&self) -> &str {
        self.msg.msg_type()
    }

    /// Publish the slot. On error the claim is still held by this guard and
    /// will be aborted when the guard drops.
    pub fn commit(mut self) -> Result<()> {
        let msg = std::mem::take(&mut self.msg);
        match self.session.commit_message(self.token, msg) {
            Ok(()) => {
                self.committed = true;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for OutboundMessage {
    fn drop(&mut self) {
        if !self.committed {
            self.session.abort_message(self.token);
        }
    }
}
