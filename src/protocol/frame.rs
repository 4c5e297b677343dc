//! Network frame — the application-level unit carried by the wire protocol.

use bytes::Bytes;

use super::wire_format::{CHUNK_FLOW_SIZE, CHUNK_TASK_SIZE, FRAME_MAX_SIZE};

/// Priority assigned to frames that don't set one explicitly.
pub const DEFAULT_PRIORITY: u8 = 10;

/// An application frame: a data payload plus routing metadata.
///
/// On the wire every chunk of a frame carries a full copy of the metadata;
/// the receiver reassembles `data` from the chunk payloads. Task and flow
/// tags travel NUL-padded to exactly 6 bytes, so a decoded frame's tags
/// keep their trailing NULs (the padded transport form).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFrame {
    /// Sender-assigned identifier grouping the chunks of one frame.
    pub id: u32,
    /// Sequence number assigned by the sender.
    pub number: u16,
    /// Opaque type/codec discriminator.
    pub interpretation: u8,
    /// Sender-side processing time tag.
    pub time: u16,
    /// Priority, [`DEFAULT_PRIORITY`] unless set.
    pub priority: u8,
    /// Sender task tag, UTF-8, at most [`CHUNK_TASK_SIZE`] bytes encoded.
    pub task: String,
    /// Logical stream tag, UTF-8, at most [`CHUNK_FLOW_SIZE`] bytes encoded.
    pub flow: String,
    /// Frame payload, at most [`FRAME_MAX_SIZE`] bytes.
    pub data: Bytes,
}

impl Default for NetworkFrame {
    fn default() -> Self {
        Self {
            id: 0,
            number: 0,
            interpretation: 0,
            time: 0,
            priority: DEFAULT_PRIORITY,
            task: String::new(),
            flow: String::new(),
            data: Bytes::new(),
        }
    }
}

impl NetworkFrame {
    /// True when the frame satisfies the encoder's preconditions: task,
    /// flow, and data are non-empty, the tags fit their encoded size, and
    /// the payload is within [`FRAME_MAX_SIZE`].
    pub fn is_transmissible(&self) -> bool {
        !self.task.is_empty()
            && !self.flow.is_empty()
            && !self.data.is_empty()
            && self.task.len() <= CHUNK_TASK_SIZE
            && self.flow.len() <= CHUNK_FLOW_SIZE
            && self.data.len() <= FRAME_MAX_SIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> NetworkFrame {
        NetworkFrame {
            id: 1,
            task: "cam".to_string(),
            flow: "video".to_string(),
            data: Bytes::from_static(b"payload"),
            ..NetworkFrame::default()
        }
    }

    #[test]
    fn test_default_priority() {
        assert_eq!(NetworkFrame::default().priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_transmissible() {
        assert!(frame().is_transmissible());
    }

    #[test]
    fn test_empty_fields_not_transmissible() {
        let mut f = frame();
        f.task = String::new();
        assert!(!f.is_transmissible());

        let mut f = frame();
        f.flow = String::new();
        assert!(!f.is_transmissible());

        let mut f = frame();
        f.data = Bytes::new();
        assert!(!f.is_transmissible());
    }

    #[test]
    fn test_tag_length_is_byte_length() {
        let mut f = frame();
        f.task = "abcdef".to_string();
        assert!(f.is_transmissible());

        // Seven bytes encoded, over the 6-byte wire field.
        f.task = "abcdefg".to_string();
        assert!(!f.is_transmissible());

        // Four characters but seven UTF-8 bytes.
        f.task = "äöüa".to_string();
        assert!(!f.is_transmissible());
    }

    #[test]
    fn test_oversize_data_not_transmissible() {
        let mut f = frame();
        f.data = Bytes::from(vec![0u8; FRAME_MAX_SIZE + 1]);
        assert!(!f.is_transmissible());
    }
}
