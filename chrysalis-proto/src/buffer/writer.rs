use std::fmt::Display;

use super::{PacketBuffer, MAX_LABEL_LENGTH, MAX_NAME_LENGTH, PACKET_SIZE};

#[derive(Debug, PartialEq, Eq)]
pub enum WriterError {
    EndOfBuffer,
    EmptyLabel,
    LabelTooLong(usize),
    NameTooLong(usize),
    /// A compression pointer only carries 14 bits of offset.
    PointerTooFar(usize),
    UnsupportedKind(u16),
    InvalidRdataLength { kind: u16, length: usize },
}

impl Display for WriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfBuffer => write!(f, "writing out of buffer"),
            Self::EmptyLabel => write!(f, "empty label within a name"),
            Self::LabelTooLong(length) => write!(f, "label of {length} bytes is too long"),
            Self::NameTooLong(length) => write!(f, "name of {length} bytes is too long"),
            Self::PointerTooFar(offset) => {
                write!(f, "offset {offset} does not fit in a compression pointer")
            }
            Self::UnsupportedKind(kind) => write!(f, "unsupported record kind {kind}"),
            Self::InvalidRdataLength { kind, length } => {
                write!(f, "rdata of {length} bytes is invalid for record kind {kind}")
            }
        }
    }
}

impl std::error::Error for WriterError {}

impl PacketBuffer {
    fn write(&mut self, val: u8) -> Result<(), WriterError> {
        if self.pos >= PACKET_SIZE {
            return Err(WriterError::EndOfBuffer);
        }
        self.buf[self.pos] = val;
        self.pos += 1;
        Ok(())
    }

    pub fn write_u8(&mut self, val: u8) -> Result<(), WriterError> {
        self.write(val)?;

        Ok(())
    }

    pub fn write_u16(&mut self, val: u16) -> Result<(), WriterError> {
        self.write((val >> 8) as u8)?;
        self.write((val & 0xFF) as u8)?;

        Ok(())
    }

    pub fn write_u32(&mut self, val: u32) -> Result<(), WriterError> {
        self.write(((val >> 24) & 0xFF) as u8)?;
        self.write(((val >> 16) & 0xFF) as u8)?;
        self.write(((val >> 8) & 0xFF) as u8)?;
        self.write((val & 0xFF) as u8)?;

        Ok(())
    }

    fn write_label(&mut self, label: &str) -> Result<(), WriterError> {
        if label.is_empty() {
            return Err(WriterError::EmptyLabel);
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(WriterError::LabelTooLong(label.len()));
        }
        self.write_u8(label.len() as u8)?;
        for b in label.as_bytes() {
            self.write_u8(*b)?;
        }
        Ok(())
    }

    /// Write a domain name as length-prefixed labels with a zero
    /// terminator. A name that was already written whole into this
    /// message collapses to a two-byte pointer at its earlier offset.
    pub fn write_qname(&mut self, qname: &str) -> Result<(), WriterError> {
        if qname.is_empty() {
            return self.write_u8(0);
        }
        if qname.len() > MAX_NAME_LENGTH {
            return Err(WriterError::NameTooLong(qname.len()));
        }
        if let Some(&offset) = self.written_names.get(qname) {
            if offset > 0x3FFF {
                return Err(WriterError::PointerTooFar(offset));
            }
            return self.write_u16(0xC000 | offset as u16);
        }
        self.written_names.insert(qname.to_string(), self.pos);
        for label in qname.split('.') {
            self.write_label(label)?;
        }
        self.write_u8(0)
    }
}
