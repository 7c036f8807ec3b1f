use super::RecordKind;
use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;

/// CLASS code for the Internet; the only class this codec will meet.
pub const CLASS_INTERNET: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// QNAME, a domain name represented as a sequence of labels
    pub name: String,
    /// QTYPE, two octet code specifying the type of the query
    pub qtype: RecordKind,
    /// QCLASS, two octet code such as IN for the Internet
    pub qclass: u16,
}

impl Question {
    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, ReaderError> {
        Ok(Self {
            name: buffer.read_qname()?,
            qtype: RecordKind::from_num(buffer.read_u16()?),
            qclass: buffer.read_u16()?,
        })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.qtype.into_num())?;
        buffer.write_u16(self.qclass)?;

        Ok(())
    }
}
