use super::flags::Flags;
use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;

/// The fixed twelve-byte message header (RFC 1035 section 4.1.1).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Header {
    /// A 16 bit identifier assigned by the program that generates any
    /// kind of query, copied into the corresponding reply so the
    /// requester can match up replies to outstanding queries.
    pub id: u16,
    pub flags: Flags,
    /// QDCOUNT, number of entries in the question section
    pub questions: u16,
    /// ANCOUNT, number of resource records in the answer section
    pub answers: u16,
    /// NSCOUNT, number of name server records in the authority section
    pub authorities: u16,
    /// ARCOUNT, number of records in the additional section
    pub additionals: u16,
}

impl Header {
    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, ReaderError> {
        Ok(Self {
            id: buffer.read_u16()?,
            flags: Flags::unpack(buffer.read_u16()?),
            questions: buffer.read_u16()?,
            answers: buffer.read_u16()?,
            authorities: buffer.read_u16()?,
            additionals: buffer.read_u16()?,
        })
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        buffer.write_u16(self.id)?;
        buffer.write_u16(self.flags.pack())?;
        buffer.write_u16(self.questions)?;
        buffer.write_u16(self.answers)?;
        buffer.write_u16(self.authorities)?;
        buffer.write_u16(self.additionals)?;

        Ok(())
    }
}
