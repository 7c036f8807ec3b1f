use super::RecordKind;
use crate::buffer::reader::ReaderError;
use crate::buffer::writer::WriterError;
use crate::buffer::PacketBuffer;
use std::net::Ipv4Addr;

/// A resource record from the answer, authority or additional section.
///
/// The rdata encoding depends on the kind. A records carry exactly four
/// address octets. NS, CNAME and MX rdata would carry names, which this
/// codec does not emit; rather than produce garbage for them, both
/// directions fail with an unsupported-kind error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub kind: RecordKind,
    pub class: u16,
    /// Seconds the record may be cached before it should be discarded
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

impl Record {
    /// An A record pointing `name` at `addr`.
    pub fn a(name: String, class: u16, ttl: u32, addr: Ipv4Addr) -> Self {
        Self {
            name,
            kind: RecordKind::A,
            class,
            ttl,
            rdata: addr.octets().to_vec(),
        }
    }

    pub fn read(buffer: &mut PacketBuffer) -> Result<Self, ReaderError> {
        let name = buffer.read_qname()?;
        let kind = RecordKind::from_num(buffer.read_u16()?);
        let class = buffer.read_u16()?;
        let ttl = buffer.read_u32()?;
        let length = buffer.read_u16()?;

        match kind {
            RecordKind::A => {
                if length != 4 {
                    return Err(ReaderError::InvalidRdataLength(length));
                }
                let rdata = buffer.get_range(buffer.pos(), 4)?.to_vec();
                buffer.step(4)?;
                Ok(Self {
                    name,
                    kind,
                    class,
                    ttl,
                    rdata,
                })
            }
            other => Err(ReaderError::UnsupportedKind(other.into_num())),
        }
    }

    pub fn write(&self, buffer: &mut PacketBuffer) -> Result<(), WriterError> {
        buffer.write_qname(&self.name)?;
        buffer.write_u16(self.kind.into_num())?;
        buffer.write_u16(self.class)?;
        buffer.write_u32(self.ttl)?;

        match self.kind {
            RecordKind::A => {
                if self.rdata.len() != 4 {
                    return Err(WriterError::InvalidRdataLength {
                        kind: self.kind.into_num(),
                        length: self.rdata.len(),
                    });
                }
                buffer.write_u16(4)?;
                for b in &self.rdata {
                    buffer.write_u8(*b)?;
                }
                Ok(())
            }
            other => Err(WriterError::UnsupportedKind(other.into_num())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Record;
    use crate::buffer::{PacketBuffer, ReaderError, WriterError};
    use crate::message::question::CLASS_INTERNET;
    use crate::message::RecordKind;
    use std::net::Ipv4Addr;

    #[test]
    fn should_round_trip_an_a_record() {
        let record = Record::a(
            "google.com".into(),
            CLASS_INTERNET,
            420,
            Ipv4Addr::new(127, 0, 0, 1),
        );
        let mut buffer = PacketBuffer::default();
        record.write(&mut buffer).unwrap();

        let mut buffer = PacketBuffer::new(buffer.buf);
        let decoded = Record::read(&mut buffer).unwrap();
        assert_eq!(decoded, record);
        assert_eq!(decoded.rdata, vec![127, 0, 0, 1]);
    }

    #[test]
    fn should_refuse_writing_a_cname() {
        let record = Record {
            name: "alias.example.com".into(),
            kind: RecordKind::CNAME,
            class: CLASS_INTERNET,
            ttl: 60,
            rdata: vec![],
        };
        let mut buffer = PacketBuffer::default();
        let error = record.write(&mut buffer).unwrap_err();
        assert_eq!(error, WriterError::UnsupportedKind(5));
    }

    #[test]
    fn should_refuse_writing_short_a_rdata() {
        let record = Record {
            name: "example.com".into(),
            kind: RecordKind::A,
            class: CLASS_INTERNET,
            ttl: 60,
            rdata: vec![127, 0, 0],
        };
        let mut buffer = PacketBuffer::default();
        let error = record.write(&mut buffer).unwrap_err();
        assert_eq!(
            error,
            WriterError::InvalidRdataLength { kind: 1, length: 3 }
        );
    }

    #[test]
    fn should_refuse_reading_an_mx() {
        let mut buffer = PacketBuffer::default();
        let record = Record::a(
            "example.com".into(),
            CLASS_INTERNET,
            60,
            Ipv4Addr::new(1, 2, 3, 4),
        );
        record.write(&mut buffer).unwrap();
        // rewrite the kind in place: name is 13 bytes on the wire
        buffer.buf[13] = 0;
        buffer.buf[14] = 15;

        let mut buffer = PacketBuffer::new(buffer.buf);
        let error = Record::read(&mut buffer).unwrap_err();
        assert_eq!(error, ReaderError::UnsupportedKind(15));
    }
}
