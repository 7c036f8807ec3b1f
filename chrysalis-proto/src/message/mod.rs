pub mod flags;
pub mod header;
pub mod question;
pub mod record;

use crate::buffer::{PacketBuffer, ReaderError, WriterError};

/// TYPE and QTYPE codes this codec knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum RecordKind {
    Unknown(u16),
    /// a host address
    A, // 1
    /// an authoritative name server
    NS, // 2
    /// the canonical name for an alias
    CNAME, // 5
    /// mail exchange
    MX, // 15
}

impl RecordKind {
    pub fn into_num(self) -> u16 {
        match self {
            RecordKind::Unknown(x) => x,
            RecordKind::A => 1,
            RecordKind::NS => 2,
            RecordKind::CNAME => 5,
            RecordKind::MX => 15,
        }
    }

    pub fn from_num(num: u16) -> RecordKind {
        match num {
            1 => RecordKind::A,
            2 => RecordKind::NS,
            5 => RecordKind::CNAME,
            15 => RecordKind::MX,
            _ => RecordKind::Unknown(num),
        }
    }
}

/// A whole DNS message: header plus the four record sections.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: header::Header,
    pub questions: Vec<question::Question>,
    pub answers: Vec<record::Record>,
    pub authorities: Vec<record::Record>,
    pub additionals: Vec<record::Record>,
}

impl TryFrom<PacketBuffer> for Message {
    type Error = ReaderError;

    fn try_from(mut buffer: PacketBuffer) -> Result<Self, Self::Error> {
        let header = header::Header::read(&mut buffer)?;

        let mut questions = Vec::with_capacity(header.questions as usize);
        for _ in 0..header.questions {
            questions.push(question::Question::read(&mut buffer)?);
        }

        let mut answers = Vec::with_capacity(header.answers as usize);
        for _ in 0..header.answers {
            answers.push(record::Record::read(&mut buffer)?);
        }

        let mut authorities = Vec::with_capacity(header.authorities as usize);
        for _ in 0..header.authorities {
            authorities.push(record::Record::read(&mut buffer)?);
        }

        let mut additionals = Vec::with_capacity(header.additionals as usize);
        for _ in 0..header.additionals {
            additionals.push(record::Record::read(&mut buffer)?);
        }

        Ok(Message {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

impl Message {
    /// Serialize into a fresh buffer. Section counts in the header are
    /// derived from the section lengths, never trusted from the caller.
    pub fn create_buffer(&mut self) -> Result<PacketBuffer, WriterError> {
        let mut buffer = PacketBuffer::default();
        self.header.questions = self.questions.len() as u16;
        self.header.answers = self.answers.len() as u16;
        self.header.authorities = self.authorities.len() as u16;
        self.header.additionals = self.additionals.len() as u16;

        self.header.write(&mut buffer)?;

        for question in &self.questions {
            question.write(&mut buffer)?;
        }
        for rec in &self.answers {
            rec.write(&mut buffer)?;
        }
        for rec in &self.authorities {
            rec.write(&mut buffer)?;
        }
        for rec in &self.additionals {
            rec.write(&mut buffer)?;
        }

        Ok(buffer)
    }
}
