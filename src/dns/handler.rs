use chrysalis_proto::buffer::PacketBuffer;
use chrysalis_proto::message::header::Header;
use chrysalis_proto::message::record::Record;
use chrysalis_proto::message::Message;
use chrysalis_server::prelude::Datagram;
use std::net::Ipv4Addr;

pub(crate) const ANSWER_TTL: u32 = 420;

/// An authoritative stub: whatever name is asked, the answer is the one
/// configured address. That is the whole trick that steers a build tool
/// at the proxy.
pub(crate) struct DnsHandler {
    answer: Ipv4Addr,
}

impl DnsHandler {
    pub fn new(answer: Ipv4Addr) -> Self {
        Self { answer }
    }
}

#[async_trait::async_trait]
impl chrysalis_server::Handler for DnsHandler {
    #[tracing::instrument(skip_all, fields(origin = ?datagram.address))]
    async fn handle(&self, datagram: Datagram) -> Option<Datagram> {
        let buffer = PacketBuffer::new(datagram.buffer);
        let request = match Message::try_from(buffer) {
            Ok(message) => message,
            Err(error) => {
                tracing::error!("failed to deserialize message: {error}");
                return None;
            }
        };

        let Some(question) = request.questions.into_iter().next() else {
            tracing::error!("query carried no question");
            return None;
        };
        tracing::debug!("query for {:?}", question.name);

        let mut flags = request.header.flags;
        flags.response = true;
        flags.recursion_available = true;

        let answer = Record {
            name: question.name.clone(),
            kind: question.qtype,
            class: question.qclass,
            ttl: ANSWER_TTL,
            rdata: self.answer.octets().to_vec(),
        };
        let mut response = Message {
            header: Header {
                id: request.header.id,
                flags,
                ..Default::default()
            },
            questions: vec![question],
            answers: vec![answer],
            authorities: Vec::new(),
            additionals: Vec::new(),
        };

        let buffer = match response.create_buffer() {
            Ok(buffer) => buffer,
            Err(error) => {
                tracing::error!("failed to serialize response: {error}");
                return None;
            }
        };

        Some(Datagram {
            address: datagram.address,
            buffer: buffer.buf,
            size: buffer.pos(),
        })
    }
}
