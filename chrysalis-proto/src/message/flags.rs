/// The second 16-bit word of the header, unpacked.
///
/// ```text
///                                 1  1  1  1  1  1
///   0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
///
/// `pack` and `unpack` cover every bit of the word, so they are inverse
/// of each other over all 16-bit values.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// QR, whether this message is a response (1) or a query (0)
    pub response: bool,
    /// Kind of query, set by the originator and copied into the response
    pub opcode: u8, // 4 bits
    /// AA, the responding name server is an authority for the qname
    pub authoritative: bool,
    /// TC, the message was truncated by the transmission channel
    pub truncated: bool,
    /// RD, directs the name server to pursue the query recursively
    pub recursion_desired: bool,
    /// RA, recursive query support is available in the name server
    pub recursion_available: bool,
    /// Reserved, must be zero in queries and responses
    pub z: u8, // 3 bits
    /// Response code, set as part of responses
    pub rcode: u8, // 4 bits
}

impl Flags {
    pub fn pack(&self) -> u16 {
        ((self.response as u16) << 15)
            | (((self.opcode & 0x0F) as u16) << 11)
            | ((self.authoritative as u16) << 10)
            | ((self.truncated as u16) << 9)
            | ((self.recursion_desired as u16) << 8)
            | ((self.recursion_available as u16) << 7)
            | (((self.z & 0x07) as u16) << 4)
            | ((self.rcode & 0x0F) as u16)
    }

    pub fn unpack(value: u16) -> Self {
        Self {
            response: (value >> 15) & 0x01 > 0,
            opcode: ((value >> 11) & 0x0F) as u8,
            authoritative: (value >> 10) & 0x01 > 0,
            truncated: (value >> 9) & 0x01 > 0,
            recursion_desired: (value >> 8) & 0x01 > 0,
            recursion_available: (value >> 7) & 0x01 > 0,
            z: ((value >> 4) & 0x07) as u8,
            rcode: (value & 0x0F) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Flags;

    #[test]
    fn pack_should_invert_unpack_over_every_word() {
        for value in 0..=u16::MAX {
            assert_eq!(Flags::unpack(value).pack(), value);
        }
    }

    #[test]
    fn should_place_bits_where_the_rfc_says() {
        let flags = Flags {
            response: true,
            recursion_desired: true,
            ..Default::default()
        };
        assert_eq!(flags.pack(), 0b1000_0001_0000_0000);

        let flags = Flags {
            recursion_available: true,
            rcode: 2,
            ..Default::default()
        };
        assert_eq!(flags.pack(), 0b0000_0000_1000_0010);
    }

    #[test]
    fn should_unpack_a_standard_query_word() {
        let flags = Flags::unpack(0x0100);
        assert!(!flags.response);
        assert_eq!(flags.opcode, 0);
        assert!(flags.recursion_desired);
        assert!(!flags.recursion_available);
        assert_eq!(flags.rcode, 0);
    }
}
