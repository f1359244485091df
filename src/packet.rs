use bit_field::BitField;

use crate::Error;

pub const HEADER_LEN: usize = 8;
pub const MAX_PACKET_LEN: usize = 80;

/// Sequence number reserved for packets the device sends on its own.
pub(crate) const CALLBACK_SEQUENCE: u8 = 0;

/// Fixed 8-byte header in front of every packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub uid: u32,
    /// Whole packet length, header included.
    pub length: u8,
    pub function_id: u8,
    pub sequence_number: u8,
    pub response_expected: bool,
    pub error_code: u8,
}

impl Header {
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let [u0, u1, u2, u3] = self.uid.to_le_bytes();
        let mut options = 0u8;
        options.set_bits(4..8, self.sequence_number);
        options.set_bit(3, self.response_expected);
        let mut flags = 0u8;
        flags.set_bits(6..8, self.error_code);
        [u0, u1, u2, u3, self.length, self.function_id, options, flags]
    }

    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Self {
        let [u0, u1, u2, u3, length, function_id, options, flags] = *bytes;
        Self {
            uid: u32::from_le_bytes([u0, u1, u2, u3]),
            length,
            function_id,
            sequence_number: options.get_bits(4..8),
            response_expected: options.get_bit(3),
            error_code: flags.get_bits(6..8),
        }
    }

    pub(crate) fn is_callback(&self) -> bool {
        self.sequence_number == CALLBACK_SEQUENCE
    }

    pub(crate) fn payload_len(&self) -> usize {
        (self.length as usize).saturating_sub(HEADER_LEN)
    }
}

#[derive(Debug, bon::Builder)]
pub(crate) struct Request<'a> {
    uid: u32,
    function_id: u8,
    #[builder(default)]
    payload: &'a [u8],
    #[builder(default)]
    response_expected: bool,
}

impl Request<'_> {
    pub(crate) fn uid(&self) -> u32 {
        self.uid
    }

    pub(crate) fn function_id(&self) -> u8 {
        self.function_id
    }

    pub(crate) fn response_expected(&self) -> bool {
        self.response_expected
    }

    pub(crate) fn encode(&self, sequence_number: u8) -> Vec<u8> {
        debug_assert!(HEADER_LEN + self.payload.len() <= MAX_PACKET_LEN);
        let header = Header {
            uid: self.uid,
            length: (HEADER_LEN + self.payload.len()) as u8,
            function_id: self.function_id,
            sequence_number,
            response_expected: self.response_expected,
            error_code: 0,
        };
        let mut bytes = Vec::with_capacity(header.length as usize);
        bytes.extend_from_slice(&header.encode());
        bytes.extend_from_slice(self.payload);
        bytes
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Packet {
    pub(crate) header: Header,
    pub(crate) payload: Vec<u8>,
}

impl Packet {
    pub(crate) fn check_error(&self) -> Result<(), Error> {
        match self.header.error_code {
            0 => Ok(()),
            1 => Err(Error::InvalidParameter),
            2 => Err(Error::FunctionNotSupported),
            _ => Err(Error::UnknownDeviceError),
        }
    }
}

/// Little-endian reader over a response or callback payload.
#[derive(Debug)]
pub struct Payload<'a> {
    function_id: u8,
    bytes: &'a [u8],
}

impl<'a> Payload<'a> {
    /// Fails if `bytes` is shorter than the `expected` length.
    pub fn new(function_id: u8, bytes: &'a [u8], expected: usize) -> Result<Self, Error> {
        if bytes.len() < expected {
            return Err(Error::WrongResponseLength {
                function_id,
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { function_id, bytes })
    }

    pub fn function_id(&self) -> u8 {
        self.function_id
    }

    pub fn take<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let Some((head, rest)) = self.bytes.split_first_chunk::<N>() else {
            return Err(Error::WrongResponseLength {
                function_id: self.function_id,
                expected: N,
                actual: self.bytes.len(),
            });
        };
        self.bytes = rest;
        Ok(*head)
    }

    pub fn u8(&mut self) -> Result<u8, Error> {
        self.take::<1>().map(|[b]| b)
    }

    pub fn u16(&mut self) -> Result<u16, Error> {
        self.take().map(u16::from_le_bytes)
    }

    pub fn i16(&mut self) -> Result<i16, Error> {
        self.take().map(i16::from_le_bytes)
    }

    pub fn u32(&mut self) -> Result<u32, Error> {
        self.take().map(u32::from_le_bytes)
    }

    /// Fixed-width, NUL-padded string field.
    pub fn string<const N: usize>(&mut self) -> Result<String, Error> {
        let raw = self.take::<N>()?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(N);
        Ok(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}
