use crate::error::{
    CertificateError,
    CertificateField,
};

pub(crate) const SEQUENCE: u8 = 0x30;
pub(crate) const INTEGER: u8 = 0x02;
/// `[0] EXPLICIT`, used for the TBSCertificate `version` field
pub(crate) const CONTEXT_0: u8 = 0xa0;

/// Widest long-form length accepted; four bytes already covers 4 GiB
const MAX_LENGTH_OCTETS: usize = 4;

/// One tag-length-value element borrowed from its enclosing buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tlv<'a> {
    pub(crate) tag: u8,
    /// tag + length + value
    pub(crate) raw: &'a [u8],
    pub(crate) value: &'a [u8],
}

/// Forward-only reader over a run of sibling TLVs.
///
/// Every read is bounded by the slice the reader was created over, so a child
/// can never extend past its parent.
#[derive(Debug)]
pub(crate) struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub(crate) const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads the next TLV and advances past it.
    pub(crate) fn read(&mut self) -> Result<Tlv<'a>, CertificateError> {
        let start = self.pos;
        let tag = *self.data.get(start).ok_or(CertificateError::Truncated)?;
        let first = *self.data.get(start + 1).ok_or(CertificateError::Truncated)?;

        let (len, value_start) = if first & 0x80 == 0 {
            (usize::from(first), start + 2)
        } else {
            let octets = usize::from(first & 0x7f);
            // zero octets is the BER indefinite form, never valid DER
            if octets == 0 || octets > MAX_LENGTH_OCTETS {
                return Err(CertificateError::InvalidLength);
            }
            let len_bytes = self
                .data
                .get(start + 2..start + 2 + octets)
                .ok_or(CertificateError::Truncated)?;
            let len = len_bytes
                .iter()
                .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
            (len, start + 2 + octets)
        };

        let end = value_start
            .checked_add(len)
            .ok_or(CertificateError::InvalidLength)?;
        if end > self.data.len() {
            return Err(CertificateError::Truncated);
        }
        self.pos = end;
        Ok(Tlv {
            tag,
            raw: &self.data[start..end],
            value: &self.data[value_start..end],
        })
    }

    /// Reads the next TLV, failing unless it carries `tag`.
    pub(crate) fn expect(
        &mut self,
        tag: u8,
        field: CertificateField,
    ) -> Result<Tlv<'a>, CertificateError> {
        let found = self.peek_tag().ok_or(CertificateError::Truncated)?;
        if found != tag {
            return Err(CertificateError::UnexpectedTag {
                field,
                expected: tag,
                found,
            });
        }
        self.read()
    }
}
