use memchr::memchr_iter;

use crate::error::SplitError;

/// Borrowed view over the three base64url sections of a compact token
#[derive(Debug)]
pub struct SplitToken<'a> {
    data: &'a [u8],
    header_end: usize,
    payload_end: usize,
}

impl<'a> TryFrom<&'a [u8]> for SplitToken<'a> {
    type Error = SplitError;
    fn try_from(value: &'a [u8]) -> Result<Self, Self::Error> {
        let mut dots = memchr_iter(b'.', value);
        let header_end = dots.next().ok_or(SplitError::Undersized)?;
        let payload_end = dots.next().ok_or(SplitError::Undersized)?;
        dots.next().map_or(Ok(()), |_| Err(SplitError::Oversized))?;
        Ok(SplitToken {
            data: value,
            header_end,
            payload_end,
        })
    }
}

impl<'a> TryFrom<&'a str> for SplitToken<'a> {
    type Error = SplitError;
    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        value.as_bytes().try_into()
    }
}

impl SplitToken<'_> {
    #[must_use]
    pub fn b64_header(&self) -> &[u8] {
        &self.data[..self.header_end]
    }

    #[must_use]
    pub fn b64_payload(&self) -> &[u8] {
        &self.data[self.header_end + 1..self.payload_end]
    }

    /// `header "." payload` exactly as received; the signing input
    #[must_use]
    pub fn b64_message(&self) -> &[u8] {
        &self.data[..self.payload_end]
    }

    #[must_use]
    pub fn b64_signature(&self) -> &[u8] {
        &self.data[self.payload_end + 1..]
    }
}
