//!
//! IPP reader
//!
use bytes::{Buf, Bytes};

use crate::{model::IppVersion, parser::IppParseError, IppHeader};

/// Header length: version, operation or status, request id
pub const HEADER_LEN: usize = 8;

/// IPP reader contains a set of methods to read from an in-memory IPP message
pub struct IppReader {
    inner: Bytes,
}

impl IppReader {
    /// Create IppReader from a complete message
    pub fn new(inner: Bytes) -> Self {
        IppReader { inner }
    }

    fn ensure(&self, len: usize) -> Result<(), IppParseError> {
        if self.inner.remaining() < len {
            Err(IppParseError::Truncated {
                needed: len,
                available: self.inner.remaining(),
            })
        } else {
            Ok(())
        }
    }

    fn read_bytes(&mut self, len: usize) -> Result<Bytes, IppParseError> {
        self.ensure(len)?;
        Ok(self.inner.split_to(len))
    }

    fn read_u16(&mut self) -> Result<u16, IppParseError> {
        self.ensure(2)?;
        Ok(self.inner.get_u16())
    }

    /// Read tag
    pub fn read_tag(&mut self) -> Result<u8, IppParseError> {
        self.ensure(1)?;
        Ok(self.inner.get_u8())
    }

    /// Read IPP name from [len; name] element, an empty name is returned as is
    pub fn read_name(&mut self) -> Result<String, IppParseError> {
        let name_len = self.read_u16()?;
        let name = self.read_bytes(name_len as usize)?;
        Ok(String::from_utf8_lossy(&name).into_owned())
    }

    /// Read IPP value from [len; value] element
    pub fn read_value(&mut self) -> Result<Bytes, IppParseError> {
        let value_len = self.read_u16()?;
        self.read_bytes(value_len as usize)
    }

    /// Read IPP header. The request id is a signed 32-bit integer on the wire.
    pub fn read_header(&mut self) -> Result<IppHeader, IppParseError> {
        if self.inner.remaining() < HEADER_LEN {
            return Err(IppParseError::TooShort(self.inner.remaining()));
        }
        let version = IppVersion(self.inner.get_u16());
        let operation_status = self.inner.get_u16();
        let request_id = self.inner.get_i32();
        Ok(IppHeader::new(version, operation_status, request_id))
    }

    /// Return everything that was not read yet
    pub fn into_payload(self) -> Bytes {
        self.inner
    }
}

impl From<Bytes> for IppReader {
    fn from(data: Bytes) -> Self {
        IppReader::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() {
        let mut reader = IppReader::new(Bytes::from_static(&[2, 0, 0, 0, 0xff, 0xff, 0xff, 0xfe, 3]));
        let header = reader.read_header().unwrap();
        assert_eq!(header.version, IppVersion::v2_0());
        assert_eq!(header.operation_or_status, 0);
        assert_eq!(header.request_id, -2);
        assert_eq!(reader.into_payload(), vec![3]);
    }

    #[test]
    fn test_short_header() {
        let mut reader = IppReader::new(Bytes::from_static(&[2, 0, 0, 0, 0]));
        assert!(matches!(reader.read_header(), Err(IppParseError::TooShort(5))));
    }

    #[test]
    fn test_truncated_value() {
        let mut reader = IppReader::new(Bytes::from_static(&[0, 4, 1, 2]));
        assert!(matches!(
            reader.read_value(),
            Err(IppParseError::Truncated { needed: 4, available: 2 })
        ));
    }

    #[test]
    fn test_empty_name() {
        let mut reader = IppReader::new(Bytes::from_static(&[0, 0, 0, 1, 7]));
        assert_eq!(reader.read_name().unwrap(), "");
        assert_eq!(reader.read_value().unwrap(), vec![7]);
    }
}
