//!
//! IPP request
//!
use std::sync::atomic::{AtomicI32, Ordering};

use bytes::{BufMut, Bytes, BytesMut};
use log::debug;

use crate::{
    attribute::{IppAttribute, IppAttributes},
    error::IppError,
    model::{DelimiterTag, IppVersion, Operation},
    FromPrimitive as _, IppHeader,
};

/// Hands out request ids: starts at 1, wraps back to 1 after `i32::MAX`, never returns 0.
///
/// Safe to share between threads, every call returns a distinct id until the counter wraps.
#[derive(Debug)]
pub struct RequestIdAllocator {
    next: AtomicI32,
}

impl RequestIdAllocator {
    /// Create an allocator whose first id is 1
    pub const fn new() -> Self {
        RequestIdAllocator {
            next: AtomicI32::new(1),
        }
    }

    /// Create an allocator whose first id is `first`, values below 1 start at 1
    pub fn starting_at(first: i32) -> Self {
        RequestIdAllocator {
            next: AtomicI32::new(first.max(1)),
        }
    }

    /// Allocate the next id
    pub fn next_id(&self) -> i32 {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| {
                Some(if id == i32::MAX { 1 } else { id + 1 })
            })
            .unwrap_or_else(|id| id)
    }
}

impl Default for RequestIdAllocator {
    fn default() -> Self {
        RequestIdAllocator::new()
    }
}

/// Outbound IPP request.
///
/// Every request starts with `attributes-charset` and `attributes-natural-language` in the
/// operation group. The job group is only written when it has attributes, the payload only
/// when it is not empty.
#[derive(Clone, Debug)]
pub struct IppRequest {
    header: IppHeader,
    attributes: IppAttributes,
    payload: Bytes,
}

impl IppRequest {
    /// Create a request with an id taken from `ids`
    pub fn new(operation: Operation, ids: &RequestIdAllocator) -> IppRequest {
        IppRequest::with_request_id(operation, 0, ids)
    }

    /// Create a request with a given id, 0 means "take the next one from `ids`"
    pub fn with_request_id(operation: Operation, request_id: i32, ids: &RequestIdAllocator) -> IppRequest {
        let request_id = if request_id == 0 { ids.next_id() } else { request_id };
        debug!("New {operation:?} request, id {request_id}");

        let mut attributes = IppAttributes::new();
        attributes.add(DelimiterTag::OperationAttributes, IppAttribute::charset("utf-8"));
        attributes.add(DelimiterTag::OperationAttributes, IppAttribute::natural_language("en"));

        IppRequest {
            header: IppHeader::new(IppVersion::default(), operation as u16, request_id),
            attributes,
            payload: Bytes::new(),
        }
    }

    /// Override the protocol version, 2.0 by default
    pub fn set_version(&mut self, version: IppVersion) -> &mut Self {
        self.header.version = version;
        self
    }

    /// Get IPP header
    pub fn header(&self) -> &IppHeader {
        &self.header
    }

    /// Decode the operation code from the header
    pub fn operation(&self) -> Option<Operation> {
        Operation::from_u16(self.header.operation_or_status)
    }

    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }

    /// Get attributes
    pub fn attributes(&self) -> &IppAttributes {
        &self.attributes
    }

    /// Add an operation attribute, an attribute with the same name is replaced
    pub fn add_operation_attribute(&mut self, attribute: IppAttribute) -> &mut Self {
        self.attributes.add(DelimiterTag::OperationAttributes, attribute);
        self
    }

    /// Add a job attribute, an attribute with the same name is replaced
    pub fn add_job_attribute(&mut self, attribute: IppAttribute) -> &mut Self {
        self.attributes.add(DelimiterTag::JobAttributes, attribute);
        self
    }

    /// Set the document payload sent after the attributes
    pub fn set_payload<T: Into<Bytes>>(&mut self, payload: T) -> &mut Self {
        self.payload = payload.into();
        self
    }

    /// Get payload
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Encode the whole request including payload
    pub fn build(&self) -> Result<Bytes, IppError> {
        let attributes = self.attributes.to_bytes()?;

        let mut buffer = BytesMut::with_capacity(8 + attributes.len() + self.payload.len());
        buffer.put(self.header.to_bytes());
        buffer.put(attributes);
        if !self.payload.is_empty() {
            buffer.put(self.payload.clone());
        }

        debug!(
            "IPP request {}: {} bytes, payload {} bytes",
            self.header.request_id,
            buffer.len(),
            self.payload.len()
        );
        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, thread};

    use super::*;
    use crate::{parser::IppParser, value::IppValue};

    #[test]
    fn test_allocator_sequence() {
        let ids = RequestIdAllocator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_allocator_wraps_without_zero() {
        let ids = RequestIdAllocator::starting_at(i32::MAX);
        assert_eq!(ids.next_id(), i32::MAX);
        assert_eq!(ids.next_id(), 1);

        let ids = RequestIdAllocator::starting_at(-5);
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn test_allocator_concurrent_ids_unique() {
        let ids = RequestIdAllocator::new();
        let all: Vec<i32> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..1000).map(|_| ids.next_id()).collect::<Vec<_>>()))
                .collect();
            handles.into_iter().flat_map(|h| h.join().unwrap()).collect()
        });
        let unique: HashSet<i32> = all.iter().copied().collect();
        assert_eq!(unique.len(), 8000);
        assert!(!unique.contains(&0));
    }

    #[test]
    fn test_explicit_and_auto_id() {
        let ids = RequestIdAllocator::new();
        assert_eq!(IppRequest::with_request_id(Operation::GetJobs, 42, &ids).request_id(), 42);
        assert_eq!(IppRequest::with_request_id(Operation::GetJobs, 0, &ids).request_id(), 1);
        assert_eq!(IppRequest::new(Operation::GetJobs, &ids).request_id(), 2);
    }

    #[test]
    fn test_preamble_bytes() {
        let ids = RequestIdAllocator::starting_at(5);
        let req = IppRequest::new(Operation::GetPrinterAttributes, &ids);
        let bytes = req.build().unwrap();

        let mut expected = vec![2, 0, 0, 0x0b, 0, 0, 0, 5, 1];
        expected.extend_from_slice(&[0x47, 0, 18]);
        expected.extend_from_slice(b"attributes-charset");
        expected.extend_from_slice(&[0, 5]);
        expected.extend_from_slice(b"utf-8");
        expected.extend_from_slice(&[0x48, 0, 27]);
        expected.extend_from_slice(b"attributes-natural-language");
        expected.extend_from_slice(&[0, 2]);
        expected.extend_from_slice(b"en");
        expected.push(3);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_job_group_only_when_used() {
        let ids = RequestIdAllocator::new();
        let mut req = IppRequest::new(Operation::PrintJob, &ids);
        let msg = IppParser::new(req.build().unwrap()).parse().unwrap();
        assert_eq!(msg.attributes.groups().len(), 1);
        assert!(msg.attributes.group(DelimiterTag::JobAttributes).is_none());

        req.add_job_attribute(IppAttribute::copies(2));
        let msg = IppParser::new(req.build().unwrap()).parse().unwrap();
        assert_eq!(msg.attributes.groups().len(), 2);
        assert_eq!(
            msg.attributes.get(DelimiterTag::JobAttributes, IppAttribute::COPIES),
            Some(&IppValue::Integer(2))
        );
    }

    #[test]
    fn test_print_job_round_trip() {
        let ids = RequestIdAllocator::new();
        let mut req = IppRequest::with_request_id(Operation::PrintJob, 7, &ids);
        req.add_operation_attribute(IppAttribute::printer_uri("ipp://host:631/printers/P1"))
            .add_operation_attribute(IppAttribute::requesting_user_name("alice"))
            .add_job_attribute(IppAttribute::copies(2))
            .set_payload("hi");

        let bytes = req.build().unwrap();
        assert_eq!(&bytes[..8], &[2, 0, 0, 2, 0, 0, 0, 7]);

        let msg = IppParser::new(bytes).parse().unwrap();
        assert_eq!(msg.header.request_id, 7);
        assert_eq!(msg.header.operation_or_status, Operation::PrintJob as u16);
        assert_eq!(&msg.attributes, req.attributes());
        assert_eq!(msg.payload, "hi");

        let operation = msg.attributes.group(DelimiterTag::OperationAttributes).unwrap();
        let names: Vec<_> = operation.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "attributes-charset",
                "attributes-natural-language",
                "printer-uri",
                "requesting-user-name"
            ]
        );
    }
}
