//!
//! IPP response
//!
use bytes::Bytes;
use log::debug;

use crate::{
    attribute::{IppAttribute, IppAttributeGroup, IppAttributes},
    error::IppError,
    model::{DelimiterTag, IppVersion, JobState, StatusCode},
    parser::IppParser,
    value::IppValue,
    FromPrimitive as _, IppHeader,
};

/// Decoded IPP response, read-only once constructed
#[derive(Clone, Debug)]
pub struct IppResponse {
    header: IppHeader,
    attributes: IppAttributes,
    sections: Vec<IppAttributeGroup>,
    payload: Bytes,
}

impl IppResponse {
    /// Decode a complete response message. Nothing is constructed if decoding fails.
    pub fn from_bytes<T: Into<Bytes>>(data: T) -> Result<IppResponse, IppError> {
        let message = IppParser::new(data).parse()?;
        debug!(
            "IPP response {}: status {:#06x}, {} groups, payload {} bytes",
            message.header.request_id,
            message.header.operation_or_status,
            message.attributes.groups().len(),
            message.payload.len()
        );

        Ok(IppResponse {
            header: message.header,
            attributes: message.attributes,
            sections: message.sections,
            payload: message.payload,
        })
    }

    /// Get IPP header
    pub fn header(&self) -> &IppHeader {
        &self.header
    }

    pub fn version(&self) -> IppVersion {
        self.header.version
    }

    /// Raw status code, unknown codes included
    pub fn status_code(&self) -> u16 {
        self.header.operation_or_status
    }

    /// Status code, `UnknownStatusCode` if it is not a listed one
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.header.operation_or_status).unwrap_or(StatusCode::UnknownStatusCode)
    }

    /// True if the status code is in the successful range 0x0000..=0x00ff
    pub fn is_successful(&self) -> bool {
        StatusCode::is_success_code(self.header.operation_or_status)
    }

    pub fn request_id(&self) -> i32 {
        self.header.request_id
    }

    /// Get attributes
    pub fn attributes(&self) -> &IppAttributes {
        &self.attributes
    }

    /// Groups with a given tag as they appeared on the wire, one per job or printer
    /// in multi-object replies such as Get-Jobs or CUPS-Get-Printers
    pub fn groups_of(&self, tag: DelimiterTag) -> impl Iterator<Item = &IppAttributeGroup> {
        self.sections.iter().filter(move |g| g.tag() == tag)
    }

    pub fn operation_attributes(&self) -> Option<&IppAttributeGroup> {
        self.attributes.group(DelimiterTag::OperationAttributes)
    }

    pub fn job_attributes(&self) -> Option<&IppAttributeGroup> {
        self.attributes.group(DelimiterTag::JobAttributes)
    }

    pub fn printer_attributes(&self) -> Option<&IppAttributeGroup> {
        self.attributes.group(DelimiterTag::PrinterAttributes)
    }

    /// Look up an attribute value by group and name
    pub fn attribute(&self, group: DelimiterTag, name: &str) -> Option<&IppValue> {
        self.attributes.get(group, name)
    }

    fn job_value(&self, name: &str) -> Option<&IppValue> {
        self.attribute(DelimiterTag::JobAttributes, name)
    }

    pub fn job_id(&self) -> Option<i32> {
        self.job_value(IppAttribute::JOB_ID).and_then(|v| v.as_integer()).copied()
    }

    pub fn job_uri(&self) -> Option<&str> {
        self.job_value(IppAttribute::JOB_URI).and_then(IppValue::as_str)
    }

    /// Job state, `None` if absent or not a known state
    pub fn job_state(&self) -> Option<JobState> {
        self.job_value(IppAttribute::JOB_STATE)
            .and_then(|v| v.as_integer())
            .and_then(|state| JobState::from_i32(*state))
    }

    pub fn status_message(&self) -> Option<&str> {
        self.attribute(DelimiterTag::OperationAttributes, IppAttribute::STATUS_MESSAGE)
            .and_then(IppValue::as_str)
    }

    /// Bytes following the end-of-attributes tag
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Turn a failed status into `IppError::StatusError`
    pub fn into_result(self) -> Result<IppResponse, IppError> {
        if self.is_successful() {
            Ok(self)
        } else {
            Err(IppError::StatusError(self.status()))
        }
    }
}
