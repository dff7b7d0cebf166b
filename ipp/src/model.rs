//!
//! Protocol catalogs: versions, operation and status codes, group delimiters and value tags
//!
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use enum_primitive_derive::Primitive;

/// IPP protocol version, major number in the high byte
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct IppVersion(pub u16);

impl IppVersion {
    pub const fn v1_0() -> Self {
        IppVersion(0x0100)
    }
    pub const fn v1_1() -> Self {
        IppVersion(0x0101)
    }
    pub const fn v2_0() -> Self {
        IppVersion(0x0200)
    }
    pub const fn v2_1() -> Self {
        IppVersion(0x0201)
    }
    pub const fn v2_2() -> Self {
        IppVersion(0x0202)
    }

    /// Build a version from its two wire bytes
    pub const fn from_parts(major: u8, minor: u8) -> Self {
        IppVersion(((major as u16) << 8) | minor as u16)
    }

    pub const fn major(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn minor(&self) -> u8 {
        (self.0 & 0xff) as u8
    }
}

impl Default for IppVersion {
    fn default() -> Self {
        IppVersion::v2_0()
    }
}

impl fmt::Display for IppVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major(), self.minor())
    }
}

/// Operation codes from RFC 2911 plus the CUPS vendor range
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Operation {
    PrintJob = 0x0002,
    PrintUri = 0x0003,
    ValidateJob = 0x0004,
    CreateJob = 0x0005,
    SendDocument = 0x0006,
    SendUri = 0x0007,
    CancelJob = 0x0008,
    GetJobAttributes = 0x0009,
    GetJobs = 0x000A,
    GetPrinterAttributes = 0x000B,
    HoldJob = 0x000C,
    ReleaseJob = 0x000D,
    RestartJob = 0x000E,
    PausePrinter = 0x0010,
    ResumePrinter = 0x0011,
    PurgeJobs = 0x0012,

    CupsGetDefault = 0x4001,
    CupsGetPrinters = 0x4002,
    CupsAddModifyPrinter = 0x4003,
    CupsDeletePrinter = 0x4004,
    CupsGetClasses = 0x4005,
    CupsAddModifyClass = 0x4006,
    CupsDeleteClass = 0x4007,
    CupsAcceptJobs = 0x4008,
    CupsRejectJobs = 0x4009,
    CupsSetDefault = 0x400A,
    CupsGetDevices = 0x400B,
    CupsGetPPDs = 0x400C,
    CupsMoveJob = 0x400D,
    CupsAuthenticateJob = 0x400E,
    CupsGetPPD = 0x400F,
    CupsGetDocument = 0x4027,
}

/// printer-state enum values
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrinterState {
    Idle = 3,
    Processing = 4,
    Stopped = 5,
}

impl fmt::Display for PrinterState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrinterState::Idle => write!(f, "idle"),
            PrinterState::Processing => write!(f, "processing"),
            PrinterState::Stopped => write!(f, "stopped"),
        }
    }
}

/// orientation-requested enum values
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum Orientation {
    Portrait = 3,
    Landscape = 4,
    ReverseLandscape = 5,
    ReversePortrait = 6,
}

/// print-quality enum values
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrintQuality {
    Draft = 3,
    Normal = 4,
    High = 5,
}

/// job-state enum values
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum JobState {
    Pending = 3,
    PendingHeld = 4,
    Processing = 5,
    ProcessingStopped = 6,
    Canceled = 7,
    Aborted = 8,
    Completed = 9,
}

/// Attribute group delimiters.
///
/// Codes up to 0x0f are reserved for delimiters. Any delimiter code without a variant of its
/// own is collected under `Unknown`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Primitive, Debug, Copy, Clone, PartialEq, Hash, Eq)]
pub enum DelimiterTag {
    OperationAttributes = 0x01,
    JobAttributes = 0x02,
    EndOfAttributes = 0x03,
    PrinterAttributes = 0x04,
    UnsupportedAttributes = 0x05,
    Unknown = 0x0f,
}

impl DelimiterTag {
    /// Highest code that still denotes a delimiter rather than a value tag
    pub const MAX_DELIMITER: u8 = 0x0f;

    /// Map a delimiter byte to its group, folding unrecognized codes into `Unknown`
    pub fn from_wire(tag: u8) -> DelimiterTag {
        match tag {
            0x01 => DelimiterTag::OperationAttributes,
            0x02 => DelimiterTag::JobAttributes,
            0x03 => DelimiterTag::EndOfAttributes,
            0x04 => DelimiterTag::PrinterAttributes,
            0x05 => DelimiterTag::UnsupportedAttributes,
            _ => DelimiterTag::Unknown,
        }
    }

    /// Short group name: `operation`, `job`, `printer`, `unsupported` or `unknown`
    pub fn group_name(&self) -> &'static str {
        match self {
            DelimiterTag::OperationAttributes => "operation",
            DelimiterTag::JobAttributes => "job",
            DelimiterTag::PrinterAttributes => "printer",
            DelimiterTag::UnsupportedAttributes => "unsupported",
            DelimiterTag::EndOfAttributes => "end",
            DelimiterTag::Unknown => "unknown",
        }
    }
}

/// Value tags as defined in RFC 8010 section 3.5.2
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ValueTag {
    Unsupported = 0x10,
    Unknown = 0x12,
    NoValue = 0x13,
    Integer = 0x21,
    Boolean = 0x22,
    Enum = 0x23,
    OctetStringUnspecified = 0x30,
    DateTime = 0x31,
    Resolution = 0x32,
    RangeOfInteger = 0x33,
    BegCollection = 0x34,
    TextWithLanguage = 0x35,
    NameWithLanguage = 0x36,
    EndCollection = 0x37,
    TextWithoutLanguage = 0x41,
    NameWithoutLanguage = 0x42,
    Keyword = 0x44,
    Uri = 0x45,
    UriScheme = 0x46,
    Charset = 0x47,
    NaturalLanguage = 0x48,
    MimeMediaType = 0x49,
    MemberAttrName = 0x4a,
}

/// Status codes from RFC 2911 section 13
#[derive(Primitive, Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatusCode {
    SuccessfulOk = 0x0000,
    SuccessfulOkIgnoredOrSubstitutedAttributes = 0x0001,
    SuccessfulOkConflictingAttributes = 0x0002,
    ClientErrorBadRequest = 0x0400,
    ClientErrorForbidden = 0x0401,
    ClientErrorNotAuthenticated = 0x0402,
    ClientErrorNotAuthorized = 0x0403,
    ClientErrorNotPossible = 0x0404,
    ClientErrorTimeout = 0x0405,
    ClientErrorNotFound = 0x0406,
    ClientErrorGone = 0x0407,
    ClientErrorRequestEntityTooLarge = 0x0408,
    ClientErrorRequestValueTooLong = 0x0409,
    ClientErrorDocumentFormatNotSupported = 0x040A,
    ClientErrorAttributesOrValuesNotSupported = 0x040B,
    ClientErrorUriSchemeNotSupported = 0x040C,
    ClientErrorCharsetNotSupported = 0x040D,
    ClientErrorConflictingAttributes = 0x040E,
    ClientErrorCompressionNotSupported = 0x040F,
    ClientErrorCompressionError = 0x0410,
    ClientErrorDocumentFormatError = 0x0411,
    ClientErrorDocumentAccessError = 0x0412,
    ServerErrorInternalError = 0x0500,
    ServerErrorOperationNotSupported = 0x0501,
    ServerErrorServiceUnavailable = 0x0502,
    ServerErrorVersionNotSupported = 0x0503,
    ServerErrorDeviceError = 0x0504,
    ServerErrorTemporaryError = 0x0505,
    ServerErrorNotAcceptingJobs = 0x0506,
    ServerErrorBusy = 0x0507,
    ServerErrorJobCanceled = 0x0508,
    ServerErrorMultipleDocumentJobsNotSupported = 0x0509,
    UnknownStatusCode = 0xffff,
}

impl StatusCode {
    /// Success range is 0x0000..=0x00ff, regardless of whether the code is listed here
    pub fn is_success_code(code: u16) -> bool {
        code <= 0x00ff
    }

    pub fn is_success(&self) -> bool {
        *self != StatusCode::UnknownStatusCode && StatusCode::is_success_code(*self as u16)
    }

    pub fn is_client_error(&self) -> bool {
        (0x0400..=0x04ff).contains(&(*self as u16))
    }

    pub fn is_server_error(&self) -> bool {
        (0x0500..=0x05ff).contains(&(*self as u16))
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            StatusCode::SuccessfulOk => "Successful",
            StatusCode::SuccessfulOkIgnoredOrSubstitutedAttributes => "Ignored or substituted attributes",
            StatusCode::SuccessfulOkConflictingAttributes => "Conflicting attributes",
            StatusCode::ClientErrorBadRequest => "Bad request",
            StatusCode::ClientErrorForbidden => "Forbidden",
            StatusCode::ClientErrorNotAuthenticated => "Not authenticated",
            StatusCode::ClientErrorNotAuthorized => "Not authorized",
            StatusCode::ClientErrorNotPossible => "Not possible",
            StatusCode::ClientErrorTimeout => "Timeout",
            StatusCode::ClientErrorNotFound => "Not found",
            StatusCode::ClientErrorGone => "Gone",
            StatusCode::ClientErrorRequestEntityTooLarge => "Request entity too large",
            StatusCode::ClientErrorRequestValueTooLong => "Request value too long",
            StatusCode::ClientErrorDocumentFormatNotSupported => "Document format not supported",
            StatusCode::ClientErrorAttributesOrValuesNotSupported => "Attributes or values not supported",
            StatusCode::ClientErrorUriSchemeNotSupported => "Uri scheme not supported",
            StatusCode::ClientErrorCharsetNotSupported => "Charset not supported",
            StatusCode::ClientErrorConflictingAttributes => "Conflicting attributes",
            StatusCode::ClientErrorCompressionNotSupported => "Compression not supported",
            StatusCode::ClientErrorCompressionError => "Compression error",
            StatusCode::ClientErrorDocumentFormatError => "Document format error",
            StatusCode::ClientErrorDocumentAccessError => "Document access error",
            StatusCode::ServerErrorInternalError => "Internal server error",
            StatusCode::ServerErrorOperationNotSupported => "Operation not supported",
            StatusCode::ServerErrorServiceUnavailable => "Service unavailable",
            StatusCode::ServerErrorVersionNotSupported => "Version not supported",
            StatusCode::ServerErrorDeviceError => "Device error",
            StatusCode::ServerErrorTemporaryError => "Temporary error",
            StatusCode::ServerErrorNotAcceptingJobs => "Not accepting jobs",
            StatusCode::ServerErrorBusy => "Busy",
            StatusCode::ServerErrorJobCanceled => "Job canceled",
            StatusCode::ServerErrorMultipleDocumentJobsNotSupported => "Multiple document jobs not supported",
            StatusCode::UnknownStatusCode => "Unknown status",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn test_version_parts() {
        let version = IppVersion::from_parts(2, 1);
        assert_eq!(version, IppVersion::v2_1());
        assert_eq!(version.major(), 2);
        assert_eq!(version.minor(), 1);
        assert_eq!(version.to_string(), "2.1");
    }

    #[test]
    fn test_delimiter_from_wire() {
        assert_eq!(DelimiterTag::from_wire(0x04), DelimiterTag::PrinterAttributes);
        assert_eq!(DelimiterTag::from_wire(0x09), DelimiterTag::Unknown);
        assert_eq!(DelimiterTag::from_wire(0x00), DelimiterTag::Unknown);
        assert_eq!(DelimiterTag::PrinterAttributes.group_name(), "printer");
    }

    #[test]
    fn test_status_ranges() {
        assert!(StatusCode::SuccessfulOk.is_success());
        assert!(StatusCode::SuccessfulOkConflictingAttributes.is_success());
        assert!(!StatusCode::ClientErrorBadRequest.is_success());
        assert!(StatusCode::ClientErrorBadRequest.is_client_error());
        assert!(StatusCode::ServerErrorInternalError.is_server_error());
        assert!(!StatusCode::UnknownStatusCode.is_success());
        assert!(StatusCode::is_success_code(0x00ff));
        assert!(!StatusCode::is_success_code(0x0100));
    }

    #[test]
    fn test_unknown_codes_do_not_map() {
        assert_eq!(Operation::from_u16(0x7777), None);
        assert_eq!(StatusCode::from_u16(0x0406), Some(StatusCode::ClientErrorNotFound));
        assert_eq!(ValueTag::from_u8(0x7f), None);
    }
}
