//!
//! IPP binary protocol implementation for talking to CUPS print servers. This crate can be used in several ways:
//! * using the low-level codec: build an `IppRequest`, encode it and decode the answer into an `IppResponse`.
//! * using the `CupsClient` with print jobs, printer queries and job control.
//! * using any third-party HTTP client by implementing `IppTransport`.
//!
//! The following feature flags are supported:
//! * `client` - enable blocking HTTP transport via `ureq` crate
//! * `client-rustls` - `client` with TLS via `rustls`
//! * `client-tls` - `client` with TLS via `native-tls`
//! * `serde` - derive `Serialize` and `Deserialize` for model types
//!
//! By default, `client-rustls` is enabled.
//!
//! Implementation notes:
//! * all RFC 8010 value layouts are supported including multi-valued attributes and collections.
//! * decoding is lenient for values: unknown tags and malformed fixed-size values are returned as raw octets.
//! * groups with the same delimiter tag are merged into one bucket when decoding.
//!
//! Usage examples:
//!
//!```rust,no_run
//! // using the low-level codec with a custom transport
//! use cups_ipp::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ids = RequestIdAllocator::new();
//!     let mut req = IppRequest::new(Operation::GetPrinterAttributes, &ids);
//!     req.add_operation_attribute(IppAttribute::printer_uri("ipp://localhost:631/printers/test"));
//!
//!     let body = req.build()?;
//!     let answer: Vec<u8> = Vec::new(); // bytes received from the server
//!     let resp = IppResponse::from_bytes(answer)?;
//!     if resp.is_successful() {
//!         println!("{:?}", resp.printer_attributes());
//!     }
//!     # let _ = body;
//!     Ok(())
//! }
//!```
//!```rust,no_run
//! // using the CUPS client
//! use cups_ipp::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cups = CupsClient::builder().username("alice").build();
//!     let job = Job::new("hello").content("Hello, world!\n").format("text/plain");
//!     let result = cups.print("office", &job)?;
//!     println!("job id: {:?}", result.job_id());
//!     Ok(())
//! }
//!```

use bytes::{BufMut, Bytes, BytesMut};
use num_traits::FromPrimitive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::{IppVersion, StatusCode};

pub mod attribute;
pub mod client;
pub mod cups;
pub mod error;
pub mod job;
pub mod model;
pub mod parser;
pub mod printer;
pub mod reader;
pub mod request;
pub mod response;
pub mod util;
pub mod value;

pub mod prelude {
    //!
    //! Common imports
    //!
    pub use http::Uri;
    pub use num_traits::FromPrimitive as _;

    pub use crate::{
        attribute::{IppAttribute, IppAttributeGroup, IppAttributes},
        client::IppTransport,
        cups::{CupsClient, CupsClientBuilder, PrintResult},
        job::Job,
        model::*,
        printer::Printer,
        request::{IppRequest, RequestIdAllocator},
        response::IppResponse,
        value::{IppDateTime, IppValue, ValueList},
    };

    pub use super::error::IppError;

    #[cfg(feature = "client")]
    pub use super::client::IppClient;

    pub use super::IppHeader;
}

/// IPP request and response header
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IppHeader {
    /// IPP protocol version
    pub version: IppVersion,
    /// Operation tag for requests, status for responses
    pub operation_or_status: u16,
    /// ID of the request, a signed 32-bit value on the wire
    pub request_id: i32,
}

impl IppHeader {
    /// Create IPP header
    pub fn new(version: IppVersion, operation_or_status: u16, request_id: i32) -> IppHeader {
        IppHeader {
            version,
            operation_or_status,
            request_id,
        }
    }

    /// Write header to a byte array
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(reader::HEADER_LEN);
        buffer.put_u16(self.version.0);
        buffer.put_u16(self.operation_or_status);
        buffer.put_i32(self.request_id);

        buffer.freeze()
    }

    /// Decode and get IPP status code from the header
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.operation_or_status).unwrap_or(StatusCode::UnknownStatusCode)
    }
}
