//!
//! CUPS client: print jobs, printer queries and job control on top of an IPP transport
//!
use std::time::Duration;

use http::Uri;
use log::debug;

use crate::{
    attribute::{IppAttribute, IppAttributeGroup},
    client::IppTransport,
    error::IppError,
    job::Job,
    model::{DelimiterTag, Operation, StatusCode},
    printer::Printer,
    request::{IppRequest, RequestIdAllocator},
    response::IppResponse,
    value::IppValue,
};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 631;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const PRINTER_ATTRIBUTES: &[&str] = &[
    IppAttribute::PRINTER_NAME,
    IppAttribute::PRINTER_URI_SUPPORTED,
    IppAttribute::PRINTER_STATE,
    IppAttribute::PRINTER_STATE_REASONS,
    IppAttribute::PRINTER_IS_ACCEPTING_JOBS,
    IppAttribute::PRINTER_LOCATION,
    IppAttribute::PRINTER_INFO,
    IppAttribute::PRINTER_MAKE_AND_MODEL,
    IppAttribute::DOCUMENT_FORMAT_SUPPORTED,
    IppAttribute::MEDIA_SUPPORTED,
    IppAttribute::COLOR_SUPPORTED,
    IppAttribute::SIDES_SUPPORTED,
];

const JOB_ATTRIBUTES: &[&str] = &[IppAttribute::JOB_ID, IppAttribute::JOB_NAME, IppAttribute::JOB_STATE];

/// Outcome of a print request
#[derive(Clone, Debug, PartialEq)]
pub struct PrintResult {
    success: bool,
    job_id: Option<i32>,
    job_uri: Option<String>,
    message: Option<String>,
    status_code: u16,
}

impl PrintResult {
    pub fn from_response(response: &IppResponse) -> PrintResult {
        PrintResult {
            success: response.is_successful(),
            job_id: response.job_id(),
            job_uri: response.job_uri().map(ToOwned::to_owned),
            message: response.status_message().map(ToOwned::to_owned),
            status_code: response.status_code(),
        }
    }

    pub fn failed<S: AsRef<str>>(message: S, status_code: u16) -> PrintResult {
        PrintResult {
            success: false,
            job_id: None,
            job_uri: None,
            message: Some(message.as_ref().to_owned()),
            status_code,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn job_id(&self) -> Option<i32> {
        self.job_id
    }

    pub fn job_uri(&self) -> Option<&str> {
        self.job_uri.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }
}

/// Builder to create CUPS client
#[derive(Clone, Debug)]
pub struct CupsClientBuilder {
    host: String,
    port: u16,
    secure: bool,
    username: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl Default for CupsClientBuilder {
    fn default() -> Self {
        CupsClientBuilder {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            secure: false,
            username: None,
            password: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CupsClientBuilder {
    /// Server host name, `localhost` by default
    pub fn host<S: AsRef<str>>(mut self, host: S) -> Self {
        self.host = host.as_ref().to_owned();
        self
    }

    /// Server port, 631 by default
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Use `ipps` / HTTPS
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// User name sent as `requesting-user-name`, also used for basic auth together with a password
    pub fn username<S: AsRef<str>>(mut self, username: S) -> Self {
        self.username = Some(username.as_ref().to_owned());
        self
    }

    pub fn password<S: AsRef<str>>(mut self, password: S) -> Self {
        self.password = Some(password.as_ref().to_owned());
        self
    }

    /// Request timeout, 30 seconds by default
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client with a given transport
    pub fn build_with<T: IppTransport>(self, transport: T) -> CupsClient<T> {
        CupsClient {
            transport,
            host: self.host,
            port: self.port,
            secure: self.secure,
            username: self.username,
            ids: RequestIdAllocator::new(),
        }
    }

    #[cfg(feature = "client")]
    /// Build the client with the blocking HTTP transport
    pub fn build(self) -> CupsClient<crate::client::IppClient> {
        let mut builder = crate::client::IppClient::builder().request_timeout(self.timeout);
        if let (Some(username), Some(password)) = (&self.username, &self.password) {
            builder = builder.basic_auth(username, password);
        }
        let transport = builder.build();
        self.build_with(transport)
    }
}

fn printer_path(name: &str) -> String {
    format!("/printers/{name}")
}

/// CUPS client
pub struct CupsClient<T> {
    transport: T,
    host: String,
    port: u16,
    secure: bool,
    username: Option<String>,
    ids: RequestIdAllocator,
}

impl CupsClient<()> {
    /// Create CUPS client builder
    pub fn builder() -> CupsClientBuilder {
        CupsClientBuilder::default()
    }
}

impl<T: IppTransport> CupsClient<T> {
    /// Server URI, e.g. `ipp://localhost:631`
    pub fn base_uri(&self) -> String {
        let scheme = if self.secure { "ipps" } else { "ipp" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// URI of a named printer queue
    pub fn printer_uri(&self, name: &str) -> String {
        format!("{}/printers/{name}", self.base_uri())
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // printer-uri has to follow the charset and language attributes
    fn new_request(&self, operation: Operation, printer_uri: Option<&str>) -> IppRequest {
        let mut request = IppRequest::new(operation, &self.ids);
        if let Some(uri) = printer_uri {
            request.add_operation_attribute(IppAttribute::printer_uri(uri));
        }
        if let Some(ref username) = self.username {
            request.add_operation_attribute(IppAttribute::requesting_user_name(username));
        }
        request
    }

    fn send(&self, path: &str, request: &IppRequest) -> Result<IppResponse, IppError> {
        let uri: Uri = format!("{}{path}", self.base_uri()).parse()?;
        let response = self.transport.send_request(&uri, request)?;
        debug!(
            "{:?} request {} finished with status {:#06x}",
            request.operation(),
            request.request_id(),
            response.status_code()
        );
        Ok(response)
    }

    /// Submit a print job
    pub fn print(&self, printer: &str, job: &Job) -> Result<PrintResult, IppError> {
        if !job.has_content() {
            return Ok(PrintResult::failed(
                "no document data",
                StatusCode::ClientErrorBadRequest as u16,
            ));
        }

        let mut request = self.new_request(Operation::PrintJob, Some(&self.printer_uri(printer)));

        if !job.job_name().is_empty() {
            request.add_operation_attribute(IppAttribute::job_name(job.job_name()));
        }
        if !job.doc_name().is_empty() {
            request.add_operation_attribute(IppAttribute::document_name(job.doc_name()));
        }
        request.add_operation_attribute(IppAttribute::document_format(job.document_format()));

        for attribute in job.attributes() {
            request.add_job_attribute(attribute);
        }

        request.set_payload(job.read_content()?);

        let response = self.send(&printer_path(printer), &request)?;
        Ok(PrintResult::from_response(&response))
    }

    /// List all printers known to the server with a single CUPS-Get-Printers request
    pub fn get_printers(&self) -> Result<Vec<Printer>, IppError> {
        let mut request = self.new_request(Operation::CupsGetPrinters, None);
        request.add_operation_attribute(IppAttribute::keyword_list(
            IppAttribute::REQUESTED_ATTRIBUTES,
            PRINTER_ATTRIBUTES,
        )?);

        let response = self.send("/", &request)?.into_result()?;

        Ok(response
            .groups_of(DelimiterTag::PrinterAttributes)
            .filter(|g| !g.is_empty())
            .map(|group| self.printer_from_group(group))
            .collect())
    }

    // printer-uri-supported if present, otherwise derived from printer-name
    fn printer_from_group(&self, group: &IppAttributeGroup) -> Printer {
        let uri = group
            .value(IppAttribute::PRINTER_URI_SUPPORTED)
            .and_then(|v| v.iter().next())
            .and_then(IppValue::as_str)
            .map(ToOwned::to_owned)
            .or_else(|| {
                group
                    .value(IppAttribute::PRINTER_NAME)
                    .and_then(IppValue::as_str)
                    .map(|name| self.printer_uri(name))
            })
            .unwrap_or_default();
        Printer::from_attributes(uri, group)
    }

    /// Query one printer
    pub fn get_printer(&self, name: &str) -> Result<Printer, IppError> {
        let uri = self.printer_uri(name);
        let request = self.new_request(Operation::GetPrinterAttributes, Some(&uri));
        let response = self
            .send(&printer_path(name), &request)?
            .into_result()?;

        Ok(match response.printer_attributes() {
            Some(group) => Printer::from_attributes(&uri, group),
            None => Printer::unknown(&uri),
        })
    }

    /// Query the server default printer, `None` if there is none
    pub fn get_default_printer(&self) -> Result<Option<Printer>, IppError> {
        let request = self.new_request(Operation::CupsGetDefault, None);
        let response = self.send("/", &request)?;

        if !response.is_successful() {
            return Ok(None);
        }

        Ok(response
            .printer_attributes()
            .filter(|g| !g.is_empty())
            .map(|group| self.printer_from_group(group)))
    }

    /// List jobs of a printer, one attribute group per job carrying `job-id`, `job-name`
    /// and `job-state`. `which_jobs` is `completed`, `not-completed` or `all`.
    pub fn get_jobs(&self, printer: &str, my_jobs: bool, which_jobs: &str) -> Result<Vec<IppAttributeGroup>, IppError> {
        let mut request = self.new_request(Operation::GetJobs, Some(&self.printer_uri(printer)));
        request
            .add_operation_attribute(IppAttribute::boolean(IppAttribute::MY_JOBS, my_jobs))
            .add_operation_attribute(IppAttribute::keyword(IppAttribute::WHICH_JOBS, which_jobs))
            .add_operation_attribute(IppAttribute::keyword_list(
                IppAttribute::REQUESTED_ATTRIBUTES,
                JOB_ATTRIBUTES,
            )?);

        let response = self
            .send(&printer_path(printer), &request)?
            .into_result()?;

        Ok(response.groups_of(DelimiterTag::JobAttributes).cloned().collect())
    }

    fn job_control(&self, operation: Operation, printer: &str, job_id: i32) -> Result<bool, IppError> {
        let mut request = self.new_request(operation, Some(&self.printer_uri(printer)));
        request.add_operation_attribute(IppAttribute::integer(IppAttribute::JOB_ID, job_id));
        let response = self.send(&printer_path(printer), &request)?;
        Ok(response.is_successful())
    }

    fn printer_control(&self, operation: Operation, printer: &str) -> Result<bool, IppError> {
        let request = self.new_request(operation, Some(&self.printer_uri(printer)));
        let response = self.send(&printer_path(printer), &request)?;
        Ok(response.is_successful())
    }

    pub fn cancel_job(&self, printer: &str, job_id: i32) -> Result<bool, IppError> {
        self.job_control(Operation::CancelJob, printer, job_id)
    }

    pub fn hold_job(&self, printer: &str, job_id: i32) -> Result<bool, IppError> {
        self.job_control(Operation::HoldJob, printer, job_id)
    }

    pub fn release_job(&self, printer: &str, job_id: i32) -> Result<bool, IppError> {
        self.job_control(Operation::ReleaseJob, printer, job_id)
    }

    pub fn pause_printer(&self, printer: &str) -> Result<bool, IppError> {
        self.printer_control(Operation::PausePrinter, printer)
    }

    pub fn resume_printer(&self, printer: &str) -> Result<bool, IppError> {
        self.printer_control(Operation::ResumePrinter, printer)
    }

    /// Fail with `PrinterNotReady` if the printer is stopped or reports an error condition
    pub fn check_printer_ready(&self, printer: &str) -> Result<(), IppError> {
        let request = self.new_request(Operation::GetPrinterAttributes, Some(&self.printer_uri(printer)));
        let response = self
            .send(&printer_path(printer), &request)?
            .into_result()?;

        if crate::util::is_printer_ready(&response) {
            Ok(())
        } else {
            Err(IppError::PrinterNotReady)
        }
    }
}
