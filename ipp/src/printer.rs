//!
//! Printer descriptor
//!
use std::fmt;

use crate::{
    attribute::{IppAttribute, IppAttributeGroup},
    model::{DelimiterTag, PrinterState},
    value::IppValue,
    FromPrimitive as _,
};

fn strings(value: Option<&IppValue>) -> Vec<&str> {
    value
        .map(|v| v.iter().filter_map(IppValue::as_str).collect())
        .unwrap_or_default()
}

/// Printer as described by its printer attribute group
#[derive(Clone, Debug)]
pub struct Printer {
    uri: String,
    name: String,
    state: Option<PrinterState>,
    state_message: String,
    accepting_jobs: bool,
    attributes: IppAttributeGroup,
}

impl Printer {
    /// Build a descriptor. Without `printer-name` the last path segment of `uri` is used.
    pub fn from_attributes<S: AsRef<str>>(uri: S, attributes: &IppAttributeGroup) -> Printer {
        let uri = uri.as_ref();

        let name = attributes
            .value(IppAttribute::PRINTER_NAME)
            .and_then(IppValue::as_str)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| uri.trim_end_matches('/').rsplit('/').next().unwrap_or_default().to_owned());

        let state = attributes
            .value(IppAttribute::PRINTER_STATE)
            .and_then(|v| v.as_integer())
            .and_then(|v| PrinterState::from_i32(*v));

        let state_message = strings(attributes.value(IppAttribute::PRINTER_STATE_REASONS)).join(", ");

        let accepting_jobs = attributes
            .value(IppAttribute::PRINTER_IS_ACCEPTING_JOBS)
            .and_then(|v| v.as_boolean())
            .copied()
            .unwrap_or(true);

        Printer {
            uri: uri.to_owned(),
            name,
            state,
            state_message,
            accepting_jobs,
            attributes: attributes.clone(),
        }
    }

    /// Descriptor of a printer that reported no attributes
    pub fn unknown<S: AsRef<str>>(uri: S) -> Printer {
        Printer::from_attributes(uri, &IppAttributeGroup::new(DelimiterTag::PrinterAttributes))
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> Option<PrinterState> {
        self.state
    }

    /// `idle`, `processing`, `stopped` or `unknown`
    pub fn state_name(&self) -> &'static str {
        match self.state {
            Some(PrinterState::Idle) => "idle",
            Some(PrinterState::Processing) => "processing",
            Some(PrinterState::Stopped) => "stopped",
            None => "unknown",
        }
    }

    /// State reasons joined with commas
    pub fn state_message(&self) -> &str {
        &self.state_message
    }

    pub fn is_accepting_jobs(&self) -> bool {
        self.accepting_jobs
    }

    pub fn is_idle(&self) -> bool {
        self.state == Some(PrinterState::Idle)
    }

    pub fn is_processing(&self) -> bool {
        self.state == Some(PrinterState::Processing)
    }

    pub fn is_stopped(&self) -> bool {
        self.state == Some(PrinterState::Stopped)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.attributes.value(name).and_then(IppValue::as_str)
    }

    pub fn location(&self) -> Option<&str> {
        self.text(IppAttribute::PRINTER_LOCATION)
    }

    pub fn info(&self) -> Option<&str> {
        self.text(IppAttribute::PRINTER_INFO)
    }

    pub fn make_and_model(&self) -> Option<&str> {
        self.text(IppAttribute::PRINTER_MAKE_AND_MODEL)
    }

    pub fn supported_formats(&self) -> Vec<&str> {
        strings(self.attributes.value(IppAttribute::DOCUMENT_FORMAT_SUPPORTED))
    }

    pub fn supported_media(&self) -> Vec<&str> {
        strings(self.attributes.value(IppAttribute::MEDIA_SUPPORTED))
    }

    pub fn supports_color(&self) -> bool {
        self.attributes.value(IppAttribute::COLOR_SUPPORTED) == Some(&IppValue::Boolean(true))
    }

    pub fn supports_duplex(&self) -> bool {
        strings(self.attributes.value(IppAttribute::SIDES_SUPPORTED))
            .iter()
            .any(|s| s.starts_with("two-sided-"))
    }

    /// All printer attributes as received
    pub fn attributes(&self) -> &IppAttributeGroup {
        &self.attributes
    }
}

impl fmt::Display for Printer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.state_name())?;
        if !self.state_message.is_empty() {
            write!(f, ": {}", self.state_message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ValueTag, value::IppValue};

    fn group(attrs: Vec<IppAttribute>) -> IppAttributeGroup {
        let mut group = IppAttributeGroup::new(DelimiterTag::PrinterAttributes);
        for attr in attrs {
            group.add(attr);
        }
        group
    }

    fn keywords(name: &str, values: &[&str]) -> IppAttribute {
        let values = values.iter().map(|v| IppValue::Text((*v).to_owned())).collect();
        IppAttribute::new(ValueTag::Keyword, name, IppValue::list(values).unwrap()).unwrap()
    }

    #[test]
    fn test_full_descriptor() {
        let printer = Printer::from_attributes(
            "ipp://localhost:631/printers/office",
            &group(vec![
                IppAttribute::name_value(IppAttribute::PRINTER_NAME, "Office"),
                IppAttribute::enumeration(IppAttribute::PRINTER_STATE, 5),
                keywords(IppAttribute::PRINTER_STATE_REASONS, &["paused", "media-jam"]),
                IppAttribute::boolean(IppAttribute::PRINTER_IS_ACCEPTING_JOBS, false),
                IppAttribute::text(IppAttribute::PRINTER_LOCATION, "2nd floor"),
                IppAttribute::boolean(IppAttribute::COLOR_SUPPORTED, true),
                keywords(IppAttribute::SIDES_SUPPORTED, &["one-sided", "two-sided-long-edge"]),
                keywords(IppAttribute::MEDIA_SUPPORTED, &["iso_a4_210x297mm"]),
            ]),
        );

        assert_eq!(printer.name(), "Office");
        assert!(printer.is_stopped());
        assert_eq!(printer.state_message(), "paused, media-jam");
        assert!(!printer.is_accepting_jobs());
        assert_eq!(printer.location(), Some("2nd floor"));
        assert_eq!(printer.info(), None);
        assert!(printer.supports_color());
        assert!(printer.supports_duplex());
        assert_eq!(printer.supported_media(), vec!["iso_a4_210x297mm"]);
        assert_eq!(printer.to_string(), "Office (stopped): paused, media-jam");
    }

    #[test]
    fn test_defaults() {
        let printer = Printer::unknown("ipp://localhost:631/printers/lab/");
        assert_eq!(printer.name(), "lab");
        assert_eq!(printer.state_name(), "unknown");
        assert!(printer.is_accepting_jobs());
        assert!(!printer.supports_color());
        assert!(!printer.supports_duplex());
        assert!(printer.supported_formats().is_empty());
    }
}
