//!
//! High-level utility functions
//!
use log::debug;

use crate::{
    attribute::IppAttribute, model::PrinterState, response::IppResponse, value::IppValue, FromPrimitive as _,
};

const ERROR_STATES: &[&str] = &[
    "media-jam",
    "toner-empty",
    "spool-area-full",
    "cover-open",
    "door-open",
    "input-tray-missing",
    "output-tray-missing",
    "marker-supply-empty",
    "paused",
    "shutdown",
];

/// Check a Get-Printer-Attributes response: the printer is ready unless it is stopped or one
/// of its state reasons is an error condition. Reasons may carry a severity suffix such as
/// `-error` or `-warning`.
pub fn is_printer_ready(response: &IppResponse) -> bool {
    let Some(printer) = response.printer_attributes() else {
        return true;
    };

    let state = printer
        .value(IppAttribute::PRINTER_STATE)
        .and_then(|v| v.as_integer())
        .and_then(|v| PrinterState::from_i32(*v));

    if let Some(PrinterState::Stopped) = state {
        debug!("Printer is stopped");
        return false;
    }

    let reasons = printer
        .value(IppAttribute::PRINTER_STATE_REASONS)
        .map(|v| v.iter().filter_map(IppValue::as_str).collect::<Vec<_>>())
        .unwrap_or_default();

    let failing = reasons.iter().any(|&reason| {
        let base = reason
            .strip_suffix("-error")
            .or_else(|| reason.strip_suffix("-warning"))
            .or_else(|| reason.strip_suffix("-report"))
            .unwrap_or(reason);
        ERROR_STATES.contains(&base)
    });

    if failing {
        debug!("Printer is in error state: {reasons:?}");
    }
    !failing
}
