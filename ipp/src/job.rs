//!
//! Print job description
//!
use std::{
    fs,
    path::{Path, PathBuf},
};

use bytes::Bytes;

use crate::{
    attribute::IppAttribute,
    error::IppError,
    model::{Orientation, PrintQuality},
};

const DEFAULT_FORMAT: &str = "application/octet-stream";

#[derive(Clone, Debug)]
enum Document {
    Empty,
    Content(Bytes),
    File(PathBuf),
}

/// Map a file extension to the document format sent to the printer
pub fn format_for_path<P: AsRef<Path>>(path: P) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "ps" => "application/postscript",
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        _ => DEFAULT_FORMAT,
    }
}

/// Expand the common media size shortcuts into PWG media names
pub fn media_name(size: &str) -> String {
    match size.to_ascii_lowercase().as_str() {
        "a3" => "iso_a3_297x420mm".to_owned(),
        "a4" => "iso_a4_210x297mm".to_owned(),
        "a5" => "iso_a5_148x210mm".to_owned(),
        "letter" => "na_letter_8.5x11in".to_owned(),
        "legal" => "na_legal_8.5x14in".to_owned(),
        _ => size.to_owned(),
    }
}

/// Print job: document plus the options that become job attributes
#[derive(Clone, Debug)]
pub struct Job {
    name: String,
    document_name: String,
    document_format: String,
    copies: i32,
    sides: Option<&'static str>,
    orientation: Option<Orientation>,
    quality: Option<PrintQuality>,
    media: Option<String>,
    media_type: Option<String>,
    color: Option<bool>,
    priority: Option<i32>,
    hold: bool,
    custom: Vec<IppAttribute>,
    document: Document,
}

impl Default for Job {
    fn default() -> Self {
        Job {
            name: String::new(),
            document_name: String::new(),
            document_format: DEFAULT_FORMAT.to_owned(),
            copies: 1,
            sides: None,
            orientation: None,
            quality: None,
            media: None,
            media_type: None,
            color: None,
            priority: None,
            hold: false,
            custom: Vec::new(),
            document: Document::Empty,
        }
    }
}

impl Job {
    /// Create a job with a given name
    pub fn new<S: AsRef<str>>(name: S) -> Self {
        Job {
            name: name.as_ref().to_owned(),
            ..Job::default()
        }
    }

    pub fn name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.name = name.as_ref().to_owned();
        self
    }

    pub fn document_name<S: AsRef<str>>(mut self, name: S) -> Self {
        self.document_name = name.as_ref().to_owned();
        self
    }

    /// Print these bytes, replaces a previously set file
    pub fn content<B: Into<Bytes>>(mut self, content: B) -> Self {
        self.document = Document::Content(content.into());
        self
    }

    /// Print a file. The format is guessed from the extension and the document name
    /// defaults to the file name. The file is read when the job is sent.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        self.document_format = format_for_path(path).to_owned();
        if self.document_name.is_empty() {
            if let Some(file_name) = path.file_name() {
                self.document_name = file_name.to_string_lossy().into_owned();
            }
        }
        self.document = Document::File(path.to_owned());
        self
    }

    /// Override the document MIME type
    pub fn format<S: AsRef<str>>(mut self, mime_type: S) -> Self {
        self.document_format = mime_type.as_ref().to_owned();
        self
    }

    /// Number of copies, at least 1
    pub fn copies(mut self, copies: i32) -> Self {
        self.copies = copies.max(1);
        self
    }

    pub fn duplex(mut self, enabled: bool, long_edge: bool) -> Self {
        self.sides = Some(match (enabled, long_edge) {
            (false, _) => "one-sided",
            (true, true) => "two-sided-long-edge",
            (true, false) => "two-sided-short-edge",
        });
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn quality(mut self, quality: PrintQuality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Media size, `a3`, `a4`, `a5`, `letter` and `legal` are expanded
    pub fn media_size<S: AsRef<str>>(mut self, size: S) -> Self {
        self.media = Some(media_name(size.as_ref()));
        self
    }

    pub fn media_type<S: AsRef<str>>(mut self, media_type: S) -> Self {
        self.media_type = Some(media_type.as_ref().to_owned());
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = Some(color);
        self
    }

    /// Job priority, clamped to 1..=100
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority.clamp(1, 100));
        self
    }

    /// Hold the job until it is released
    pub fn hold(mut self, hold: bool) -> Self {
        self.hold = hold;
        self
    }

    /// Add any other job attribute
    pub fn attribute(mut self, attribute: IppAttribute) -> Self {
        self.custom.push(attribute);
        self
    }

    pub fn job_name(&self) -> &str {
        &self.name
    }

    pub fn doc_name(&self) -> &str {
        &self.document_name
    }

    pub fn document_format(&self) -> &str {
        &self.document_format
    }

    pub fn has_content(&self) -> bool {
        !matches!(self.document, Document::Empty)
    }

    /// Document bytes, reading the file if one was set
    pub fn read_content(&self) -> Result<Bytes, IppError> {
        match &self.document {
            Document::Empty => Ok(Bytes::new()),
            Document::Content(data) => Ok(data.clone()),
            Document::File(path) => Ok(fs::read(path)?.into()),
        }
    }

    /// Job attributes for the request. Copies are only sent when more than one.
    pub fn attributes(&self) -> Vec<IppAttribute> {
        let mut attributes = Vec::new();

        if self.copies > 1 {
            attributes.push(IppAttribute::copies(self.copies));
        }
        if let Some(sides) = self.sides {
            attributes.push(IppAttribute::sides(sides));
        }
        if let Some(orientation) = self.orientation {
            attributes.push(IppAttribute::orientation(orientation));
        }
        if let Some(quality) = self.quality {
            attributes.push(IppAttribute::print_quality(quality));
        }
        if let Some(ref media) = self.media {
            attributes.push(IppAttribute::keyword(IppAttribute::MEDIA, media));
        }
        if let Some(ref media_type) = self.media_type {
            attributes.push(IppAttribute::keyword(IppAttribute::MEDIA_TYPE, media_type));
        }
        if let Some(color) = self.color {
            let mode = if color { "color" } else { "monochrome" };
            attributes.push(IppAttribute::keyword(IppAttribute::PRINT_COLOR_MODE, mode));
        }
        if let Some(priority) = self.priority {
            attributes.push(IppAttribute::integer(IppAttribute::JOB_PRIORITY, priority));
        }
        if self.hold {
            attributes.push(IppAttribute::keyword(IppAttribute::JOB_HOLD_UNTIL, "indefinite"));
        }

        attributes.extend(self.custom.iter().cloned());
        attributes
    }
}
