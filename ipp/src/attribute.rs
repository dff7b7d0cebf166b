//!
//! Attribute-related structs
//!
use bytes::{BufMut, Bytes, BytesMut};
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{IppEncodeError, IppError},
    model::{DelimiterTag, Orientation, PrintQuality, ValueTag},
    value::{IppDateTime, IppValue, ValueKind},
    FromPrimitive as _,
};

const MAX_NAME_LEN: usize = u16::MAX as usize;

macro_rules! define_attributes {
    ($($name:ident => $value:literal),* $(,)?) => {
        $(pub const $name: &'static str = $value;)*
    };
}

// raw octets are accepted under any tag, that is what the decoder falls back to
fn tag_accepts(tag: u8, value: &IppValue) -> bool {
    match value {
        IppValue::OctetString(_) => true,
        IppValue::List(list) => list.iter().all(|v| tag_accepts(tag, v)),
        other => other.kind() == ValueKind::for_tag(tag),
    }
}

/// `IppAttribute` represents an IPP attribute: a tag, a name and one or more values
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IppAttribute {
    tag: u8,
    name: String,
    value: IppValue,
}

impl IppAttribute {
    define_attributes! {
        ATTRIBUTES_CHARSET => "attributes-charset",
        ATTRIBUTES_NATURAL_LANGUAGE => "attributes-natural-language",
        COLOR_SUPPORTED => "color-supported",
        COPIES => "copies",
        DOCUMENT_FORMAT => "document-format",
        DOCUMENT_FORMAT_SUPPORTED => "document-format-supported",
        DOCUMENT_NAME => "document-name",
        JOB_HOLD_UNTIL => "job-hold-until",
        JOB_ID => "job-id",
        JOB_NAME => "job-name",
        JOB_PRIORITY => "job-priority",
        JOB_STATE => "job-state",
        JOB_URI => "job-uri",
        MEDIA => "media",
        MEDIA_SUPPORTED => "media-supported",
        MEDIA_TYPE => "media-type",
        MY_JOBS => "my-jobs",
        ORIENTATION_REQUESTED => "orientation-requested",
        PRINT_COLOR_MODE => "print-color-mode",
        PRINT_QUALITY => "print-quality",
        PRINTER_INFO => "printer-info",
        PRINTER_IS_ACCEPTING_JOBS => "printer-is-accepting-jobs",
        PRINTER_LOCATION => "printer-location",
        PRINTER_MAKE_AND_MODEL => "printer-make-and-model",
        PRINTER_NAME => "printer-name",
        PRINTER_STATE => "printer-state",
        PRINTER_STATE_REASONS => "printer-state-reasons",
        PRINTER_URI => "printer-uri",
        PRINTER_URI_SUPPORTED => "printer-uri-supported",
        REQUESTED_ATTRIBUTES => "requested-attributes",
        REQUESTING_USER_NAME => "requesting-user-name",
        SIDES => "sides",
        SIDES_SUPPORTED => "sides-supported",
        STATUS_MESSAGE => "status-message",
        WHICH_JOBS => "which-jobs",
    }

    /// Create new instance of the attribute
    ///
    /// * `tag` - value tag, decides the wire layout<br/>
    /// * `name` - attribute name, must not be empty<br/>
    /// * `value` - a value (or list of values) whose kind matches the tag<br/>
    pub fn new<S>(tag: ValueTag, name: S, value: IppValue) -> Result<IppAttribute, IppError>
    where
        S: AsRef<str>,
    {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(IppError::InvalidValue("attribute name must not be empty".to_owned()));
        }
        if !tag_accepts(tag as u8, &value) {
            return Err(IppError::InvalidValue(format!(
                "{:?} value cannot be sent as {:?} in '{}'",
                value.kind(),
                tag,
                name
            )));
        }
        Ok(IppAttribute::from_wire(tag as u8, name.to_owned(), value))
    }

    pub(crate) fn from_wire(tag: u8, name: String, value: IppValue) -> IppAttribute {
        IppAttribute { tag, name, value }
    }

    fn textual<S: AsRef<str>, V: AsRef<str>>(tag: ValueTag, name: S, value: V) -> IppAttribute {
        IppAttribute::from_wire(tag as u8, name.as_ref().to_owned(), IppValue::Text(value.as_ref().to_owned()))
    }

    pub fn keyword<S: AsRef<str>, V: AsRef<str>>(name: S, value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::Keyword, name, value)
    }

    /// Multi-valued keyword attribute such as `requested-attributes`
    pub fn keyword_list<S, V>(name: S, values: &[V]) -> Result<IppAttribute, IppError>
    where
        S: AsRef<str>,
        V: AsRef<str>,
    {
        let values = values
            .iter()
            .map(|v| IppValue::Text(v.as_ref().to_owned()))
            .collect();
        IppAttribute::new(ValueTag::Keyword, name, IppValue::list(values)?)
    }

    pub fn name_value<S: AsRef<str>, V: AsRef<str>>(name: S, value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::NameWithoutLanguage, name, value)
    }

    pub fn text<S: AsRef<str>, V: AsRef<str>>(name: S, value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::TextWithoutLanguage, name, value)
    }

    pub fn uri<S: AsRef<str>, V: AsRef<str>>(name: S, value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::Uri, name, value)
    }

    pub fn mime_media_type<S: AsRef<str>, V: AsRef<str>>(name: S, value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::MimeMediaType, name, value)
    }

    pub fn integer<S: AsRef<str>>(name: S, value: i32) -> IppAttribute {
        IppAttribute::from_wire(ValueTag::Integer as u8, name.as_ref().to_owned(), IppValue::Integer(value))
    }

    pub fn enumeration<S: AsRef<str>>(name: S, value: i32) -> IppAttribute {
        IppAttribute::from_wire(ValueTag::Enum as u8, name.as_ref().to_owned(), IppValue::Integer(value))
    }

    pub fn boolean<S: AsRef<str>>(name: S, value: bool) -> IppAttribute {
        IppAttribute::from_wire(ValueTag::Boolean as u8, name.as_ref().to_owned(), IppValue::Boolean(value))
    }

    pub fn range<S: AsRef<str>>(name: S, min: i32, max: i32) -> IppAttribute {
        IppAttribute::from_wire(
            ValueTag::RangeOfInteger as u8,
            name.as_ref().to_owned(),
            IppValue::RangeOfInteger { min, max },
        )
    }

    pub fn resolution<S: AsRef<str>>(name: S, cross_feed: i32, feed: i32, units: u8) -> IppAttribute {
        IppAttribute::from_wire(
            ValueTag::Resolution as u8,
            name.as_ref().to_owned(),
            IppValue::Resolution { cross_feed, feed, units },
        )
    }

    pub fn date_time<S: AsRef<str>>(name: S, value: IppDateTime) -> IppAttribute {
        IppAttribute::from_wire(ValueTag::DateTime as u8, name.as_ref().to_owned(), IppValue::DateTime(value))
    }

    pub fn charset<V: AsRef<str>>(value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::Charset, IppAttribute::ATTRIBUTES_CHARSET, value)
    }

    pub fn natural_language<V: AsRef<str>>(value: V) -> IppAttribute {
        IppAttribute::textual(ValueTag::NaturalLanguage, IppAttribute::ATTRIBUTES_NATURAL_LANGUAGE, value)
    }

    pub fn printer_uri<V: AsRef<str>>(uri: V) -> IppAttribute {
        IppAttribute::uri(IppAttribute::PRINTER_URI, uri)
    }

    pub fn job_uri<V: AsRef<str>>(uri: V) -> IppAttribute {
        IppAttribute::uri(IppAttribute::JOB_URI, uri)
    }

    pub fn requesting_user_name<V: AsRef<str>>(user: V) -> IppAttribute {
        IppAttribute::name_value(IppAttribute::REQUESTING_USER_NAME, user)
    }

    pub fn job_name<V: AsRef<str>>(name: V) -> IppAttribute {
        IppAttribute::name_value(IppAttribute::JOB_NAME, name)
    }

    pub fn document_name<V: AsRef<str>>(name: V) -> IppAttribute {
        IppAttribute::name_value(IppAttribute::DOCUMENT_NAME, name)
    }

    pub fn document_format<V: AsRef<str>>(mime_type: V) -> IppAttribute {
        IppAttribute::mime_media_type(IppAttribute::DOCUMENT_FORMAT, mime_type)
    }

    pub fn copies(copies: i32) -> IppAttribute {
        IppAttribute::integer(IppAttribute::COPIES, copies)
    }

    pub fn sides<V: AsRef<str>>(sides: V) -> IppAttribute {
        IppAttribute::keyword(IppAttribute::SIDES, sides)
    }

    pub fn orientation(orientation: Orientation) -> IppAttribute {
        IppAttribute::enumeration(IppAttribute::ORIENTATION_REQUESTED, orientation as i32)
    }

    pub fn print_quality(quality: PrintQuality) -> IppAttribute {
        IppAttribute::enumeration(IppAttribute::PRINT_QUALITY, quality as i32)
    }

    /// Build an attribute from a `key=value` style option: booleans and integers are
    /// recognized, anything else is sent as a keyword
    pub fn from_option<S: AsRef<str>>(name: S, value: &str) -> IppAttribute {
        match value {
            "true" => IppAttribute::boolean(name, true),
            "false" => IppAttribute::boolean(name, false),
            other => match other.parse::<i32>() {
                Ok(i) => IppAttribute::integer(name, i),
                Err(_) => IppAttribute::keyword(name, other),
            },
        }
    }

    /// Return raw value tag
    pub fn tag(&self) -> u8 {
        self.tag
    }

    /// Return value tag if it is a known one
    pub fn value_tag(&self) -> Option<ValueTag> {
        ValueTag::from_u8(self.tag)
    }

    /// Return attribute name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return attribute value
    pub fn value(&self) -> &IppValue {
        &self.value
    }

    /// Consume this attribute and return the value
    pub fn into_value(self) -> IppValue {
        self.value
    }

    pub(crate) fn append_value(&mut self, value: IppValue, raw: Bytes) {
        if !self.value.append_decoded(value, raw) {
            debug!("Attribute '{}': value of a foreign kind kept as raw octets", self.name);
        }
    }

    fn check_name(&self) -> Result<(), IppEncodeError> {
        if self.name.len() > MAX_NAME_LEN {
            Err(IppEncodeError::NameTooLong(self.name.len()))
        } else {
            Ok(())
        }
    }

    /// Write attribute to buffer. Every value after the first one is written with an
    /// empty name, which marks it as an additional value of the same attribute.
    pub fn write_to(&self, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        self.check_name()?;

        for (idx, value) in self.value.iter().enumerate() {
            buffer.put_u8(self.tag);
            if idx == 0 {
                buffer.put_u16(self.name.len() as u16);
                buffer.put_slice(self.name.as_bytes());
            } else {
                buffer.put_u16(0);
            }
            value.write_to(&self.name, buffer)?;
        }
        Ok(())
    }

    /// Write attribute to byte array
    pub fn to_bytes(&self) -> Result<Bytes, IppEncodeError> {
        let mut buffer = BytesMut::new();
        self.write_to(&mut buffer)?;
        Ok(buffer.freeze())
    }

    // collection member: memberAttrName entry carrying the name, then nameless values
    pub(crate) fn write_member(&self, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        self.check_name()?;

        buffer.put_u8(ValueTag::MemberAttrName as u8);
        buffer.put_u16(0);
        buffer.put_u16(self.name.len() as u16);
        buffer.put_slice(self.name.as_bytes());

        for value in self.value.iter() {
            buffer.put_u8(self.tag);
            buffer.put_u16(0);
            value.write_to(&self.name, buffer)?;
        }
        Ok(())
    }
}

// repeated names become multi-valued in arrival order, the first tag is kept
pub(crate) fn accumulate(attributes: &mut Vec<IppAttribute>, tag: u8, name: &str, value: IppValue, raw: Bytes) {
    match attributes.iter_mut().find(|a| a.name() == name) {
        Some(existing) => existing.append_value(value, raw),
        None => attributes.push(IppAttribute::from_wire(tag, name.to_owned(), value)),
    }
}

/// Attribute group: ordered attributes under one delimiter, names are unique
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct IppAttributeGroup {
    tag: DelimiterTag,
    attributes: Vec<IppAttribute>,
}

impl IppAttributeGroup {
    /// Create new attribute group of a given type
    pub fn new(tag: DelimiterTag) -> IppAttributeGroup {
        IppAttributeGroup {
            tag,
            attributes: Vec::new(),
        }
    }

    /// Return group type tag
    pub fn tag(&self) -> DelimiterTag {
        self.tag
    }

    /// Return attributes in wire order
    pub fn attributes(&self) -> &[IppAttribute] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Find attribute by name
    pub fn get(&self, name: &str) -> Option<&IppAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// Find attribute value by name
    pub fn value(&self, name: &str) -> Option<&IppValue> {
        self.get(name).map(IppAttribute::value)
    }

    /// Add attribute, replacing an existing one with the same name in place
    pub fn add(&mut self, attribute: IppAttribute) {
        match self.attributes.iter_mut().find(|a| a.name() == attribute.name()) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    pub(crate) fn accumulate(&mut self, tag: u8, name: &str, value: IppValue, raw: Bytes) {
        accumulate(&mut self.attributes, tag, name, value, raw)
    }

    /// Consume this group and return the attributes
    pub fn into_attributes(self) -> Vec<IppAttribute> {
        self.attributes
    }

    fn write_to(&self, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        buffer.put_u8(self.tag as u8);
        for attr in &self.attributes {
            attr.write_to(buffer)?;
        }
        Ok(())
    }
}

/// Attribute groups of one message, at most one group per delimiter tag
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IppAttributes {
    groups: Vec<IppAttributeGroup>,
}

impl IppAttributes {
    /// Create attribute list
    pub fn new() -> IppAttributes {
        IppAttributes::default()
    }

    /// Get all groups in the order they were first seen
    pub fn groups(&self) -> &[IppAttributeGroup] {
        &self.groups
    }

    /// Consume this attribute list and return all attribute groups
    pub fn into_groups(self) -> Vec<IppAttributeGroup> {
        self.groups
    }

    /// Get the group for a delimiter tag
    pub fn group(&self, tag: DelimiterTag) -> Option<&IppAttributeGroup> {
        self.groups.iter().find(|g| g.tag == tag)
    }

    /// Get or create the group for a delimiter tag
    pub fn group_mut(&mut self, tag: DelimiterTag) -> &mut IppAttributeGroup {
        let idx = match self.groups.iter().position(|g| g.tag == tag) {
            Some(idx) => idx,
            None => {
                self.groups.push(IppAttributeGroup::new(tag));
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }

    /// Look up a value by group and attribute name
    pub fn get(&self, tag: DelimiterTag, name: &str) -> Option<&IppValue> {
        self.group(tag).and_then(|g| g.value(name))
    }

    /// Add attribute to a given group
    pub fn add(&mut self, tag: DelimiterTag, attribute: IppAttribute) {
        self.group_mut(tag).add(attribute);
    }

    /// Write all non-empty groups followed by the end-of-attributes tag
    pub fn write_to(&self, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        for group in self.groups.iter().filter(|g| !g.is_empty()) {
            group.write_to(buffer)?;
        }
        buffer.put_u8(DelimiterTag::EndOfAttributes as u8);
        Ok(())
    }

    /// Write attribute list to byte array
    pub fn to_bytes(&self) -> Result<Bytes, IppEncodeError> {
        let mut buffer = BytesMut::new();
        self.write_to(&mut buffer)?;
        Ok(buffer.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_bytes() {
        let attr = IppAttribute::copies(2);
        assert_eq!(
            attr.to_bytes().unwrap(),
            vec![0x21, 0, 6, b'c', b'o', b'p', b'i', b'e', b's', 0, 4, 0, 0, 0, 2]
        );
    }

    #[test]
    fn test_multi_value_bytes() {
        let attr = IppAttribute::new(
            ValueTag::Integer,
            "list",
            IppValue::list(vec![IppValue::Integer(0x1111_1111), IppValue::Integer(0x2222_2222)]).unwrap(),
        )
        .unwrap();

        assert_eq!(
            attr.to_bytes().unwrap(),
            vec![
                0x21, 0, 4, b'l', b'i', b's', b't', 0, 4, 0x11, 0x11, 0x11, 0x11, 0x21, 0, 0, 0, 4, 0x22, 0x22, 0x22,
                0x22
            ],
        );
    }

    #[test]
    fn test_continuation_names() {
        let values = (0..5).map(|i| IppValue::Text(format!("v{i}"))).collect();
        let attr = IppAttribute::new(ValueTag::Keyword, "k", IppValue::list(values).unwrap()).unwrap();
        let bytes = attr.to_bytes().unwrap();

        // each entry: tag(1) name-len(2) [name] value-len(2) value(2)
        let mut named = 0;
        let mut unnamed = 0;
        let mut pos = 0;
        while pos < bytes.len() {
            let name_len = u16::from_be_bytes([bytes[pos + 1], bytes[pos + 2]]) as usize;
            if name_len == 0 {
                unnamed += 1;
            } else {
                named += 1;
            }
            pos += 3 + name_len;
            let value_len = u16::from_be_bytes([bytes[pos], bytes[pos + 1]]) as usize;
            pos += 2 + value_len;
        }
        assert_eq!(named, 1);
        assert_eq!(unnamed, 4);
    }

    #[test]
    fn test_collection_bytes() {
        let member = IppAttribute::keyword("media-type", "plain");
        let attr = IppAttribute::new(ValueTag::BegCollection, "coll", IppValue::Collection(vec![member])).unwrap();

        assert_eq!(
            attr.to_bytes().unwrap(),
            vec![
                0x34, 0, 4, b'c', b'o', b'l', b'l', 0, 0, 0x4a, 0, 0, 0, 10, b'm', b'e', b'd', b'i', b'a', b'-', b't',
                b'y', b'p', b'e', 0x44, 0, 0, 0, 5, b'p', b'l', b'a', b'i', b'n', 0x37, 0, 0, 0, 0,
            ]
        );
    }

    #[test]
    fn test_new_checks_kind() {
        assert!(IppAttribute::new(ValueTag::Integer, "n", IppValue::Text("x".to_owned())).is_err());
        assert!(IppAttribute::new(ValueTag::Keyword, "", IppValue::Text("x".to_owned())).is_err());
        assert!(IppAttribute::new(ValueTag::Enum, "n", IppValue::Integer(3)).is_ok());
        assert!(IppAttribute::new(ValueTag::DateTime, "d", IppValue::OctetString("raw".into())).is_ok());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(IppAttribute::from_option("a", "true").value(), &IppValue::Boolean(true));
        assert_eq!(IppAttribute::from_option("a", "-5").value(), &IppValue::Integer(-5));
        let attr = IppAttribute::from_option("sides", "two-sided-long-edge");
        assert_eq!(attr.value_tag(), Some(ValueTag::Keyword));
    }

    #[test]
    fn test_name_too_long() {
        let attr = IppAttribute::keyword("n".repeat(70_000), "v");
        assert!(matches!(attr.to_bytes(), Err(IppEncodeError::NameTooLong(70_000))));
    }

    #[test]
    fn test_attributes_skip_empty_groups() {
        let mut attributes = IppAttributes::new();
        attributes.group_mut(DelimiterTag::JobAttributes);
        attributes.add(DelimiterTag::OperationAttributes, IppAttribute::charset("utf-8"));

        let bytes = attributes.to_bytes().unwrap();
        assert_eq!(bytes[0], DelimiterTag::OperationAttributes as u8);
        assert_eq!(*bytes.last().unwrap(), DelimiterTag::EndOfAttributes as u8);
        assert!(!bytes.contains(&(DelimiterTag::JobAttributes as u8)));
    }

    #[test]
    fn test_group_add_replaces() {
        let mut group = IppAttributeGroup::new(DelimiterTag::JobAttributes);
        group.add(IppAttribute::copies(1));
        group.add(IppAttribute::sides("one-sided"));
        group.add(IppAttribute::copies(3));
        assert_eq!(group.len(), 2);
        assert_eq!(group.attributes()[0].value(), &IppValue::Integer(3));
    }
}
