//!
//! IPP message parser
//!
use bytes::Bytes;
use log::{debug, error, trace};

use crate::{
    attribute::{self, IppAttribute, IppAttributeGroup, IppAttributes},
    model::{DelimiterTag, ValueTag},
    reader::IppReader,
    value::IppValue,
    IppHeader,
};

/// Parse error enum
#[derive(Debug, thiserror::Error)]
pub enum IppParseError {
    #[error("Message is {0} bytes long, the header alone needs 8")]
    TooShort(usize),

    #[error("Truncated message: {needed} bytes needed, {available} left")]
    Truncated { needed: usize, available: usize },

    #[error("Attribute with tag {0:#04x} appears before any group tag")]
    AttributeBeforeGroup(u8),

    #[error("Invalid IPP collection")]
    InvalidCollection,

    #[error("Invalid tag: {0:#04x}")]
    InvalidTag(u8),
}

/// Decoded message: header, attribute groups and whatever follows the end-of-attributes tag
#[derive(Clone, Debug)]
pub struct IppMessage {
    pub header: IppHeader,
    /// One bucket per group tag, repeated groups are merged
    pub attributes: IppAttributes,
    /// Every group as it appeared on the wire, in order
    pub sections: Vec<IppAttributeGroup>,
    pub payload: Bytes,
}

// one open collection
struct CollectionFrame {
    tag: u8,
    name: String,
    member: Option<String>,
    members: Vec<IppAttribute>,
}

struct ParserState {
    current_group: Option<DelimiterTag>,
    last_name: String,
    context: Vec<CollectionFrame>,
    attributes: IppAttributes,
    sections: Vec<IppAttributeGroup>,
}

impl ParserState {
    fn new() -> Self {
        ParserState {
            current_group: None,
            last_name: String::new(),
            context: Vec::new(),
            attributes: IppAttributes::new(),
            sections: Vec::new(),
        }
    }

    fn parse_delimiter(&mut self, tag: u8) -> Result<DelimiterTag, IppParseError> {
        trace!("Delimiter tag: {tag:#04x}");

        if !self.context.is_empty() {
            error!("Delimiter {tag:#04x} inside an open collection");
            return Err(IppParseError::InvalidTag(tag));
        }

        let group = DelimiterTag::from_wire(tag);
        if group != DelimiterTag::EndOfAttributes {
            // repeated group tags land in the same bucket
            self.attributes.group_mut(group);
            self.sections.push(IppAttributeGroup::new(group));
            self.current_group = Some(group);
            self.last_name.clear();
        }
        Ok(group)
    }

    fn store(&mut self, tag: u8, value: IppValue, raw: Bytes) -> Result<(), IppParseError> {
        let group = self.current_group.ok_or(IppParseError::AttributeBeforeGroup(tag))?;
        if let Some(section) = self.sections.last_mut() {
            section.accumulate(tag, &self.last_name, value.clone(), raw.clone());
        }
        self.attributes
            .group_mut(group)
            .accumulate(tag, &self.last_name, value, raw);
        Ok(())
    }

    fn store_member(frame: &mut CollectionFrame, tag: u8, value: IppValue, raw: Bytes) -> Result<(), IppParseError> {
        let Some(ref member) = frame.member else {
            error!("Collection value without member name in '{}'", frame.name);
            return Err(IppParseError::InvalidCollection);
        };
        attribute::accumulate(&mut frame.members, tag, member, value, raw);
        Ok(())
    }

    fn begin_collection(&mut self) -> Result<(), IppParseError> {
        trace!("Begin collection");
        let name = match self.context.last() {
            Some(parent) => parent.member.clone().ok_or(IppParseError::InvalidCollection)?,
            None => self.last_name.clone(),
        };
        self.context.push(CollectionFrame {
            tag: ValueTag::BegCollection as u8,
            name,
            member: None,
            members: Vec::new(),
        });
        Ok(())
    }

    fn end_collection(&mut self) -> Result<(), IppParseError> {
        trace!("End collection");
        let Some(frame) = self.context.pop() else {
            error!("End collection without an open collection");
            return Err(IppParseError::InvalidCollection);
        };

        let value = IppValue::Collection(frame.members);
        match self.context.last_mut() {
            Some(parent) => ParserState::store_member(parent, frame.tag, value, Bytes::new()),
            None => self.store(frame.tag, value, Bytes::new()),
        }
    }

    fn parse_value(&mut self, tag: u8, name: String, data: Bytes) -> Result<(), IppParseError> {
        if self.current_group.is_none() {
            error!("Value tag {tag:#04x} before any group");
            return Err(IppParseError::AttributeBeforeGroup(tag));
        }

        if self.context.is_empty() && !name.is_empty() {
            // a new attribute, empty names continue the previous one
            self.last_name = name;
        }

        if tag == ValueTag::BegCollection as u8 && data.is_empty() {
            return self.begin_collection();
        }
        if tag == ValueTag::EndCollection as u8 && !self.context.is_empty() {
            return self.end_collection();
        }

        match self.context.last_mut() {
            Some(frame) if tag == ValueTag::MemberAttrName as u8 => {
                let member = String::from_utf8_lossy(&data).into_owned();
                trace!("Member name: {member}");
                frame.member = Some(member);
                Ok(())
            }
            Some(frame) => {
                let value = IppValue::parse(tag, data.clone());
                trace!("Member value tag: {tag:#04x}: {value}");
                ParserState::store_member(frame, tag, value, data)
            }
            None => {
                // collection syntax outside of a collection has no layout of its own
                let value = if tag == ValueTag::MemberAttrName as u8 {
                    debug!("Member name outside of a collection in '{}'", self.last_name);
                    IppValue::OctetString(data.clone())
                } else {
                    IppValue::parse(tag, data.clone())
                };
                trace!("Value tag: {tag:#04x}: {}: {value}", self.last_name);
                self.store(tag, value, data)
            }
        }
    }
}

/// IPP parser over a complete in-memory message
pub struct IppParser {
    reader: IppReader,
    state: ParserState,
}

impl IppParser {
    /// Create IPP parser from message bytes
    pub fn new<T>(data: T) -> IppParser
    where
        T: Into<Bytes>,
    {
        IppParser {
            reader: IppReader::new(data.into()),
            state: ParserState::new(),
        }
    }

    fn parse_value(&mut self, tag: u8) -> Result<(), IppParseError> {
        let name = self.reader.read_name()?;
        let value = self.reader.read_value()?;

        self.state.parse_value(tag, name, value)
    }

    /// Parse the message. The bytes after the end-of-attributes tag are returned as payload.
    pub fn parse(mut self) -> Result<IppMessage, IppParseError> {
        let header = self.reader.read_header()?;
        trace!("IPP header: {header:?}");

        loop {
            match self.reader.read_tag()? {
                tag @ 0x00..=DelimiterTag::MAX_DELIMITER => {
                    if self.state.parse_delimiter(tag)? == DelimiterTag::EndOfAttributes {
                        break;
                    }
                }
                tag => self.parse_value(tag)?,
            }
        }

        Ok(IppMessage {
            header,
            attributes: self.state.attributes,
            sections: self.state.sections,
            payload: self.reader.into_payload(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IppVersion;

    const HEADER: [u8; 8] = [1, 1, 0, 0, 0, 0, 0, 0];

    fn message(body: &[u8]) -> Vec<u8> {
        let mut data = HEADER.to_vec();
        data.extend_from_slice(body);
        data
    }

    fn entry(tag: u8, name: &str, value: &[u8]) -> Vec<u8> {
        let mut data = vec![tag];
        data.extend_from_slice(&(name.len() as u16).to_be_bytes());
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(&(value.len() as u16).to_be_bytes());
        data.extend_from_slice(value);
        data
    }

    #[test]
    fn test_parse_no_attributes() {
        let res = IppParser::new(message(&[3])).parse().unwrap();
        assert!(res.attributes.groups().is_empty());
        assert!(res.payload.is_empty());
    }

    #[test]
    fn test_parse_single_value() {
        let data = message(&[
            4, 0x21, 0x00, 0x04, b't', b'e', b's', b't', 0x00, 0x04, 0x12, 0x34, 0x56, 0x78, 3,
        ]);
        let res = IppParser::new(data).parse().unwrap();
        let value = res.attributes.get(DelimiterTag::PrinterAttributes, "test").unwrap();
        assert_eq!(value.as_integer(), Some(&0x1234_5678));
    }

    #[test]
    fn test_parse_array() {
        let data = message(&[
            4, 0x21, 0x00, 0x04, b't', b'e', b's', b't', 0x00, 0x04, 0x12, 0x34, 0x56, 0x78, 0x21, 0x00, 0x00, 0x00,
            0x04, 0x77, 0x65, 0x43, 0x21, 3,
        ]);
        let res = IppParser::new(data).parse().unwrap();
        let value = res.attributes.get(DelimiterTag::PrinterAttributes, "test").unwrap();
        assert_eq!(
            value.as_list().map(|l| l.values()),
            Some(&[IppValue::Integer(0x1234_5678), IppValue::Integer(0x7765_4321)][..])
        );
    }

    #[test]
    fn test_parse_printer_state() {
        let mut body = vec![4];
        body.extend(entry(0x23, "printer-state", &3i32.to_be_bytes()));
        body.extend(entry(0x44, "printer-state-reasons", b"none"));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let printer = res.attributes.group(DelimiterTag::PrinterAttributes).unwrap();
        assert_eq!(printer.value("printer-state"), Some(&IppValue::Integer(3)));
        assert_eq!(
            printer.value("printer-state-reasons").and_then(|v| v.as_str()),
            Some("none")
        );
    }

    #[test]
    fn test_repeated_group_merges() {
        let mut body = vec![4];
        body.extend(entry(0x42, "printer-name", b"p1"));
        body.push(4);
        body.extend(entry(0x42, "printer-name", b"p2"));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        assert_eq!(res.attributes.groups().len(), 1);
        assert_eq!(res.sections.len(), 2);
        assert_eq!(
            res.sections[1].value("printer-name").and_then(|v| v.as_str()),
            Some("p2")
        );
        let names: Vec<_> = res
            .attributes
            .get(DelimiterTag::PrinterAttributes, "printer-name")
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(names, vec!["p1", "p2"]);
    }

    #[test]
    fn test_unknown_delimiter() {
        let mut body = vec![0x0e];
        body.extend(entry(0x21, "x", &1i32.to_be_bytes()));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        assert_eq!(res.attributes.get(DelimiterTag::Unknown, "x"), Some(&IppValue::Integer(1)));
    }

    #[test]
    fn test_parse_collection() {
        let data = message(&[
            4, 0x34, 0, 4, b'c', b'o', b'l', b'l', 0, 0, 0x4a, 0, 0, 0, 4, b'a', b'b', b'c', b'd', 0x44, 0, 0, 0, 3,
            b'k', b'e', b'y', 0x37, 0, 0, 0, 0, 3,
        ]);
        let res = IppParser::new(data).parse().unwrap();
        let attr = res
            .attributes
            .group(DelimiterTag::PrinterAttributes)
            .and_then(|g| g.get("coll"))
            .unwrap();
        assert_eq!(attr.tag(), ValueTag::BegCollection as u8);
        assert_eq!(
            attr.value(),
            &IppValue::Collection(vec![IppAttribute::keyword("abcd", "key")])
        );
    }

    #[test]
    fn test_parse_nested_collections() {
        let mut body = vec![4];
        body.extend(entry(0x34, "media-col", b""));
        body.extend(entry(0x4a, "", b"media-size"));
        body.extend(entry(0x34, "", b""));
        body.extend(entry(0x4a, "", b"x-dimension"));
        body.extend(entry(0x21, "", &21000i32.to_be_bytes()));
        body.extend(entry(0x37, "", b""));
        body.extend(entry(0x37, "", b""));
        // second collection value of the same attribute
        body.extend(entry(0x34, "", b""));
        body.extend(entry(0x37, "", b""));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let value = res.attributes.get(DelimiterTag::PrinterAttributes, "media-col").unwrap();
        assert_eq!(value.len(), 2);

        let first = value.iter().next().and_then(|v| v.as_collection()).unwrap();
        assert_eq!(first[0].name(), "media-size");
        let size = first[0].value().as_collection().unwrap();
        assert_eq!(size[0].name(), "x-dimension");
        assert_eq!(size[0].value(), &IppValue::Integer(21000));
    }

    #[test]
    fn test_encoded_attributes_decode_back() {
        let media_size = IppAttribute::new(
            ValueTag::BegCollection,
            "media-size",
            IppValue::Collection(vec![
                IppAttribute::integer("x-dimension", 21000),
                IppAttribute::integer("y-dimension", 29700),
            ]),
        )
        .unwrap();
        let media_col = IppAttribute::new(
            ValueTag::BegCollection,
            "media-col",
            IppValue::Collection(vec![media_size, IppAttribute::keyword("media-type", "stationery")]),
        )
        .unwrap();
        let formats = IppAttribute::new(
            ValueTag::MimeMediaType,
            "document-format-supported",
            IppValue::list(vec![
                IppValue::Text("application/pdf".to_owned()),
                IppValue::Text("text/plain".to_owned()),
                IppValue::Text("image/png".to_owned()),
            ])
            .unwrap(),
        )
        .unwrap();

        let mut attributes = IppAttributes::new();
        for attr in [
            IppAttribute::charset("utf-8"),
            IppAttribute::natural_language("en"),
            IppAttribute::boolean("color-supported", true),
            IppAttribute::enumeration("printer-state", 3),
            IppAttribute::range("copies-supported", 1, 999),
            IppAttribute::resolution("printer-resolution-default", 600, 600, 3),
            IppAttribute::date_time("printer-current-time", "2024-01-15T10:30:00+05:00".parse().unwrap()),
            formats,
            media_col,
        ] {
            attributes.add(DelimiterTag::PrinterAttributes, attr);
        }

        let mut data = HEADER.to_vec();
        data.extend_from_slice(&attributes.to_bytes().unwrap());
        let res = IppParser::new(data).parse().unwrap();

        assert_eq!(res.attributes, attributes);
    }

    #[test]
    fn test_parse_with_payload() {
        let data = message(&[
            4, 0x21, 0x00, 0x04, b't', b'e', b's', b't', 0x00, 0x04, 0x12, 0x34, 0x56, 0x78, 3, b'f', b'o', b'o',
        ]);
        let res = IppParser::new(data).parse().unwrap();
        assert_eq!(res.header.version, IppVersion::v1_1());
        assert_eq!(res.payload, "foo");
    }

    #[test]
    fn test_too_short() {
        for len in 0..8 {
            let res = IppParser::new(HEADER[..len].to_vec()).parse();
            assert!(matches!(res, Err(IppParseError::TooShort(n)) if n == len));
        }
    }

    #[test]
    fn test_attribute_before_group() {
        let data = message(&entry(0x21, "x", &[0, 0, 0, 1]));
        let res = IppParser::new(data).parse();
        assert!(matches!(res, Err(IppParseError::AttributeBeforeGroup(0x21))));
    }

    #[test]
    fn test_truncated() {
        let mut data = message(&[1]);
        data.extend(entry(0x21, "x", &[0, 0, 0, 1]));
        data.truncate(data.len() - 2);
        assert!(matches!(
            IppParser::new(data).parse(),
            Err(IppParseError::Truncated { .. })
        ));

        // missing end-of-attributes tag
        let data = message(&[1]);
        assert!(matches!(
            IppParser::new(data).parse(),
            Err(IppParseError::Truncated { .. })
        ));
    }

    #[test]
    fn test_integer_or_range_values() {
        let mut range = 2i32.to_be_bytes().to_vec();
        range.extend_from_slice(&16i32.to_be_bytes());

        let mut body = vec![4];
        body.extend(entry(0x21, "number-up-supported", &1i32.to_be_bytes()));
        body.extend(entry(0x33, "", &range));
        body.extend(entry(0x21, "", &32i32.to_be_bytes()));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let value = res
            .attributes
            .get(DelimiterTag::PrinterAttributes, "number-up-supported")
            .unwrap();
        let values: Vec<_> = value.iter().cloned().collect();
        assert_eq!(
            values,
            vec![
                IppValue::Integer(1),
                IppValue::OctetString(Bytes::from(range)),
                IppValue::Integer(32)
            ]
        );
    }

    #[test]
    fn test_no_value_next_to_integer() {
        let mut body = vec![2];
        body.extend(entry(0x21, "job-id", &1i32.to_be_bytes()));
        body.extend(entry(0x21, "time-at-completed", &100i32.to_be_bytes()));
        body.push(2);
        body.extend(entry(0x21, "job-id", &2i32.to_be_bytes()));
        body.extend(entry(0x13, "time-at-completed", b""));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let value = res
            .attributes
            .get(DelimiterTag::JobAttributes, "time-at-completed")
            .unwrap();
        assert_eq!(value.len(), 2);
        assert_eq!(value.iter().next(), Some(&IppValue::Integer(100)));

        assert_eq!(res.sections.len(), 2);
        assert_eq!(res.sections[0].value("time-at-completed"), Some(&IppValue::Integer(100)));
        assert_eq!(
            res.sections[1].value("time-at-completed"),
            Some(&IppValue::OctetString(Bytes::new()))
        );
        assert_eq!(res.sections[1].value("job-id"), Some(&IppValue::Integer(2)));
    }

    #[test]
    fn test_foreign_kind_continuation() {
        let mut body = vec![1];
        body.extend(entry(0x21, "x", &[0, 0, 0, 1]));
        body.extend(entry(0x44, "", b"text"));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let value = res.attributes.get(DelimiterTag::OperationAttributes, "x").unwrap();
        assert_eq!(value.kind(), crate::value::ValueKind::Integer);
        assert_eq!(value.iter().nth(1), Some(&IppValue::OctetString(Bytes::from_static(b"text"))));
    }

    #[test]
    fn test_stray_collection_tags() {
        let mut body = vec![4];
        body.extend(entry(0x37, "end", b""));
        body.extend(entry(0x4a, "member", b"abc"));
        body.extend(entry(0x34, "begin", b"xy"));
        body.extend(entry(0x21, "after", &5i32.to_be_bytes()));
        body.push(3);

        let res = IppParser::new(message(&body)).parse().unwrap();
        let printer = res.attributes.group(DelimiterTag::PrinterAttributes).unwrap();
        assert_eq!(printer.value("end"), Some(&IppValue::OctetString(Bytes::new())));
        assert_eq!(
            printer.value("member"),
            Some(&IppValue::OctetString(Bytes::from_static(b"abc")))
        );
        assert_eq!(
            printer.value("begin"),
            Some(&IppValue::OctetString(Bytes::from_static(b"xy")))
        );
        assert_eq!(printer.value("after"), Some(&IppValue::Integer(5)));
    }

    #[test]
    fn test_unbalanced_collection() {
        let mut body = vec![4];
        body.extend(entry(0x34, "c", b""));
        body.extend(entry(0x21, "", &1i32.to_be_bytes()));
        body.push(3);
        assert!(matches!(
            IppParser::new(message(&body)).parse(),
            Err(IppParseError::InvalidCollection)
        ));

        let mut body = vec![4];
        body.extend(entry(0x34, "c", b""));
        body.push(3);
        assert!(matches!(
            IppParser::new(message(&body)).parse(),
            Err(IppParseError::InvalidTag(3))
        ));
    }
}
