//!
//! IPP value
//!
use std::{fmt, ops::Deref, str::FromStr};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use enum_as_inner::EnumAsInner;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    attribute::IppAttribute,
    error::{IppEncodeError, IppError},
    model::ValueTag,
    FromPrimitive as _,
};

const MAX_VALUE_LEN: usize = u16::MAX as usize;
const DATE_TIME_LEN: usize = 11;

/// Shape of a value on the wire, derived from its tag
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ValueKind {
    Integer,
    Boolean,
    Text,
    OctetString,
    RangeOfInteger,
    Resolution,
    DateTime,
    Collection,
}

impl ValueKind {
    /// Raw octets stand in for any kind: out-of-band values and values that could not be
    /// decoded with their tag layout.
    pub fn accepts(self, other: ValueKind) -> bool {
        self == other || self == ValueKind::OctetString || other == ValueKind::OctetString
    }

    /// Value layout for a tag byte. Tags without a variant in `ValueTag` are opaque octets.
    pub fn for_tag(tag: u8) -> ValueKind {
        let Some(tag) = ValueTag::from_u8(tag) else {
            return ValueKind::OctetString;
        };
        match tag {
            ValueTag::Integer | ValueTag::Enum => ValueKind::Integer,
            ValueTag::Boolean => ValueKind::Boolean,
            ValueTag::RangeOfInteger => ValueKind::RangeOfInteger,
            ValueTag::Resolution => ValueKind::Resolution,
            ValueTag::DateTime => ValueKind::DateTime,
            ValueTag::BegCollection => ValueKind::Collection,
            ValueTag::TextWithoutLanguage
            | ValueTag::NameWithoutLanguage
            | ValueTag::Keyword
            | ValueTag::Uri
            | ValueTag::UriScheme
            | ValueTag::Charset
            | ValueTag::NaturalLanguage
            | ValueTag::MimeMediaType
            | ValueTag::MemberAttrName => ValueKind::Text,
            ValueTag::OctetStringUnspecified
            | ValueTag::TextWithLanguage
            | ValueTag::NameWithLanguage
            | ValueTag::EndCollection
            | ValueTag::Unsupported
            | ValueTag::Unknown
            | ValueTag::NoValue => ValueKind::OctetString,
        }
    }
}

/// RFC 2579 DateAndTime, the 11-byte IPP dateTime value
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IppDateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub deci_seconds: u8,
    pub utc_dir: char,
    pub utc_hours: u8,
    pub utc_mins: u8,
}

impl IppDateTime {
    // None unless the UTC direction is '+' or '-'
    fn from_wire(mut data: Bytes) -> Option<IppDateTime> {
        if !matches!(data.get(8).copied(), Some(b'+' | b'-')) {
            return None;
        }
        Some(IppDateTime {
            year: data.get_u16(),
            month: data.get_u8(),
            day: data.get_u8(),
            hour: data.get_u8(),
            minutes: data.get_u8(),
            seconds: data.get_u8(),
            deci_seconds: data.get_u8(),
            utc_dir: data.get_u8() as char,
            utc_hours: data.get_u8(),
            utc_mins: data.get_u8(),
        })
    }

    fn write_to(&self, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        if self.utc_dir != '+' && self.utc_dir != '-' {
            return Err(IppEncodeError::InvalidUtcDirection(self.utc_dir));
        }
        buffer.put_u16(DATE_TIME_LEN as u16);
        buffer.put_u16(self.year);
        buffer.put_u8(self.month);
        buffer.put_u8(self.day);
        buffer.put_u8(self.hour);
        buffer.put_u8(self.minutes);
        buffer.put_u8(self.seconds);
        buffer.put_u8(self.deci_seconds);
        buffer.put_u8(self.utc_dir as u8);
        buffer.put_u8(self.utc_hours);
        buffer.put_u8(self.utc_mins);
        Ok(())
    }
}

/// Renders as `YYYY-MM-DDThh:mm:ss±hh:mm`, deci-seconds are not shown
impl fmt::Display for IppDateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minutes, self.seconds, self.utc_dir, self.utc_hours, self.utc_mins
        )
    }
}

impl FromStr for IppDateTime {
    type Err = IppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || IppError::InvalidValue(format!("invalid date-time: {s}"));

        let bytes = s.as_bytes();
        if bytes.len() != 25 || !s.is_ascii() {
            return Err(invalid());
        }
        let num = |range: std::ops::Range<usize>| {
            let field = &s[range];
            if !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            field.parse::<u16>().map_err(|_| invalid())
        };
        let separators = [(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':'), (22, b':')];
        if separators.iter().any(|&(idx, sep)| bytes[idx] != sep) {
            return Err(invalid());
        }
        let utc_dir = bytes[19] as char;
        if utc_dir != '+' && utc_dir != '-' {
            return Err(invalid());
        }

        Ok(IppDateTime {
            year: num(0..4)?,
            month: num(5..7)? as u8,
            day: num(8..10)? as u8,
            hour: num(11..13)? as u8,
            minutes: num(14..16)? as u8,
            seconds: num(17..19)? as u8,
            deci_seconds: 0,
            utc_dir,
            utc_hours: num(20..22)? as u8,
            utc_mins: num(23..25)? as u8,
        })
    }
}

/// Ordered values of a multi-valued attribute.
///
/// Never empty, never nested, every member has the same `ValueKind`. Raw octets may sit
/// between members of another kind, this is how out-of-band values such as `no-value`
/// and values with a foreign layout are kept when decoding.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "Vec<IppValue>", into = "Vec<IppValue>")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct ValueList(Vec<IppValue>);

impl ValueList {
    /// Create a list, checking that it is non-empty and homogeneous
    pub fn new(values: Vec<IppValue>) -> Result<ValueList, IppError> {
        if values.is_empty() {
            return Err(IppError::InvalidValue("empty value list".to_owned()));
        }
        if values.iter().any(|v| matches!(v, IppValue::List(_))) {
            return Err(IppError::InvalidValue("nested value list".to_owned()));
        }
        let kind = list_kind(&values);
        if values.iter().any(|v| !kind.accepts(v.kind())) {
            return Err(IppError::InvalidValue(format!("mixed value kinds in a {kind:?} list")));
        }
        Ok(ValueList(values))
    }

    /// Kind shared by all members, `OctetString` only if every member is raw octets
    pub fn kind(&self) -> ValueKind {
        list_kind(&self.0)
    }

    pub fn values(&self) -> &[IppValue] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<IppValue> {
        self.0
    }

    fn try_push(&mut self, value: IppValue) -> Result<(), IppValue> {
        if matches!(value, IppValue::List(_)) || !self.kind().accepts(value.kind()) {
            return Err(value);
        }
        self.0.push(value);
        Ok(())
    }
}

fn list_kind(values: &[IppValue]) -> ValueKind {
    values
        .iter()
        .map(IppValue::kind)
        .find(|kind| *kind != ValueKind::OctetString)
        .unwrap_or(ValueKind::OctetString)
}

impl Deref for ValueList {
    type Target = [IppValue];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<IppValue>> for ValueList {
    type Error = IppError;

    fn try_from(values: Vec<IppValue>) -> Result<Self, Self::Error> {
        ValueList::new(values)
    }
}

impl From<ValueList> for Vec<IppValue> {
    fn from(list: ValueList) -> Self {
        list.0
    }
}

/// IPP attribute value
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, EnumAsInner)]
pub enum IppValue {
    Integer(i32),
    Boolean(bool),
    Text(String),
    OctetString(Bytes),
    RangeOfInteger { min: i32, max: i32 },
    Resolution { cross_feed: i32, feed: i32, units: u8 },
    DateTime(IppDateTime),
    Collection(Vec<IppAttribute>),
    List(ValueList),
}

impl IppValue {
    /// Wire shape of this value. For lists this is the shape of the members.
    pub fn kind(&self) -> ValueKind {
        match self {
            IppValue::Integer(_) => ValueKind::Integer,
            IppValue::Boolean(_) => ValueKind::Boolean,
            IppValue::Text(_) => ValueKind::Text,
            IppValue::OctetString(_) => ValueKind::OctetString,
            IppValue::RangeOfInteger { .. } => ValueKind::RangeOfInteger,
            IppValue::Resolution { .. } => ValueKind::Resolution,
            IppValue::DateTime(_) => ValueKind::DateTime,
            IppValue::Collection(_) => ValueKind::Collection,
            IppValue::List(list) => list.kind(),
        }
    }

    /// Create a multi-valued value
    pub fn list(values: Vec<IppValue>) -> Result<IppValue, IppError> {
        ValueList::new(values).map(IppValue::List)
    }

    /// Borrow text content
    pub fn as_str(&self) -> Option<&str> {
        self.as_text().map(String::as_str)
    }

    /// Number of values, 1 for scalars
    pub fn len(&self) -> usize {
        match self {
            IppValue::List(list) => list.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over the values, a scalar yields itself once
    pub fn iter(&self) -> IppValueIterator<'_> {
        self.into_iter()
    }

    /// Add another value after the current one(s), turning a scalar into a list.
    /// The value is handed back if its kind does not match.
    pub(crate) fn append(&mut self, value: IppValue) -> Result<(), IppValue> {
        match self {
            IppValue::List(list) => list.try_push(value),
            scalar => {
                if matches!(value, IppValue::List(_)) || !scalar.kind().accepts(value.kind()) {
                    return Err(value);
                }
                scalar.push_unchecked(value);
                Ok(())
            }
        }
    }

    /// Append a value read from the wire. A value whose kind does not fit the ones already
    /// stored is kept as its `raw` octets, in which case `false` is returned.
    pub(crate) fn append_decoded(&mut self, value: IppValue, raw: Bytes) -> bool {
        match self.append(value) {
            Ok(()) => true,
            Err(_) => {
                self.push_unchecked(IppValue::OctetString(raw));
                false
            }
        }
    }

    fn push_unchecked(&mut self, value: IppValue) {
        match self {
            IppValue::List(list) => list.0.push(value),
            scalar => {
                let first = std::mem::replace(scalar, IppValue::Boolean(false));
                *scalar = IppValue::List(ValueList(vec![first, value]));
            }
        }
    }

    /// Decode a value body (the bytes after the value length field) according to its tag.
    ///
    /// Fixed-size layouts whose length does not match are returned as raw octets.
    pub fn parse(value_tag: u8, mut data: Bytes) -> IppValue {
        let expected = match ValueKind::for_tag(value_tag) {
            ValueKind::Integer => 4,
            ValueKind::Boolean => 1,
            ValueKind::RangeOfInteger => 8,
            ValueKind::Resolution => 9,
            ValueKind::DateTime => DATE_TIME_LEN,
            ValueKind::Text => {
                return match String::from_utf8(data.to_vec()) {
                    Ok(text) => IppValue::Text(text),
                    Err(_) => IppValue::OctetString(data),
                };
            }
            ValueKind::OctetString | ValueKind::Collection => return IppValue::OctetString(data),
        };

        if data.len() != expected {
            return IppValue::OctetString(data);
        }

        match ValueKind::for_tag(value_tag) {
            ValueKind::Integer => IppValue::Integer(data.get_i32()),
            ValueKind::Boolean => IppValue::Boolean(data.get_u8() != 0),
            ValueKind::RangeOfInteger => IppValue::RangeOfInteger {
                min: data.get_i32(),
                max: data.get_i32(),
            },
            ValueKind::Resolution => IppValue::Resolution {
                cross_feed: data.get_i32(),
                feed: data.get_i32(),
                units: data.get_u8(),
            },
            ValueKind::DateTime => match IppDateTime::from_wire(data.clone()) {
                Some(dt) => IppValue::DateTime(dt),
                None => IppValue::OctetString(data),
            },
            ValueKind::Text | ValueKind::OctetString | ValueKind::Collection => IppValue::OctetString(data),
        }
    }

    /// Write a single value including its length field. Collections also write their
    /// members and the closing end-collection entry. `name` is only used for error reports.
    pub(crate) fn write_to(&self, name: &str, buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
        match self {
            IppValue::Integer(i) => {
                buffer.put_u16(4);
                buffer.put_i32(*i);
            }
            IppValue::Boolean(b) => {
                buffer.put_u16(1);
                buffer.put_u8(*b as u8);
            }
            IppValue::RangeOfInteger { min, max } => {
                buffer.put_u16(8);
                buffer.put_i32(*min);
                buffer.put_i32(*max);
            }
            IppValue::Resolution { cross_feed, feed, units } => {
                buffer.put_u16(9);
                buffer.put_i32(*cross_feed);
                buffer.put_i32(*feed);
                buffer.put_u8(*units);
            }
            IppValue::DateTime(dt) => dt.write_to(buffer)?,
            IppValue::Text(s) => put_sized(name, s.as_bytes(), buffer)?,
            IppValue::OctetString(data) => put_sized(name, data, buffer)?,
            IppValue::Collection(members) => {
                // begin collection carries an empty value
                buffer.put_u16(0);
                for member in members {
                    member.write_member(buffer)?;
                }
                buffer.put_u8(ValueTag::EndCollection as u8);
                buffer.put_u16(0);
                buffer.put_u16(0);
            }
            IppValue::List(list) => {
                for value in list.iter() {
                    value.write_to(name, buffer)?;
                }
            }
        }
        Ok(())
    }
}

fn put_sized(name: &str, data: &[u8], buffer: &mut BytesMut) -> Result<(), IppEncodeError> {
    if data.len() > MAX_VALUE_LEN {
        return Err(IppEncodeError::ValueTooLong {
            name: name.to_owned(),
            len: data.len(),
        });
    }
    buffer.put_u16(data.len() as u16);
    buffer.put_slice(data);
    Ok(())
}

impl fmt::Display for IppValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IppValue::Integer(i) => write!(f, "{i}"),
            IppValue::Boolean(b) => write!(f, "{b}"),
            IppValue::Text(s) => write!(f, "{s}"),
            IppValue::OctetString(data) => write!(f, "{}", String::from_utf8_lossy(data)),
            IppValue::RangeOfInteger { min, max } => write!(f, "{min}..{max}"),
            IppValue::Resolution { cross_feed, feed, units } => {
                write!(f, "{}x{}{}", cross_feed, feed, if *units == 3 { "dpi" } else { "dpcm" })
            }
            IppValue::DateTime(dt) => write!(f, "{dt}"),
            IppValue::Collection(members) => {
                let s: Vec<String> = members.iter().map(|m| format!("{}={}", m.name(), m.value())).collect();
                write!(f, "<{}>", s.join(", "))
            }
            IppValue::List(list) => {
                let s: Vec<String> = list.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", s.join(", "))
            }
        }
    }
}

impl<'a> IntoIterator for &'a IppValue {
    type Item = &'a IppValue;
    type IntoIter = IppValueIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        IppValueIterator { value: self, index: 0 }
    }
}

pub struct IppValueIterator<'a> {
    value: &'a IppValue,
    index: usize,
}

impl<'a> Iterator for IppValueIterator<'a> {
    type Item = &'a IppValue;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match self.value {
            IppValue::List(list) => list.get(self.index),
            scalar if self.index == 0 => Some(scalar),
            _ => None,
        };
        self.index += 1;
        item
    }
}
