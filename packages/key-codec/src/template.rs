//! Format templates with `{}`-style placeholders.
//!
//! Templates use the familiar brace syntax: `{}` for automatic numbering,
//! `{0}` for an explicit position, `{name}` for a named field, `{{`/`}}` for
//! literal braces. A field may carry a format spec after a colon:
//! `[[fill]align][0][width][.precision][type]`, where align is one of `<`,
//! `>`, `^`, `=` and type is one of `s`, `d`, `f`.
//!
//! Values are rendered through `Display` first; text that reads as a decimal
//! number (`7`, `-3.5`, `1e3`) is then formatted as a number:
//!
//! - numbers align right by default, other text aligns left;
//! - the `0` flag fills with zeros after the sign, so `{:03}` turns `7` into
//!   `007` and `-7` into `-07`;
//! - precision on a decimal gives that many significant digits (`{:.2}`
//!   turns `3.14159` into `3.1`), `.Nf` gives fixed decimals, and precision
//!   on an integer is an error;
//! - precision on other text, or with type `s`, truncates it.
//!
//! Sign flags (`+`, `-`, space), `#`, grouping separators and the `b`, `o`,
//! `x`, `e`, `g`, `%` types are not supported and fail to parse. Zero
//! padding of negative numbers doesn't parse back through
//! [`FormatTemplate::to_regex`], nor does text whose ends contain the fill
//! character.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display};

use regex::Regex;

use crate::error::{CodecResult, KeyValidationError};

/// A reference to the value a placeholder is filled with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldRef {
    /// `{}`: the next positional argument.
    Auto,
    /// `{3}`: an explicit positional argument.
    Index(usize),
    /// `{name}`: a named argument.
    Name(String),
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Auto => write!(f, "{{}}"),
            FieldRef::Index(i) => write!(f, "{{{}}}", i),
            FieldRef::Name(name) => write!(f, "{{{}}}", name),
        }
    }
}

/// How a template numbers its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNumbering {
    /// Only `{}` placeholders.
    Automatic,
    /// Only explicit positions and names.
    Manual {
        indices: BTreeSet<usize>,
        names: BTreeSet<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    /// `=`: padding goes between the sign and the digits.
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    General,
    Text,
    Integer,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Spec {
    fill: Option<char>,
    align: Option<Align>,
    zero: bool,
    width: Option<usize>,
    precision: Option<usize>,
    kind: Kind,
}

impl Default for Spec {
    fn default() -> Self {
        Spec {
            fill: None,
            align: None,
            zero: false,
            width: None,
            precision: None,
            kind: Kind::General,
        }
    }
}

impl Spec {
    fn apply(&self, rendered: String) -> Result<String, String> {
        let text = match (self.kind, self.precision) {
            (Kind::Text, Some(precision)) => truncate(rendered, precision),
            (Kind::Text, None) => rendered,
            (Kind::Integer, _) if !is_integer(&rendered) => {
                return Err(format!("format code 'd' needs an integer, got {:?}", rendered))
            }
            (Kind::Integer, _) => rendered,
            (Kind::Fixed, precision) => match parse_number(&rendered) {
                Some(x) => format!("{:.*}", precision.unwrap_or(6), x),
                None => {
                    return Err(format!("format code 'f' needs a number, got {:?}", rendered))
                }
            },
            (Kind::General, None) => rendered,
            (Kind::General, Some(_)) if is_integer(&rendered) => {
                return Err(format!("precision not allowed for integer {:?}", rendered))
            }
            (Kind::General, Some(precision)) => match parse_number(&rendered) {
                Some(x) => general(x, precision),
                None => truncate(rendered, precision),
            },
        };

        let numeric = self.kind != Kind::Text && parse_number(&text).is_some();
        let align = match self.align {
            Some(align) => align,
            None if numeric && self.zero => Align::AfterSign,
            None if numeric => Align::Right,
            None => Align::Left,
        };
        if align == Align::AfterSign && !numeric {
            return Err(format!("'=' alignment needs a number, got {:?}", text));
        }
        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });

        let len = text.chars().count();
        let width = match self.width {
            Some(width) if width > len => width,
            _ => return Ok(text),
        };

        let pad = width - len;
        let (before, after) = match align {
            Align::Left => (0, pad),
            Align::Right | Align::AfterSign => (pad, 0),
            Align::Center => (pad / 2, pad - pad / 2),
        };

        let mut padded = String::with_capacity(text.len() + pad * fill.len_utf8());
        let digits = match align {
            Align::AfterSign if text.starts_with(['+', '-']) => {
                padded.push_str(&text[..1]);
                &text[1..]
            }
            _ => text.as_str(),
        };
        padded.extend(std::iter::repeat(fill).take(before));
        padded.push_str(digits);
        padded.extend(std::iter::repeat(fill).take(after));
        Ok(padded)
    }

    /// Which sides of a rendered field padding may appear on, as
    /// `(fill, before, after)`. `None` when the field is never padded.
    fn padding(&self) -> Option<(char, bool, bool)> {
        self.width?;
        let fill = self.fill.unwrap_or(if self.zero { '0' } else { ' ' });
        let sides = match self.align {
            Some(Align::Left) => (false, true),
            Some(Align::Right) | Some(Align::AfterSign) => (true, false),
            Some(Align::Center) => (true, true),
            None if self.kind == Kind::Text => (false, true),
            // Zero padding is for numbers, which pad on the left.
            None if self.zero || self.kind != Kind::General => (true, false),
            // Numbers pad on the left and text on the right.
            None => (true, true),
        };
        Some((fill, sides.0, sides.1))
    }

    fn is_lossy(&self) -> bool {
        self.precision.is_some() || self.kind == Kind::Fixed
    }
}

fn truncate(text: String, precision: usize) -> String {
    text.chars().take(precision).collect()
}

fn is_integer(text: &str) -> bool {
    text.parse::<i128>().is_ok()
}

/// Decimal number text: digits with an optional sign, point and exponent.
/// Words like `inf` and `nan` are text.
fn parse_number(text: &str) -> Option<f64> {
    if !text
        .bytes()
        .all(|b| b.is_ascii_digit() || b"+-.eE".contains(&b))
    {
        return None;
    }
    text.parse::<f64>().ok().filter(|x| x.is_finite())
}

/// Render `x` with `precision` significant digits, switching to scientific
/// notation for large and small exponents. Fixed notation keeps at least
/// one digit after the point (`3.0`, not `3`).
fn general(x: f64, precision: usize) -> String {
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, x);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => return scientific,
    };

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{}e{}{:02}",
            strip_fraction_zeros(mantissa),
            sign,
            exponent.abs()
        );
    }

    let decimals = (precision as i32 - 1 - exponent) as usize;
    let mut fixed = strip_fraction_zeros(&format!("{:.*}", decimals, x)).to_string();
    if !fixed.contains('.') {
        fixed.push_str(".0");
    }
    fixed
}

fn strip_fraction_zeros(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field { field: FieldRef, spec: Spec },
}

/// A parsed format template.
///
/// # Example
///
/// ```rust
/// use keyshape_key_codec::FormatTemplate;
///
/// let template = FormatTemplate::parse("{:.4}{:>10}").unwrap();
/// let rendered = template
///     .render_positional(&[&"longstring" as &dyn std::fmt::Display, &100])
///     .unwrap();
/// assert_eq!(rendered, "long       100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FormatTemplate {
    /// Parse a template string.
    pub fn parse(source: &str) -> CodecResult<Self> {
        let invalid = |offset: usize, message: &str| KeyValidationError::InvalidTemplate {
            template: source.to_string(),
            offset,
            message: message.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.peek().map(|&(_, next)| next) == Some('{') {
                        chars.next();
                        literal.push('{');
                        continue;
                    }

                    let mut body = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => return Err(invalid(offset, "nested placeholders are not supported")),
                            _ => body.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid(offset, "expected '}' before end of string"));
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let (field, spec) = Self::parse_field(&body).map_err(|m| invalid(offset, m))?;
                    segments.push(Segment::Field { field, spec });
                }
                '}' => {
                    if chars.peek().map(|&(_, next)| next) == Some('}') {
                        chars.next();
                        literal.push('}');
                    } else {
                        return Err(invalid(offset, "single '}' encountered"));
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(FormatTemplate {
            source: source.to_string(),
            segments,
        })
    }

    fn parse_field(body: &str) -> Result<(FieldRef, Spec), &'static str> {
        let (name, spec) = match body.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (body, None),
        };

        let field = if name.is_empty() {
            FieldRef::Auto
        } else if name.chars().all(|c| c.is_ascii_digit()) {
            FieldRef::Index(name.parse().map_err(|_| "field index is too large")?)
        } else if name.contains(['!', '.', '[', ']']) {
            return Err("conversions, attribute and item access are not supported");
        } else {
            FieldRef::Name(name.to_string())
        };

        let spec = match spec {
            Some(spec) => Self::parse_spec(spec)?,
            None => Spec::default(),
        };

        Ok((field, spec))
    }

    fn parse_spec(spec: &str) -> Result<Spec, &'static str> {
        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        };

        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = Spec::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(align_of) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(align_of) {
            parsed.align = Some(align);
            i = 1;
        }

        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let digits = |from: usize| {
            chars[from..]
                .iter()
                .take_while(|c| c.is_ascii_digit())
                .count()
        };

        let n = digits(i);
        if n > 0 {
            let width: String = chars[i..i + n].iter().collect();
            parsed.width = Some(width.parse().map_err(|_| "width is too large")?);
            i += n;
        }

        if chars.get(i) == Some(&'.') {
            i += 1;
            let n = digits(i);
            if n == 0 {
                return Err("format specifier missing precision");
            }
            let precision: String = chars[i..i + n].iter().collect();
            parsed.precision = Some(precision.parse().map_err(|_| "precision is too large")?);
            i += n;
        }

        match chars.get(i) {
            Some('s') => parsed.kind = Kind::Text,
            Some('d') => parsed.kind = Kind::Integer,
            Some('f') => parsed.kind = Kind::Fixed,
            _ => {}
        }
        if parsed.kind != Kind::General {
            i += 1;
        }

        if i != chars.len() {
            return Err("unsupported format specifier");
        }
        if parsed.kind == Kind::Integer && parsed.precision.is_some() {
            return Err("precision not allowed with format code 'd'");
        }
        if parsed.kind == Kind::Text && parsed.align == Some(Align::AfterSign) {
            return Err("'=' alignment not allowed with format code 's'");
        }

        Ok(parsed)
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Field references in order of appearance, with repetition.
    ///
    /// ```rust
    /// use keyshape_key_codec::{FieldRef, FormatTemplate};
    ///
    /// let template = FormatTemplate::parse("{0} (no 1) {2}, {0} again, {name}").unwrap();
    /// assert_eq!(
    ///     template.params(),
    ///     vec![
    ///         FieldRef::Index(0),
    ///         FieldRef::Index(2),
    ///         FieldRef::Index(0),
    ///         FieldRef::Name("name".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn params(&self) -> Vec<FieldRef> {
        self.fields().map(|(field, _)| field.clone()).collect()
    }

    /// The number of distinct field references. All `{}` count as one.
    pub fn n_params(&self) -> usize {
        self.fields()
            .map(|(field, _)| field)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Classify the template's field numbering.
    ///
    /// Fails if automatic numbering is mixed with explicit positions or names.
    pub fn field_numbering(&self) -> CodecResult<FieldNumbering> {
        let mut auto = false;
        let mut indices = BTreeSet::new();
        let mut names = BTreeSet::new();

        for (field, _) in self.fields() {
            match field {
                FieldRef::Auto => auto = true,
                FieldRef::Index(i) => {
                    indices.insert(*i);
                }
                FieldRef::Name(name) => {
                    names.insert(name.clone());
                }
            }
        }

        if !auto {
            return Ok(FieldNumbering::Manual { indices, names });
        }
        if !indices.is_empty() || !names.is_empty() {
            return Err(self.mixed());
        }
        Ok(FieldNumbering::Automatic)
    }

    /// Populate the template positionally.
    ///
    /// Extra arguments are ignored; a placeholder with no matching argument
    /// is an error.
    pub fn render_positional<V: Display>(&self, args: &[V]) -> CodecResult<String> {
        let mut next_auto = 0;
        let mut seen_auto = false;
        let mut seen_manual = false;

        self.render(|field| {
            let index = match field {
                FieldRef::Auto => {
                    seen_auto = true;
                    next_auto += 1;
                    next_auto - 1
                }
                FieldRef::Index(i) => {
                    seen_manual = true;
                    *i
                }
                FieldRef::Name(name) => {
                    return Err(self.format_error(
                        args.len(),
                        format!("named field {:?} needs a mapping, got positional arguments", name),
                    ))
                }
            };
            if seen_auto && seen_manual {
                return Err(self.mixed());
            }
            args.get(index).map(|v| v.to_string()).ok_or_else(|| {
                self.format_error(
                    args.len(),
                    format!("replacement index {} out of range", index),
                )
            })
        })
    }

    /// Populate the template by field name.
    ///
    /// Every placeholder must be named, and every entry of `args` must be
    /// used by some placeholder.
    pub fn render_named<V: Display>(&self, args: &BTreeMap<String, V>) -> CodecResult<String> {
        let keys = || format!("{:?}", args.keys().collect::<Vec<_>>());

        let rendered = self.render(|field| match field {
            FieldRef::Name(name) => args.get(name).map(|v| v.to_string()).ok_or_else(|| {
                KeyValidationError::Format {
                    template: self.source.clone(),
                    value: keys(),
                    message: format!("missing field {:?}", name),
                }
            }),
            other => Err(KeyValidationError::Format {
                template: self.source.clone(),
                value: keys(),
                message: format!("positional placeholder {} with no positional arguments", other),
            }),
        })?;

        let used: BTreeSet<&str> = self
            .fields()
            .filter_map(|(field, _)| match field {
                FieldRef::Name(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();
        let extra: Vec<&String> = args.keys().filter(|k| !used.contains(k.as_str())).collect();
        if !extra.is_empty() {
            return Err(KeyValidationError::Format {
                template: self.source.clone(),
                value: keys(),
                message: format!("fields {:?} are not used by the template", extra),
            });
        }

        Ok(rendered)
    }

    /// Build an anchored regex that parses strings rendered from this
    /// template.
    ///
    /// `{}` fields become unnamed groups in order, `{name}` fields become
    /// named groups (later repetitions match without capturing). Padding
    /// from a field's width is matched outside its group, so captures hold
    /// the unpadded value. Templates with explicit positions, precision or
    /// fixed-point fields can't be inverted this way.
    pub fn to_regex(&self) -> CodecResult<Regex> {
        let mut pattern = String::from("^");
        let mut named = BTreeSet::new();

        for segment in &self.segments {
            let (field, spec) = match segment {
                Segment::Literal(text) => {
                    pattern.push_str(&regex::escape(text));
                    continue;
                }
                Segment::Field { field, spec } => (field, spec),
            };

            let group = match field {
                FieldRef::Auto => "(.+?)".to_string(),
                FieldRef::Name(name) => {
                    if !is_group_name(name) {
                        return Err(self.invalid(format!(
                            "field name {:?} can't be used as a capture group",
                            name
                        )));
                    }
                    if named.insert(name.as_str()) {
                        format!("(?P<{}>.+?)", name)
                    } else {
                        "(?:.+?)".to_string()
                    }
                }
                FieldRef::Index(_) => {
                    return Err(self.invalid(
                        "templates with explicit field positions can't be inverted".to_string(),
                    ))
                }
            };
            if spec.is_lossy() {
                return Err(self.invalid(format!(
                    "field {} rounds or truncates its value and can't be inverted",
                    field
                )));
            }

            match spec.padding() {
                Some((fill, before, after)) => {
                    let run = format!("{}*", regex::escape(&fill.to_string()));
                    if before {
                        pattern.push_str(&run);
                    }
                    pattern.push_str(&group);
                    if after {
                        pattern.push_str(&run);
                    }
                }
                None => pattern.push_str(&group),
            }
        }

        self.field_numbering()?;
        pattern.push('$');
        Regex::new(&pattern).map_err(|e| self.invalid(e.to_string()))
    }

    fn fields(&self) -> impl Iterator<Item = (&FieldRef, &Spec)> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Field { field, spec } => Some((field, spec)),
            Segment::Literal(_) => None,
        })
    }

    fn render<F>(&self, mut resolve: F) -> CodecResult<String>
    where
        F: FnMut(&FieldRef) -> CodecResult<String>,
    {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { field, spec } => {
                    let value = resolve(field)?;
                    let formatted = spec.apply(value.clone()).map_err(|message| {
                        KeyValidationError::Format {
                            template: self.source.clone(),
                            value,
                            message,
                        }
                    })?;
                    out.push_str(&formatted);
                }
            }
        }
        Ok(out)
    }

    fn mixed(&self) -> KeyValidationError {
        KeyValidationError::MixedFieldNumbering {
            template: self.source.clone(),
        }
    }

    fn invalid(&self, message: String) -> KeyValidationError {
        KeyValidationError::InvalidTemplate {
            template: self.source.clone(),
            offset: 0,
            message,
        }
    }

    fn format_error(&self, n_args: usize, message: String) -> KeyValidationError {
        KeyValidationError::Format {
            template: self.source.clone(),
            value: format!("{} positional arguments", n_args),
            message,
        }
    }
}

impl fmt::Display for FormatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
