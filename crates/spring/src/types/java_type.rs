use std::fmt;

/// A parsed Java type string such as `java.util.Map<java.lang.String, a.B$C[]>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    /// A class or primitive with its type arguments. Nested class names use
    /// `.` separators even when written with `$`.
    Class { name: String, args: Vec<JavaType> },
    Array(Box<JavaType>),
    /// `?`, `? extends T` or `? super T`; only the bound is kept.
    Wildcard(Option<Box<JavaType>>),
}

impl JavaType {
    pub fn class(name: impl Into<String>) -> Self {
        JavaType::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Parses a type string, returning `None` when it is malformed.
    pub fn parse(text: &str) -> Option<JavaType> {
        let mut cursor = Cursor { text, pos: 0 };
        let ty = cursor.parse_type()?;
        cursor.skip_ws();
        cursor.at_end().then_some(ty)
    }

    /// The erased class name; arrays and unbounded wildcards have none.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            JavaType::Class { name, .. } => Some(name),
            JavaType::Wildcard(Some(bound)) => bound.class_name(),
            _ => None,
        }
    }

    pub fn args(&self) -> &[JavaType] {
        match self {
            JavaType::Class { args, .. } => args,
            JavaType::Wildcard(Some(bound)) => bound.args(),
            _ => &[],
        }
    }

    /// Wildcards replaced by their bound, or `java.lang.Object` when unbounded.
    pub fn resolved(&self) -> JavaType {
        match self {
            JavaType::Wildcard(Some(bound)) => bound.resolved(),
            JavaType::Wildcard(None) => JavaType::class("java.lang.Object"),
            other => other.clone(),
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Class { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(",")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            JavaType::Array(element) => write!(f, "{element}[]"),
            JavaType::Wildcard(None) => f.write_str("?"),
            JavaType::Wildcard(Some(bound)) => write!(f, "? extends {bound}"),
        }
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.text.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        if after.chars().next().is_none_or(|c| !is_ident_char(c)) {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn parse_type(&mut self) -> Option<JavaType> {
        if self.eat("?") {
            let bound = if self.eat_keyword("extends") || self.eat_keyword("super") {
                Some(Box::new(self.parse_type()?))
            } else {
                None
            };
            return Some(JavaType::Wildcard(bound));
        }

        let name = self.parse_name()?;
        let mut args = Vec::new();
        if self.eat("<") {
            loop {
                args.push(self.parse_type()?);
                if self.eat(",") {
                    continue;
                }
                if self.eat(">") {
                    break;
                }
                return None;
            }
        }

        let mut ty = JavaType::Class { name, args };
        loop {
            if self.eat("[") {
                if !self.eat("]") {
                    return None;
                }
            } else if !self.eat("...") {
                break;
            }
            ty = JavaType::Array(Box::new(ty));
        }
        Some(ty)
    }

    fn parse_name(&mut self) -> Option<String> {
        self.skip_ws();
        let len = self
            .rest()
            .find(|c: char| !(is_ident_char(c) || c == '.' || c == '$'))
            .unwrap_or(self.rest().len());
        let raw = &self.rest()[..len];
        // `a.b...` is a varargs suffix, not part of the name
        let raw = raw.split("..").next().unwrap_or(raw).trim_end_matches('.');
        if raw.is_empty() {
            return None;
        }
        let (raw_len, name) = (raw.len(), raw.replace('$', "."));
        self.pos += raw_len;
        Some(name)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
