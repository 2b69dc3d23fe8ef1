/// Outcome of looking a tag up in an attribute blob.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TagValue<'a> {
    Found(&'a str),
    Missing,
}

impl<'a> TagValue<'a> {
    #[inline(always)]
    pub fn found(self) -> Option<&'a str> {
        match self {
            TagValue::Found(value) => Some(value),
            TagValue::Missing => None,
        }
    }

    /// Value used as a group key; a missing tag maps to the empty name.
    #[inline(always)]
    pub fn or_empty(self) -> &'a str {
        self.found().unwrap_or("")
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Token<'a> {
    Bare(&'a str),
    Quoted(&'a str),
    Separator,
}

/// Splits `key "value"; key value` text into bare words, quoted strings and
/// `;` separators. A quoted string without a closing quote is read as a bare
/// word.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    #[inline(always)]
    fn bare(&mut self, start: usize) -> Token<'a> {
        let bytes = self.text.as_bytes();
        let mut end = start;
        while end < bytes.len() && !bytes[end].is_ascii_whitespace() && bytes[end] != b';' {
            end += 1;
        }
        self.pos = end;
        Token::Bare(trim_quotes(&self.text[start..end]))
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return None;
        }

        let start = self.pos;
        match bytes[start] {
            b';' => {
                self.pos += 1;
                Some(Token::Separator)
            }
            b'"' => {
                if let Some(close) = self.text[start + 1..].find('"') {
                    let end = start + 1 + close;
                    self.pos = end + 1;
                    Some(Token::Quoted(&self.text[start + 1..end]))
                } else {
                    Some(self.bare(start))
                }
            }
            _ => Some(self.bare(start)),
        }
    }
}

#[inline(always)]
fn trim_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Looks `tag` up in a GTF-style attribute blob.
///
/// Accepts both `tag "value"` and `tag value`. When the tag occurs more than
/// once the last occurrence wins. Blobs no longer than the tag itself cannot
/// hold it and are reported as missing without scanning. Only whole keys
/// match: `id` does not find the value of `transcript_id`.
pub fn find_tag<'a>(attribute: &'a str, tag: &str) -> TagValue<'a> {
    if tag.is_empty() || attribute.len() <= tag.len() {
        return TagValue::Missing;
    }

    let mut found = TagValue::Missing;
    let mut prev: Option<Token<'a>> = None;
    for token in Tokens::new(attribute) {
        if let Some(Token::Bare(key)) = prev {
            if key == tag {
                match token {
                    Token::Bare(value) | Token::Quoted(value) => found = TagValue::Found(value),
                    Token::Separator => {}
                }
            }
        }
        prev = Some(token);
    }
    found
}

/// Appends `tag "value"` to an attribute blob, separating it from existing
/// content with ` ; `. A blob holding only `.` is treated as empty.
pub fn append_tag(attribute: &mut String, tag: &str, value: &str) {
    if attribute.is_empty() || attribute == "." {
        attribute.clear();
    } else {
        attribute.push_str(" ; ");
    }
    attribute.push_str(tag);
    attribute.push_str(" \"");
    attribute.push_str(value);
    attribute.push('"');
}
