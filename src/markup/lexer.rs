use anyhow::{anyhow, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<(String, String)>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    // Comments and doctypes carry nothing we keep
    Comment,
    Eof,
}

/// Lenient markup tokenizer. A `<` that cannot start a tag is plain text;
/// only a tag cut off by the end of input is an error.
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char: current,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        pattern
            .chars()
            .enumerate()
            .all(|(i, ch)| self.peek(i) == Some(ch))
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn at_tag_start(&self) -> bool {
        if self.current_char != Some('<') {
            return false;
        }
        match self.peek(1) {
            Some('!') => true,
            Some('/') => self.peek(2).map_or(false, |c| c.is_ascii_alphabetic()),
            Some(c) => c.is_ascii_alphabetic(),
            None => false,
        }
    }

    fn read_name(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | ':' | '.') {
                result.push(ch.to_ascii_lowercase());
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_text(&mut self) -> String {
        let mut raw = String::new();
        while let Some(ch) = self.current_char {
            if self.at_tag_start() {
                break;
            }
            raw.push(ch);
            self.advance();
        }
        decode_entities(&raw)
    }

    fn read_comment(&mut self) -> Token {
        if self.starts_with("<!--") {
            for _ in 0..4 {
                self.advance();
            }
            while self.current_char.is_some() && !self.starts_with("-->") {
                self.advance();
            }
            for _ in 0..3 {
                self.advance();
            }
        } else {
            // <!DOCTYPE ...> and friends
            while let Some(ch) = self.current_char {
                self.advance();
                if ch == '>' {
                    break;
                }
            }
        }
        Token::Comment
    }

    fn read_end_tag(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance(); // <
        self.advance(); // /
        let name = self.read_name();
        while let Some(ch) = self.current_char {
            self.advance();
            if ch == '>' {
                return Ok(Token::EndTag(name));
            }
        }
        Err(anyhow!("Unterminated closing tag </{}> at {}", name, start))
    }

    fn read_attribute_value(&mut self, start: usize) -> Result<String> {
        match self.current_char {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut raw = String::new();
                loop {
                    match self.current_char {
                        Some(ch) if ch == quote => {
                            self.advance();
                            break;
                        }
                        Some(ch) => {
                            raw.push(ch);
                            self.advance();
                        }
                        None => return Err(anyhow!("Unterminated attribute value in tag at {}", start)),
                    }
                }
                Ok(decode_entities(&raw))
            }
            _ => {
                let mut raw = String::new();
                while let Some(ch) = self.current_char {
                    if ch.is_whitespace() || ch == '>' {
                        break;
                    }
                    raw.push(ch);
                    self.advance();
                }
                Ok(decode_entities(&raw))
            }
        }
    }

    fn read_start_tag(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance(); // <
        let name = self.read_name();
        let mut attributes: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            match self.current_char {
                None => return Err(anyhow!("Unterminated tag <{}> at {}", name, start)),
                Some('>') => {
                    self.advance();
                    return Ok(Token::StartTag {
                        name,
                        attributes,
                        self_closing: false,
                    });
                }
                Some('/') if self.peek(1) == Some('>') => {
                    self.advance();
                    self.advance();
                    return Ok(Token::StartTag {
                        name,
                        attributes,
                        self_closing: true,
                    });
                }
                Some(_) => {
                    let mut attr_name = String::new();
                    while let Some(ch) = self.current_char {
                        if ch.is_whitespace() || matches!(ch, '=' | '>' | '/') {
                            break;
                        }
                        attr_name.push(ch.to_ascii_lowercase());
                        self.advance();
                    }
                    if attr_name.is_empty() {
                        // Stray '/' or '=' inside a tag
                        self.advance();
                        continue;
                    }

                    self.skip_whitespace();
                    let value = if self.current_char == Some('=') {
                        self.advance();
                        self.skip_whitespace();
                        self.read_attribute_value(start)?
                    } else {
                        String::new()
                    };

                    // First occurrence wins, like browsers do
                    if !attributes.iter().any(|(n, _)| n == &attr_name) {
                        attributes.push((attr_name, value));
                    }
                }
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        match self.current_char {
            None => Ok(Token::Eof),
            Some('<') if self.at_tag_start() => match self.peek(1) {
                Some('!') => Ok(self.read_comment()),
                Some('/') => self.read_end_tag(),
                _ => self.read_start_tag(),
            },
            Some(_) => Ok(Token::Text(self.read_text())),
        }
    }

    pub fn tokenize_all(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            if token == Token::Eof {
                break;
            }
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Decode the named entities markup values realistically contain, plus
/// numeric references. Unknown entities are left untouched.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &tail[1..end];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            ch.map(|c| (c, end))
        });

        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
