pub mod print;


use crate::{CanonicalResponse, Request};
use anyhow::{anyhow, Result};

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum FormatItem {
    FirstLine,
    Headers,
    Body,
    Chars(String),
}

/// Parses an output format such as `%R\n%H\n%B\n`.
///
/// `%R` is the request or status line, `%H` the headers, `%B` the body and
/// `%%` a literal percent sign.
pub fn parse_format(format: &str) -> Result<Vec<FormatItem>> {
    let mut result = Vec::new();
    let mut marker = false;
    let mut buff = String::new();
    for ch in format.chars() {
        if marker {
            marker = false;
            let action = match ch {
                '%' => None,
                'R' => Some(FormatItem::FirstLine),
                'H' => Some(FormatItem::Headers),
                'B' => Some(FormatItem::Body),
                _ => return Err(anyhow!("Invalid formatting character '{}'", ch)),
            };
            match action {
                Some(item) => {
                    if !buff.is_empty() {
                        result.push(FormatItem::Chars(std::mem::take(&mut buff)));
                    }
                    result.push(item);
                }
                None => buff.push(ch),
            }
        } else if ch == '%' {
            marker = true;
        } else {
            buff.push(ch);
        }
    }
    if marker {
        return Err(anyhow!("Format ends with a dangling '%'"));
    }
    if !buff.is_empty() {
        result.push(FormatItem::Chars(buff));
    }
    Ok(result)
}

fn prettify_body(body: &str) -> String {
    match serde_json::from_str(body) {
        Ok(serde_json::Value::Object(object)) => {
            serde_json::to_string_pretty(&object).unwrap_or_else(|_| String::from(body))
        }
        _ => String::from(body),
    }
}

pub trait Outputter {
    fn request(&mut self, request: &Request) -> Result<()>;
    fn response(&mut self, response: CanonicalResponse) -> Result<()>;
}
