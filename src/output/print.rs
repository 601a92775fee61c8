use crate::output::{prettify_body, FormatItem, Outputter};
use crate::{CanonicalResponse, Request};
use anyhow::{Context, Result};
use std::io::Write;

pub struct FormattedOutputter<'a, W: Write> {
    writer: &'a mut W,
    request_format: Vec<FormatItem>,
    response_format: Vec<FormatItem>,
}

impl<'a, W: Write> FormattedOutputter<'a, W> {
    pub fn new(
        writer: &'a mut W,
        request_format: Vec<FormatItem>,
        response_format: Vec<FormatItem>,
    ) -> FormattedOutputter<'a, W> {
        FormattedOutputter {
            writer,
            request_format,
            response_format,
        }
    }

    fn write(
        &mut self,
        format: &[FormatItem],
        first_line: &str,
        headers: &[(String, String)],
        body: &Option<String>,
    ) -> Result<()> {
        for format_item in format {
            let to_write = match format_item {
                FormatItem::FirstLine => first_line.to_string(),
                FormatItem::Headers => format_headers(headers),
                FormatItem::Body => format_body(body),
                FormatItem::Chars(s) => s.clone(),
            };
            self.writer.write_all(to_write.as_bytes())?;
        }
        Ok(())
    }
}

fn format_headers(headers: &[(String, String)]) -> String {
    headers
        .iter()
        .map(|(key, value)| format!("{}: {}\n", key, value))
        .collect()
}

fn format_body(body: &Option<String>) -> String {
    match body {
        Some(body) => prettify_body(body),
        None => String::new(),
    }
}

impl<'a, W: Write> Outputter for FormattedOutputter<'a, W> {
    fn request(&mut self, request: &Request) -> Result<()> {
        let Request {
            method,
            url,
            headers,
            body,
            ..
        } = request;

        let mut headers: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        headers.sort();
        let body = body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned());

        let format = self.request_format.clone();
        self.write(&format, &format!("{} {}", method, url), &headers, &body)
    }

    fn response(&mut self, response: CanonicalResponse) -> Result<()> {
        let first_line = response.status_line();
        let CanonicalResponse {
            headers, entity, ..
        } = response;

        let body = match entity {
            Some(entity) => {
                let bytes = entity
                    .into_bytes()
                    .context("Failed reading response body")?;
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            None => None,
        };

        let format = self.response_format.clone();
        self.write(&format, &first_line, &headers, &body)
    }
}
