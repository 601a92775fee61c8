use anyhow::{anyhow, Context, Result};
use clap::{App, Arg, ArgMatches};
use http_stack::http_client::set_follow_redirects;
use http_stack::output::print::FormattedOutputter;
use http_stack::output::{parse_format, Outputter};
use http_stack::rewriter::RewriteRules;
use http_stack::tls::{AcceptInvalidCerts, RootCertificates};
use http_stack::{Method, Request, RequestTranslator};
use std::collections::HashMap;
use std::io::stdout;
use std::path::Path;
use tracing::Level;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let matches = App::new("http-stack")
        .version(VERSION)
        .about("Sends a single HTTP request through the request translator")
        .author("Brian Payne")
        .arg(Arg::with_name("URL").required(true).index(1))
        .arg(
            Arg::with_name("METHOD")
                .short("X")
                .long("request")
                .default_value("GET")
                .validator(is_valid_method)
                .help("Request method: GET, POST, PUT, DELETE, HEAD or PATCH"),
        )
        .arg(
            Arg::with_name("HEADER")
                .short("H")
                .long("header")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .validator(is_valid_header)
                .help("A request header written as 'Name: value'"),
        )
        .arg(
            Arg::with_name("DATA")
                .short("d")
                .long("data")
                .takes_value(true)
                .help("The request body"),
        )
        .arg(
            Arg::with_name("CONTENT_TYPE")
                .short("c")
                .long("content-type")
                .takes_value(true)
                .help("Content type of the request body"),
        )
        .arg(
            Arg::with_name("TIMEOUT")
                .short("t")
                .long("timeout")
                .default_value("2500")
                .validator(is_valid_timeout)
                .help("Connect and read timeout in milliseconds, 0 disables it"),
        )
        .arg(
            Arg::with_name("ACCEPT_INVALID_CERT")
                .short("k")
                .long("danger-accept-invalid-certs")
                .help("Controls the use of certificate validation."),
        )
        .arg(
            Arg::with_name("CA_CERT")
                .long("cacert")
                .takes_value(true)
                .help("A PEM file with an extra certificate to trust for https URLs"),
        )
        .arg(
            Arg::with_name("NO_FOLLOW_REDIRECTS")
                .long("no-follow-redirects")
                .help("Return redirect responses instead of following them"),
        )
        .arg(
            Arg::with_name("REWRITE")
                .long("rewrite")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Replace a URL prefix, written as FROM=TO"),
        )
        .arg(
            Arg::with_name("BLOCK")
                .long("block")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .help("Refuse to request URLs starting with this prefix"),
        )
        .arg(
            Arg::with_name("RESPONSE_OUTPUT_FORMAT")
                .long("response-output-format")
                .short("s")
                .default_value("%R\n%H\n%B\n")
                .hide_default_value(true)
                .help("Define the format for print the response, possible options %R status line, %H headers, %B body \n[default: %R\\n%H\\n%B\\n]")
        )
        .arg(
            Arg::with_name("REQUEST_OUTPUT_FORMAT")
                .long("request-output-format")
                .short("q")
                .default_value("%R\n\n")
                .hide_default_value(true)
                .help("Define the format for print the request, possible options %R request line, %H headers, %B body \n[default: %R\\n\\n]")
        )
        .arg(
            Arg::with_name("VERBOSE")
                .short("v")
                .long("verbose")
                .multiple(true)
                .help("Log what the translator does, repeat for more detail"),
        )
        .usage("http-stack [OPTIONS] <URL>")
        .get_matches();

    init_logging(matches.occurrences_of("VERBOSE"));

    let request = build_request(&matches)?;
    let translator = build_translator(&matches)?;
    set_follow_redirects(!matches.is_present("NO_FOLLOW_REDIRECTS"));

    let response_format = matches.value_of("RESPONSE_OUTPUT_FORMAT").unwrap_or_default();
    let request_format = matches.value_of("REQUEST_OUTPUT_FORMAT").unwrap_or_default();

    let mut stdout = stdout();
    let mut outputter = FormattedOutputter::new(
        &mut stdout,
        parse_format(request_format)?,
        parse_format(response_format)?,
    );

    outputter
        .request(&request)
        .context("Failed outputting request")?;
    let response = translator
        .perform_request(&request, &HashMap::new())
        .with_context(|| format!("Error executing {} {}", request.method, request.url))?;
    outputter
        .response(response)
        .context("Error outputting response")
}

fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_request(matches: &ArgMatches) -> Result<Request> {
    let url = matches
        .value_of("URL")
        .ok_or_else(|| anyhow!("Missing URL"))?;
    let method: Method = matches
        .value_of("METHOD")
        .unwrap_or("GET")
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let timeout_ms: u64 = matches.value_of("TIMEOUT").unwrap_or("2500").parse()?;

    let mut request = Request::new(method, url).with_timeout_ms(timeout_ms);
    for header in matches.values_of("HEADER").into_iter().flatten() {
        let (name, value) = split_header(header).map_err(|e| anyhow!(e))?;
        request = request.with_header(name, value);
    }
    if let Some(data) = matches.value_of("DATA") {
        request = match matches.value_of("CONTENT_TYPE") {
            Some(content_type) => request.with_body(content_type, data),
            None => {
                let content_type = request.body_content_type.clone();
                request.with_body(content_type, data)
            }
        };
    }
    Ok(request)
}

fn build_translator(matches: &ArgMatches) -> Result<RequestTranslator> {
    let mut rules = RewriteRules::new();
    for prefix in matches.values_of("BLOCK").into_iter().flatten() {
        rules = rules.block_prefix(prefix);
    }
    for rule in matches.values_of("REWRITE").into_iter().flatten() {
        rules = rules.parse_replacement(rule).map_err(|e| anyhow!(e))?;
    }

    let mut translator = RequestTranslator::new();
    if !rules.is_empty() {
        translator = translator.url_rewriter(rules);
    }
    if matches.is_present("ACCEPT_INVALID_CERT") {
        translator = translator.tls(AcceptInvalidCerts);
    } else if let Some(path) = matches.value_of("CA_CERT") {
        let certificates = RootCertificates::from_pem_file(Path::new(path))
            .with_context(|| format!("Failed loading certificate: {}", path))?;
        translator = translator.tls(certificates);
    }
    Ok(translator)
}

fn split_header(header: &str) -> Result<(&str, &str), String> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value.trim())),
        _ => Err(format!("Invalid header '{}', expected 'Name: value'", header)),
    }
}

fn is_valid_header(val: String) -> Result<(), String> {
    split_header(&val).map(|_| ())
}

fn is_valid_method(val: String) -> Result<(), String> {
    val.parse::<Method>().map(|_| ())
}

fn is_valid_timeout(val: String) -> Result<(), String> {
    match val.parse::<u64>() {
        Ok(_) => Ok(()),
        Err(_) => Err(String::from("Timeout is not a valid number of milliseconds")),
    }
}
