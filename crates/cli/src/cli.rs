use clap::{ArgGroup, Parser};
use ferrous_dig_application::use_cases::LookupRequest;
use crate::output::OutputMode;
use ferrous_dig_domain::{CliOverrides, DohMethod, RecordType, Scheme};

#[derive(Parser, Debug)]
#[command(name = "ferrous-dig")]
#[command(version)]
#[command(about = "Ferrous Dig - DNS lookups over UDP, TCP, TLS and HTTPS")]
#[command(group(ArgGroup::new("transport").args(["udp", "tcp", "tls", "https"])))]
pub struct Cli {
    /// Host name or IP address to query
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// `@nameserver` and record type words, in any order
    #[arg(value_name = "ARGS")]
    pub words: Vec<String>,

    /// Host name or IP address to query (alternative to NAME)
    #[arg(short = 'q', long = "query", value_name = "NAME")]
    pub query: Option<String>,

    /// Type of the DNS record being queried (A, MX, NS...)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub record_type: Option<String>,

    /// Address of the nameserver to send packets to
    #[arg(short = 'n', long, value_name = "ADDR")]
    pub nameserver: Option<String>,

    /// Network class of the DNS record being queried (IN, CH, HS)
    #[arg(long, value_name = "CLASS", default_value = "IN")]
    pub class: String,

    /// Use the DNS protocol over UDP
    #[arg(short = 'U', long)]
    pub udp: bool,

    /// Use the DNS protocol over TCP
    #[arg(short = 'T', long)]
    pub tcp: bool,

    /// Use the DNS-over-TLS protocol
    #[arg(short = 'S', long)]
    pub tls: bool,

    /// Use the DNS-over-HTTPS protocol
    #[arg(short = 'H', long, alias = "http")]
    pub https: bool,

    /// How DNS-over-HTTPS requests are encoded (post, get, json)
    #[arg(long, value_name = "METHOD")]
    pub doh_method: Option<DohMethod>,

    /// Overall timeout per exchange, in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Set the DNSSEC OK bit
    #[arg(long)]
    pub dnssec: bool,

    /// Display the output as JSON
    #[arg(short = 'J', long)]
    pub json: bool,

    /// Indent JSON output (implies --json)
    #[arg(long, alias = "fmtjson")]
    pub pretty: bool,

    /// Show the whole DNS message instead of only the answers
    #[arg(long)]
    pub message: bool,

    /// Do not format durations, display them as seconds
    #[arg(long)]
    pub seconds: bool,

    /// Print how long the response took to arrive
    #[arg(long)]
    pub time: bool,

    /// Short mode: display nothing but the record data
    #[arg(short = '1', long)]
    pub short: bool,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    /// Short beats JSON, JSON beats the whole-message view.
    pub fn output_mode(&self) -> OutputMode {
        if self.short {
            OutputMode::Short
        } else if self.json || self.pretty {
            OutputMode::Json {
                pretty: self.pretty,
            }
        } else if self.message {
            OutputMode::Message
        } else {
            OutputMode::Table
        }
    }

    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            timeout_ms: self.timeout,
            dnssec_ok: self.dnssec.then_some(true),
            doh_method: self.doh_method,
            log_level: self.log_level.clone(),
        }
    }

    pub fn transport(&self) -> Option<Scheme> {
        match (self.udp, self.tcp, self.tls, self.https) {
            (true, ..) => Some(Scheme::Udp),
            (_, true, ..) => Some(Scheme::Tcp),
            (_, _, true, _) => Some(Scheme::Tls),
            (.., true) => Some(Scheme::Https),
            _ => None,
        }
    }

    /// Builds the lookup from flags and trailing words. Flags win over words.
    pub fn lookup_request(&self) -> Result<LookupRequest, String> {
        let name = self
            .query
            .clone()
            .or_else(|| self.name.clone())
            .ok_or_else(|| "no query name given".to_string())?;

        let mut word_nameserver = None;
        let mut word_type = None;
        for word in &self.words {
            if let Some(server) = word.strip_prefix('@') {
                word_nameserver = Some(server.to_string());
            } else if is_type_mnemonic(word) {
                word_type = Some(word.clone());
            } else {
                return Err(format!("unexpected argument '{}'", word));
            }
        }

        let mut request = LookupRequest::new(name);
        request.class = self.class.clone();
        request.transport = self.transport();
        request.nameserver = self.nameserver.clone().or(word_nameserver);
        if let Some(record_type) = self.record_type.clone().or(word_type) {
            request.record_type = record_type;
        }
        Ok(request)
    }
}

/// A record type word such as `MX` or `TYPE65`.
fn is_type_mnemonic(word: &str) -> bool {
    word.parse::<RecordType>().is_ok()
}
