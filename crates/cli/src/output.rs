//! Result printing. Rendering is pure; only the `print_*` helpers touch
//! the terminal.

use ferrous_dig_domain::{DnsResponse, RecordData, ResourceRecord};
use ferrous_dig_infrastructure::dns::JsonMessage;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One tab-separated line per record.
    Table,
    /// Record data only.
    Short,
    Json { pretty: bool },
    /// The whole message in zone-file presentation, section by section.
    Message,
}

#[derive(Debug, Clone, Copy)]
pub struct Printer {
    mode: OutputMode,
    seconds: bool,
}

impl Printer {
    pub fn new(mode: OutputMode, seconds: bool) -> Self {
        Self { mode, seconds }
    }

    pub fn render(&self, response: &DnsResponse) -> Result<String, serde_json::Error> {
        match self.mode {
            OutputMode::Json { pretty } => {
                let message = JsonMessage::from_response(response);
                let mut out = if pretty {
                    serde_json::to_string_pretty(&message)?
                } else {
                    serde_json::to_string(&message)?
                };
                out.push('\n');
                Ok(out)
            }
            OutputMode::Short => Ok(self.render_short(response)),
            OutputMode::Message => Ok(render_message(response)),
            OutputMode::Table => Ok(self.render_table(response)),
        }
    }

    fn render_table(&self, response: &DnsResponse) -> String {
        let mut out = String::new();

        // No answers: show the SOA the server gave as proof of absence.
        if response.answers.is_empty() {
            for record in &response.authority {
                if matches!(record.data, RecordData::SOA { .. }) {
                    out.push_str(&self.table_line(record, false));
                    out.push('\n');
                }
            }
            return out;
        }

        for record in &response.answers {
            out.push_str(&self.table_line(record, true));
            out.push('\n');
        }
        out
    }

    fn table_line(&self, record: &ResourceRecord, in_answer: bool) -> String {
        let ttl = self.format_ttl(record.ttl);
        match &record.data {
            RecordData::MX {
                preference,
                exchange,
            } => format!(
                "MX\t{}\t{}\t{}\t\"{}\"",
                record.name, ttl, preference, exchange
            ),
            RecordData::CNAME(target) => {
                format!("CNAME\t{}\t{}\t\"{}\"", record.name, ttl, target)
            }
            RecordData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => format!(
                "SOA {} {} {}\"{}\" \"{}\" {} {} {} {} {}",
                record.name,
                ttl,
                if in_answer { "" } else { "A " },
                mname,
                rname,
                serial,
                format_duration(*refresh),
                format_duration(*retry),
                format_duration(*expire),
                format_duration(*minimum)
            ),
            data => format!("{}\t{}\t{}\t{}", record.record_type, record.name, ttl, data),
        }
    }

    fn render_short(&self, response: &DnsResponse) -> String {
        let mut out = String::new();
        for record in &response.answers {
            let _ = match &record.data {
                RecordData::CNAME(target) => writeln!(out, "\"{}\"", target),
                RecordData::MX {
                    preference,
                    exchange,
                } => writeln!(out, "{} \"{}\"", preference, exchange),
                data => writeln!(out, "{}", data),
            };
        }
        out
    }

    fn format_ttl(&self, ttl: u32) -> String {
        if self.seconds {
            format!("{}s", ttl)
        } else {
            format_duration(ttl)
        }
    }
}

fn render_message(response: &DnsResponse) -> String {
    let flags = &response.flags;
    let set: Vec<&str> = [
        (true, "qr"),
        (flags.authoritative, "aa"),
        (flags.truncated, "tc"),
        (flags.recursion_desired, "rd"),
        (flags.recursion_available, "ra"),
        (flags.authentic_data, "ad"),
        (flags.checking_disabled, "cd"),
    ]
    .into_iter()
    .filter_map(|(on, name)| on.then_some(name))
    .collect();

    let mut out = String::new();
    let _ = writeln!(out, ";; ->>HEADER<<- opcode: QUERY, status: {}", response.rcode);
    let _ = writeln!(
        out,
        ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
        set.join(" "),
        response.questions.len(),
        response.answers.len(),
        response.authority.len(),
        response.additional.len() + usize::from(response.edns.is_some())
    );

    if let Some(edns) = &response.edns {
        let _ = writeln!(out, "\n;; OPT PSEUDOSECTION:");
        let _ = writeln!(
            out,
            "; EDNS: version 0; flags:{}; udp: {}",
            if edns.dnssec_ok { " do" } else { "" },
            edns.max_payload
        );
    }

    if !response.questions.is_empty() {
        let _ = writeln!(out, "\n;; QUESTION SECTION:");
        for q in &response.questions {
            let _ = writeln!(out, ";{}\t{}\t{}", q.name, q.class, q.record_type);
        }
    }

    for (title, records) in [
        ("ANSWER", &response.answers),
        ("AUTHORITY", &response.authority),
        ("ADDITIONAL", &response.additional),
    ] {
        if records.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n;; {} SECTION:", title);
        for r in records {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}",
                r.name, r.ttl, r.class, r.record_type, r.data
            );
        }
    }
    out
}

/// Compact duration: `1d02h03m04s`. Leading zero units are omitted, later
/// units are zero-padded.
pub fn format_duration(total: u32) -> String {
    if total == 0 {
        return "0s".to_string();
    }

    let units = [
        (total / 86_400, 'd'),
        (total / 3_600 % 24, 'h'),
        (total / 60 % 60, 'm'),
        (total % 60, 's'),
    ];

    let mut out = String::new();
    for (value, unit) in units {
        if !out.is_empty() {
            let _ = write!(out, "{:02}{}", value, unit);
        } else if value > 0 {
            let _ = write!(out, "{}{}", value, unit);
        }
    }
    out
}

pub fn print_notes(notes: &str) {
    eprintln!("Notes: {}", notes);
}

pub fn print_error(error: &anyhow::Error) {
    eprintln!("Error: {:#}", error);
}
