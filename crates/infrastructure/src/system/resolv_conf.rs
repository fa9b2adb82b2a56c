use ferrous_dig_application::ports::NameserverSource;
use ferrous_dig_domain::DomainError;
use tracing::debug;

/// System nameservers from a resolv.conf(5) file.
pub struct ResolvConf {
    path: String,
}

impl ResolvConf {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// `nameserver` entries in file order. Comments start with `#` or `;`.
    pub fn parse(content: &str) -> Vec<String> {
        content
            .lines()
            .filter_map(|line| {
                let line = line.split(['#', ';']).next().unwrap_or("");
                let mut fields = line.split_whitespace();
                match (fields.next(), fields.next()) {
                    (Some("nameserver"), Some(address)) => Some(address.to_string()),
                    _ => None,
                }
            })
            .collect()
    }
}

impl Default for ResolvConf {
    fn default() -> Self {
        Self::new("/etc/resolv.conf")
    }
}

impl NameserverSource for ResolvConf {
    fn nameservers(&self) -> Result<Vec<String>, DomainError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            DomainError::InvalidDestination(format!(
                "no nameserver given and {} could not be read: {}",
                self.path, e
            ))
        })?;

        let nameservers = Self::parse(&content);
        debug!(path = %self.path, count = nameservers.len(), "resolv.conf parsed");
        Ok(nameservers)
    }

    fn origin(&self) -> String {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_nameservers_in_order() {
        let content = "\
# Generated by NetworkManager
search lan
nameserver 192.168.1.1
nameserver   2001:db8::53 # secondary
; nameserver 10.0.0.1
options edns0
";
        assert_eq!(
            ResolvConf::parse(content),
            vec!["192.168.1.1", "2001:db8::53"]
        );
    }

    #[test]
    fn test_parse_ignores_incomplete_lines() {
        assert!(ResolvConf::parse("nameserver\nnameservers 1.1.1.1\n").is_empty());
    }

    #[test]
    fn test_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "nameserver 9.9.9.9").unwrap();

        let source = ResolvConf::new(file.path().to_str().unwrap());
        assert_eq!(source.nameservers().unwrap(), vec!["9.9.9.9"]);
    }

    #[test]
    fn test_missing_file_is_invalid_destination() {
        let source = ResolvConf::new("/nonexistent/resolv.conf");
        assert!(matches!(
            source.nameservers(),
            Err(DomainError::InvalidDestination(_))
        ));
        assert_eq!(source.origin(), "/nonexistent/resolv.conf");
    }
}
