use ferrous_dig_domain::DomainError;

/// System nameserver discovery, used when the caller names no server.
pub trait NameserverSource: Send + Sync {
    /// Nameservers in configured order. An unreadable source is an error;
    /// a readable one with no entries returns an empty list.
    fn nameservers(&self) -> Result<Vec<String>, DomainError>;

    /// Where the list came from, for diagnostics.
    fn origin(&self) -> String;
}
