use std::collections::BTreeMap;

use thiserror::Error;

const LOGIN_COMMAND: &str = "/login";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid command '{0}', commands must start with '/'")]
    InvalidCommand(String),
}

/// A command path with its attributes and query filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    command: String,
    attributes: BTreeMap<String, String>,
    filters: Vec<String>,
}

impl Request {
    pub fn new(command: impl Into<String>) -> Result<Self, RequestError> {
        let command = command.into();
        if !command.starts_with('/') {
            return Err(RequestError::InvalidCommand(command));
        }

        Ok(Self {
            command,
            attributes: BTreeMap::new(),
            filters: Vec::new(),
        })
    }

    /// Plaintext credential login used by firmware 6.43 and later.
    pub fn login(username: &str, password: &str) -> Self {
        Self {
            command: LOGIN_COMMAND.to_string(),
            attributes: BTreeMap::from([
                ("name".to_string(), username.to_string()),
                ("password".to_string(), password.to_string()),
            ]),
            filters: Vec::new(),
        }
    }

    /// Sets `=key=value`; a repeated key replaces the earlier value.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Appends `?predicate`. Filters keep the order they were added in.
    pub fn with_filter(mut self, predicate: impl Into<String>) -> Self {
        self.filters.push(predicate.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// The sentence sent on the wire, without the terminating empty word.
    pub fn to_words(&self) -> Vec<String> {
        let mut words = Vec::with_capacity(1 + self.attributes.len() + self.filters.len());
        words.push(self.command.clone());
        words.extend(self.attributes.iter().map(|(k, v)| format!("={k}={v}")));
        words.extend(self.filters.iter().map(|q| format!("?{q}")));
        words
    }
}

/// Copy of `words` fit for logging, with password attribute values masked.
pub(crate) fn redacted(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| {
            if w.starts_with("=password=") {
                "=password=***".to_string()
            } else {
                w.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_words_in_order() {
        let request = Request::new("/interface/print")
            .unwrap()
            .with_attribute(".proplist", "name,type")
            .with_filter("type=ether")
            .with_filter("#|");

        assert_eq!(
            request.to_words(),
            vec![
                "/interface/print",
                "=.proplist=name,type",
                "?type=ether",
                "?#|"
            ]
        );
    }

    #[test]
    fn repeated_attribute_replaces_value() {
        let request = Request::new("/ip/address/add")
            .unwrap()
            .with_attribute("address", "10.0.0.1/24")
            .with_attribute("address", "10.0.0.2/24");

        assert_eq!(request.attributes().len(), 1);
        assert_eq!(request.attributes()["address"], "10.0.0.2/24");
    }

    #[test]
    fn empty_attribute_value_is_kept() {
        let request = Request::new("/ip/address/set")
            .unwrap()
            .with_attribute("comment", "");

        assert_eq!(request.to_words()[1], "=comment=");
    }

    #[test]
    fn login_request_words() {
        let words = Request::login("admin", "secret").to_words();

        assert_eq!(words[0], "/login");
        assert!(words.contains(&"=name=admin".to_string()));
        assert!(words.contains(&"=password=secret".to_string()));
    }

    #[test]
    #[should_panic(expected = "InvalidCommand")]
    fn command_requires_leading_slash() {
        Request::new("interface/print").unwrap();
    }

    #[test]
    #[should_panic(expected = "InvalidCommand")]
    fn command_must_not_be_empty() {
        Request::new("").unwrap();
    }

    #[test]
    fn password_is_masked() {
        let words = Request::login("admin", "secret").to_words();

        assert!(redacted(&words).iter().all(|w| !w.contains("secret")));
    }
}
