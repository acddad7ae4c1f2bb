use indexmap::IndexMap;

/// One data record from a `!re` sentence, in the order the device sent its attributes.
pub type ReplyRow = IndexMap<String, String>;

pub const TAG_RE: &str = "!re";
pub const TAG_DONE: &str = "!done";
pub const TAG_TRAP: &str = "!trap";
pub const TAG_FATAL: &str = "!fatal";
pub const TAG_EMPTY: &str = "!empty";

const MESSAGE_PREFIX: &str = "=message=";
const UNKNOWN_ERROR: &str = "unknown error";

/// An inbound sentence classified by its reply tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Row(ReplyRow),
    /// Sent by newer firmware ahead of `!done` when a query matched nothing.
    Empty,
    Done,
    Trap {
        message: String,
        sentence: Vec<String>,
    },
    Fatal {
        sentence: Vec<String>,
    },
    Unexpected {
        sentence: Vec<String>,
    },
}

impl Response {
    /// Classifies a sentence. Returns `None` for an empty sentence.
    pub fn parse(sentence: Vec<String>) -> Option<Self> {
        let tag = sentence.first()?.clone();

        let resp = match tag.as_str() {
            TAG_DONE => Response::Done,
            TAG_RE => Response::Row(parse_row(&sentence[1..])),
            TAG_EMPTY => Response::Empty,
            TAG_TRAP => Response::Trap {
                message: trap_message(&sentence),
                sentence,
            },
            TAG_FATAL => Response::Fatal { sentence },
            _ => Response::Unexpected { sentence },
        };
        Some(resp)
    }
}

/// Builds a row from `=key=value` words. A word without a second `=`
/// maps its key to an empty value; words not starting with `=` are skipped.
pub fn parse_row<S: AsRef<str>>(words: &[S]) -> ReplyRow {
    words
        .iter()
        .filter_map(|w| w.as_ref().strip_prefix('='))
        .map(|attr| match attr.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (attr.to_string(), String::new()),
        })
        .collect()
}

/// Extracts the `=message=` value from a trap sentence.
pub fn trap_message<S: AsRef<str>>(sentence: &[S]) -> String {
    sentence
        .iter()
        .find_map(|w| w.as_ref().strip_prefix(MESSAGE_PREFIX))
        .unwrap_or(UNKNOWN_ERROR)
        .to_string()
}
