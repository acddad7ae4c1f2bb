//! CLI utilities for rosapi.
//!
//! The utilities present in this module can be used to build an interactive tool on top of a
//! [`Session`](crate::Session).
use std::io::{self, BufRead, Write};

use crate::{Command, CommandError, ReplyRow};

/// Prompt user for a command.
///
/// Returns `Ok(None)` once the reader reaches end of input.
pub fn prompt<R, W>(
    mut reader: R,
    mut writer: W,
) -> io::Result<Option<Result<Command, CommandError>>>
where
    R: BufRead,
    W: Write,
{
    let mut s = String::default();
    write!(&mut writer, "> ")?;
    writer.flush()?;

    if reader.read_line(&mut s)? == 0 {
        return Ok(None);
    }

    Ok(Some(s.trim_end().try_into()))
}

/// Writes rows as `key=value` lines with a blank line between rows.
pub fn write_rows<W: Write>(mut writer: W, rows: &[ReplyRow]) -> io::Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        for (key, value) in row {
            writeln!(writer, "{key}={value}")?;
        }
    }
    Ok(())
}

/// Writes rows as a pretty-printed JSON array.
pub fn write_json<W: Write>(mut writer: W, rows: &[ReplyRow]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use crate::Request;

    use super::*;

    #[test]
    fn prompt_prints_correctly() {
        let input = b".exit\n";
        let mut output = Vec::new();

        prompt(&input[..], &mut output).unwrap();

        let output = String::from_utf8(output).expect("not valid UTF-8");
        assert_eq!("> ", output);
    }

    #[test]
    fn prompt_handles_commands() {
        let input = b"/system/identity/print\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap().unwrap();
        assert_eq!(
            res,
            Ok(Command::Call(Request::new("/system/identity/print").unwrap()))
        );
    }

    #[test]
    fn prompt_end_of_input() {
        let input = b"";
        let mut output = Vec::new();

        assert_eq!(prompt(&input[..], &mut output).unwrap(), None);
    }

    #[test]
    fn prompt_unrecognized_command() {
        let input = b".something_wrong\n";
        let mut output = Vec::new();

        let res = prompt(&input[..], &mut output).unwrap().unwrap();
        assert_eq!(
            res,
            Err(CommandError::UnrecognizedCommand(".something_wrong".to_string()))
        );
    }

    #[test]
    fn rows_as_text() {
        let rows = vec![
            ReplyRow::from([
                ("name".to_string(), "ether1".to_string()),
                ("type".to_string(), "ether".to_string()),
            ]),
            ReplyRow::from([("name".to_string(), "lo".to_string())]),
        ];
        let mut output = Vec::new();

        write_rows(&mut output, &rows).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "name=ether1\ntype=ether\n\nname=lo\n"
        );
    }

    #[test]
    fn rows_as_json() {
        let rows = vec![ReplyRow::from([("name".to_string(), "ether1".to_string())])];
        let mut output = Vec::new();

        write_json(&mut output, &rows).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed, serde_json::json!([{ "name": "ether1" }]));
    }

    #[test]
    fn rows_keep_device_attribute_order() {
        let rows = vec![ReplyRow::from([
            ("type".to_string(), "ether".to_string()),
            ("name".to_string(), "ether1".to_string()),
        ])];

        let mut text = Vec::new();
        write_rows(&mut text, &rows).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "type=ether\nname=ether1\n");

        let mut json = Vec::new();
        write_json(&mut json, &rows).unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            "[\n  {\n    \"type\": \"ether\",\n    \"name\": \"ether1\"\n  }\n]\n"
        );
    }
}
