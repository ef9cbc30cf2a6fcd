//! Control-channel reply formatting. Single-line replies are
//! `NNN text\r\n`; multi-line replies open with `NNN-`, continue with bare
//! lines, and close with `NNN `.

use std::io;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Write half of the control connection, shared with transfer workers so they
/// can emit their own terminal reply.
pub type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Renders a single-line reply. Line breaks are not representable inside a
/// single-line reply and are stripped.
pub fn format_single(code: u16, text: &str) -> String {
    debug_assert!((100..600).contains(&code));
    format!("{} {}\r\n", code, sanitize(text))
}

/// Renders a multi-line reply block under one code.
pub fn format_multi(code: u16, lines: &[String], last: &str) -> String {
    debug_assert!((100..600).contains(&code));
    let mut out = String::new();
    match lines.split_first() {
        Some((first, rest)) => {
            out.push_str(&format!("{}-{}\r\n", code, sanitize(first)));
            for line in rest {
                out.push_str(&sanitize(line));
                out.push_str("\r\n");
            }
        }
        None => out.push_str(&format!("{}-\r\n", code)),
    }
    out.push_str(&format!("{} {}\r\n", code, sanitize(last)));
    out
}

fn sanitize(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

pub async fn send_reply(writer: &SharedWriter, code: u16, text: &str) -> io::Result<()> {
    let mut writer = writer.lock().await;
    writer.write_all(format_single(code, text).as_bytes()).await?;
    writer.flush().await
}

pub async fn send_multiline(
    writer: &SharedWriter,
    code: u16,
    lines: &[String],
    last: &str,
) -> io::Result<()> {
    let mut writer = writer.lock().await;
    writer
        .write_all(format_multi(code, lines, last).as_bytes())
        .await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_grammar() {
        assert_eq!(format_single(200, "OK."), "200 OK.\r\n");
        assert_eq!(format_single(221, "Bye"), "221 Bye\r\n");
    }

    #[test]
    fn single_line_strips_embedded_line_breaks() {
        assert_eq!(format_single(500, "a\r\nb"), "500 a  b\r\n");
    }

    #[test]
    fn multi_line_grammar() {
        let lines = vec!["first".to_string(), "second".to_string()];
        assert_eq!(
            format_multi(214, &lines, "last"),
            "214-first\r\nsecond\r\n214 last\r\n"
        );
    }

    #[test]
    fn multi_line_with_no_body_still_opens_and_closes() {
        assert_eq!(format_multi(214, &[], "done"), "214-\r\n214 done\r\n");
    }
}
