//! Line reassembly for wrapped "show config" output
//!
//! The router's terminal wraps long lines at a fixed column regardless of
//! token boundaries. Two wrap styles show up in practice and are repaired
//! independently:
//!
//! - **Value-suffix wraps**: a `key=value` parameter split before the `=`,
//!   e.g. `edns` / `=on`. The continuation always starts with `=`.
//! - **Token-list wraps**: long whitespace-separated filter ID lists. When
//!   the continuation line is indented the wrap fell on a token boundary;
//!   when it starts directly with a digit and the previous line ends with a
//!   digit, a single number was split in two.
//!
//! All functions here are total: any input produces an output.

/// Normalizes line endings, then repairs value-suffix and token-list wraps
/// in that order.
///
/// The transform is idempotent: no continuation markers survive one pass.
pub fn reassemble(raw: &str) -> String {
    let normalized = normalize_line_endings(raw);
    let joined = join_value_suffixes(&normalized);
    join_token_lists(&joined)
}

/// Replaces `\r\n` and bare `\r` with `\n`
pub fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Appends every line whose trimmed form starts with `=` to the
/// right-trimmed previous output line, without a separator.
///
/// Consecutive `=` lines chain onto the same target. A blank previous line
/// is never a target, and a `=` line at the start of the input is kept.
pub fn join_value_suffixes(text: &str) -> String {
    let mut output: Vec<String> = Vec::new();
    let mut joins = 0usize;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('=') {
            if let Some(previous) = output.last_mut().filter(|p| !p.trim().is_empty()) {
                let kept = previous.trim_end().len();
                previous.truncate(kept);
                previous.push_str(trimmed);
                joins += 1;
                tracing::trace!("joined value suffix '{}'", trimmed);
                continue;
            }
        }
        output.push(line.to_string());
    }

    if joins > 0 {
        tracing::debug!("value-suffix repair joined {} line(s)", joins);
    }
    output.join("\n")
}

/// Joins continuation lines of wrapped numeric token lists.
///
/// A continuation is any line whose trimmed form starts with a digit. It is
/// glued to the current line with no separator when the current line ends in
/// a digit and the *untrimmed* continuation starts with a digit (a
/// mid-number split); otherwise a single space is inserted. Blank lines do
/// not absorb continuations.
pub fn join_token_lists(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut mid_number = 0usize;
    let mut boundary = 0usize;

    let mut index = 0;
    while index < lines.len() {
        let mut line = lines[index].to_string();
        index += 1;

        if !line.trim().is_empty() {
            while let Some(raw_next) = lines.get(index).copied() {
                if !is_token_continuation(raw_next) {
                    break;
                }
                let next = raw_next.trim();
                if ends_with_digit(&line) && starts_with_digit(raw_next) {
                    line.push_str(next);
                    mid_number += 1;
                } else {
                    line.push(' ');
                    line.push_str(next);
                    boundary += 1;
                }
                index += 1;
            }
        }

        output.push(line);
    }

    if mid_number + boundary > 0 {
        tracing::debug!(
            "token-list repair joined {} mid-number and {} boundary wrap(s)",
            mid_number,
            boundary
        );
    }
    output.join("\n")
}

/// A line continues a wrapped token list when, once trimmed, it begins
/// with a digit
fn is_token_continuation(line: &str) -> bool {
    starts_with_digit(line.trim())
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn ends_with_digit(s: &str) -> bool {
    s.chars().next_back().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mixed_line_endings() {
        assert_eq!(
            normalize_line_endings("line1\r\nline2\nline3\rline4"),
            "line1\nline2\nline3\nline4"
        );
    }

    #[test]
    fn test_mid_number_split_joins_without_space() {
        let input = "ip lan2 secure filter in 20001\n0 20002";
        assert_eq!(reassemble(input), "ip lan2 secure filter in 200010 20002");
    }

    #[test]
    fn test_indented_continuation_joins_with_space() {
        let input = "ip lan2 secure filter in 20001\n 20002";
        assert_eq!(reassemble(input), "ip lan2 secure filter in 20001 20002");
    }

    #[test]
    fn test_multiple_continuations_are_consumed() {
        let input = "ip lan2 secure filter in 200020 20010\n0 200102\n 200103 200104\n 200105";
        assert_eq!(
            reassemble(input),
            "ip lan2 secure filter in 200020 200100 200102 200103 200104 200105"
        );
    }

    #[test]
    fn test_continuation_after_non_digit_gets_space() {
        // Current line ends with a keyword, so even an unindented digit
        // line is a token boundary.
        let input = "ip lan2 secure filter out 200099 dynamic\n200080 200081";
        assert_eq!(
            reassemble(input),
            "ip lan2 secure filter out 200099 dynamic 200080 200081"
        );
    }

    #[test]
    fn test_value_suffix_join() {
        let input = "dns server select 1 1.1.1.1 edns\n=on . ";
        assert_eq!(reassemble(input), "dns server select 1 1.1.1.1 edns=on .");
    }

    #[test]
    fn test_value_suffix_trims_previous_line() {
        let input = "dns server select 1 8.8.8.8 edns   \n   =on any .";
        assert_eq!(reassemble(input), "dns server select 1 8.8.8.8 edns=on any .");
    }

    #[test]
    fn test_value_suffix_chains() {
        let input = "key\n=a\n=b\nnext";
        assert_eq!(join_value_suffixes(input), "key=a=b\nnext");
    }

    #[test]
    fn test_leading_equals_line_is_kept() {
        assert_eq!(join_value_suffixes("=orphan\nline"), "=orphan\nline");
    }

    #[test]
    fn test_blank_lines_do_not_absorb_continuations() {
        let input = "ip route default gateway 192.0.2.1\n\n100 200\n\n=on";
        let once = reassemble(input);
        assert_eq!(once, input);
        assert_eq!(reassemble(&once), once);
    }

    #[test]
    fn test_trailing_newline_preserved() {
        assert_eq!(reassemble("a 1\n 2\n"), "a 1 2\n");
    }

    #[test]
    fn test_idempotent_on_wrapped_input() {
        let input = "ip lan1 secure filter in 1 2 3\r\n4 5\r\n 6\r\ndns server select 1 1.1.1.1 edns\r\n=on .\r\n";
        let once = reassemble(input);
        assert_eq!(reassemble(&once), once);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(reassemble(""), "");
    }
}
