//! Shell escaping for parameters embedded in platform commands.
//!
//! Commands run through the host's POSIX shell, and some Android arguments are
//! interpreted a second time by the device shell behind `adb shell`. Each
//! helper here targets exactly one interpreter so the iOS and Android rules can
//! be applied independently.

/// Characters that never need quoting on a POSIX shell command line.
fn is_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ',' | ':' | '/' | '@' | '%' | '+' | '=')
}

/// Quotes `s` as a single word for the host shell.
///
/// Strings made only of safe characters are returned unchanged; everything
/// else is wrapped in single quotes with embedded `'` written as `'\''`.
pub fn sh_quote(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_shell_safe) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Quotes `s` for a command that `adb shell` hands to the device shell.
///
/// `adb` joins its arguments and the device shell splits them again, so the
/// word is quoted once for the device and once more for the host.
pub fn adb_shell_quote(s: &str) -> String {
    sh_quote(&sh_quote(s))
}

/// Builds the double-quoted literal consumed by the iOS keystroke helper.
///
/// Inside double quotes the host shell still interprets `\`, `"`, `$` and
/// backticks, so each is backslash-escaped.
pub fn ios_keystroke_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Token `adb shell input text` decodes back into a space.
pub const ANDROID_SPACE_TOKEN: &str = "%s";

/// Characters passed to the device shell without a backslash.
fn is_device_shell_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Encodes `text` for one `adb shell input text` invocation.
///
/// Spaces become [`ANDROID_SPACE_TOKEN`] because the input command cannot
/// take them literally. Every other character outside `[A-Za-z0-9._-]` is
/// backslash-escaped for the device shell, and the result is then quoted for
/// the host shell.
///
/// Control characters cannot be escaped this way (a backslash-newline is a
/// line continuation); callers reject them first, see
/// [`Action::validate`](crate::action::Action::validate).
pub fn android_input_text(text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for c in text.chars() {
        if c == ' ' {
            encoded.push_str(ANDROID_SPACE_TOKEN);
        } else {
            if !is_device_shell_safe(c) {
                encoded.push('\\');
            }
            encoded.push(c);
        }
    }
    sh_quote(&encoded)
}

/// Encodes `text` as one or more `adb shell input text` arguments.
///
/// The input command turns every `%s` into a space and has no escape for a
/// literal one, so text is split after each `%` that is followed by `s`.
/// Typing the pieces one after another reproduces the original text.
pub fn android_input_segments(text: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if c == '%' && chars.peek() == Some(&'s') {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || segments.is_empty() {
        segments.push(current);
    }

    segments.iter().map(|s| android_input_text(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sh_quote_leaves_safe_words_bare() {
        assert_eq!(sh_quote("com.example.app"), "com.example.app");
        assert_eq!(sh_quote("A1B2C3D4-E5F6-7890"), "A1B2C3D4-E5F6-7890");
        assert_eq!(sh_quote("/tmp/out.png"), "/tmp/out.png");
    }

    #[test]
    fn sh_quote_wraps_unsafe_words() {
        assert_eq!(sh_quote(""), "''");
        assert_eq!(sh_quote("Pixel 7"), "'Pixel 7'");
        assert_eq!(sh_quote("a;rm -rf /"), "'a;rm -rf /'");
        assert_eq!(sh_quote("it's"), "'it'\\''s'");
        assert_eq!(sh_quote("$(whoami)"), "'$(whoami)'");
    }

    #[test]
    fn adb_shell_quote_quotes_twice() {
        assert_eq!(adb_shell_quote("com.example.app"), "com.example.app");
        // device word: 'a;b' ; host word wraps that again
        assert_eq!(adb_shell_quote("a;b"), "''\\''a;b'\\'''");
    }

    #[test]
    fn ios_literal_escapes_double_quotes() {
        assert_eq!(ios_keystroke_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn ios_literal_escapes_expansions() {
        assert_eq!(ios_keystroke_literal("$HOME"), "\"\\$HOME\"");
        assert_eq!(ios_keystroke_literal("`id`"), "\"\\`id\\`\"");
        assert_eq!(ios_keystroke_literal("a\\b"), "\"a\\\\b\"");
        assert_eq!(ios_keystroke_literal("it's"), "\"it's\"");
    }

    #[test]
    fn android_text_replaces_spaces() {
        assert_eq!(android_input_text("hello world"), "hello%sworld");
        assert_eq!(android_input_text("a  b"), "a%s%sb");
    }

    #[test]
    fn android_text_escapes_single_quotes_for_both_shells() {
        // device sees: it\'s ; host receives it inside single quotes
        assert_eq!(android_input_text("it's"), "'it\\'\\''s'");
    }

    #[test]
    fn android_text_escapes_device_metacharacters() {
        assert_eq!(android_input_text("a&b"), "'a\\&b'");
        assert_eq!(android_input_text("(x)"), "'\\(x\\)'");
        assert_eq!(android_input_text(""), "''");
    }

    #[test]
    fn android_text_escapes_everything_outside_allowlist() {
        assert_eq!(android_input_text("{a,b}"), "'\\{a\\,b\\}'");
        assert_eq!(android_input_text("[x]!"), "'\\[x\\]\\!'");
        assert_eq!(android_input_text("100%"), "'100\\%'");
        assert_eq!(android_input_text("v1.2_rc-3"), "v1.2_rc-3");
    }

    #[test]
    fn android_segments_split_literal_percent_s() {
        assert_eq!(android_input_segments("hello world"), vec!["hello%sworld"]);
        assert_eq!(android_input_segments(""), vec!["''"]);
        assert_eq!(android_input_segments("100%sure"), vec!["'100\\%'", "sure"]);
        assert_eq!(android_input_segments("%s"), vec!["'\\%'", "s"]);
        // a literal % before a space keeps the space token intact
        assert_eq!(android_input_segments("5% off"), vec!["'5\\%%soff'"]);
    }
}
