// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Comment constraints for on-device display

/// Maximum comment length (in bytes) the device app will display
pub const MAX_COMMENT_LEN: usize = 120;

/// Check a comment can be displayed and signed by the device
///
/// The app only renders printable ASCII (`0x20..=0x7e`).
pub fn is_valid_ledger_comment(text: &str) -> bool {
    text.len() <= MAX_COMMENT_LEN && text.bytes().all(|c| (0x20..=0x7e).contains(&c))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepted() {
        let max = "x".repeat(MAX_COMMENT_LEN);
        let tests = &[
            "",
            "hello",
            "Payment #42 for order: 1/2 (ok)",
            "~!@#$%^&*()_+{}|",
            max.as_str(),
        ];

        for t in tests {
            assert!(is_valid_ledger_comment(t), "expected '{t}' to be accepted");
        }
    }

    #[test]
    fn rejected() {
        let over = "x".repeat(MAX_COMMENT_LEN + 1);
        let tests = &[
            "line\nbreak",
            "tab\there",
            "caf\u{e9}",
            "emoji \u{1f600}",
            "\u{7f}",
            over.as_str(),
        ];

        for t in tests {
            assert!(!is_valid_ledger_comment(t), "expected '{t}' to be rejected");
        }
    }
}
