/// Count words in mixed CJK/Latin text.
///
/// Every CJK ideograph is a word on its own. Runs of letters and digits
/// count once per run, where a run ends at whitespace or at a CJK character.
/// Punctuation and markup symbols neither start nor end a run, so `**bold**`
/// and `don't` are one word each.
pub fn count_words(text: &str) -> usize {
    let mut cjk = 0usize;
    let mut runs = 0usize;
    let mut in_run = false;

    for ch in text.chars() {
        if is_cjk(ch) {
            cjk += 1;
            if in_run {
                runs += 1;
                in_run = false;
            }
        } else if ch.is_whitespace() {
            if in_run {
                runs += 1;
                in_run = false;
            }
        } else if ch.is_alphanumeric() {
            in_run = true;
        }
    }

    if in_run {
        runs += 1;
    }

    cjk + runs
}

/// CJK Unified Ideographs, Extensions A-D and the Compatibility block.
pub fn is_cjk(ch: char) -> bool {
    matches!(ch as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2B73F
        | 0x2B740..=0x2B81F
    )
}

#[cfg(test)]
mod tests {
    use super::{count_words, is_cjk};

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
    }

    #[test]
    fn latin_words_split_on_whitespace() {
        assert_eq!(count_words("Hello world"), 2);
        assert_eq!(count_words("  Hello\n\nworld  again "), 3);
    }

    #[test]
    fn each_ideograph_is_a_word() {
        assert_eq!(count_words("中文内容测试"), 6);
    }

    #[test]
    fn mixed_script_interleaves_both_rules() {
        assert_eq!(count_words("Swift并发编程为iOS开发"), 9);
    }

    #[test]
    fn markdown_punctuation_is_not_a_word() {
        assert_eq!(count_words("# Title"), 1);
        assert_eq!(count_words("- item **bold** *"), 2);
        assert_eq!(count_words("--- ### ***"), 0);
    }

    #[test]
    fn punctuation_inside_a_run_does_not_split_it() {
        assert_eq!(count_words("don't re-use"), 2);
    }

    #[test]
    fn cjk_ranges_cover_extensions() {
        assert!(is_cjk('\u{3400}'));
        assert!(is_cjk('\u{FA00}'));
        assert!(is_cjk('\u{20000}'));
        assert!(is_cjk('\u{2B740}'));
        assert!(!is_cjk('a'));
        assert!(!is_cjk('あ'));
    }

    #[test]
    fn numeric_symbols_count_like_letters() {
        assert_eq!(count_words("E = mc²"), 2);
        assert_eq!(count_words("½ cup"), 2);
        assert_eq!(count_words("Chapter Ⅻ"), 2);
    }
}
