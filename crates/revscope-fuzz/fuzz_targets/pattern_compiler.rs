#![no_main]
use libfuzzer_sys::fuzz_target;
use revscope_core::patterns::{compile_patterns, revs_for_matched_repo, union_regexps};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte = dotcom mode, rest split by newlines into patterns and a final repo name
    let dotcom_mode = data[0] & 1 == 1;

    if let Ok(s) = std::str::from_utf8(&data[1..]) {
        let mut lines: Vec<&str> = s.lines().collect();
        let Some(repo) = lines.pop() else {
            return;
        };
        if lines.len() > 16 {
            return;
        }

        if let Ok(compiled) = compile_patterns(&lines, dotcom_mode) {
            assert_eq!(compiled.include_patterns.len(), lines.len());
            let _ = revs_for_matched_repo(repo, &compiled.pattern_revs);
            let _ = regex::Regex::new(&union_regexps(&compiled.include_patterns));
        }
    }
});
