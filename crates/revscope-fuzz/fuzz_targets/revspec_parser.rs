#![no_main]
use libfuzzer_sys::fuzz_target;
use revscope_core::patterns::parse_repository_revisions;
use revscope_core::RevisionSpecifier;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let (name, revs) = parse_repository_revisions(s);
        assert!(!name.contains('@'));
        assert!(s.starts_with(name));

        for rev in &revs {
            // Every parsed part displays back to syntax that parses the same way.
            let text = rev.to_string();
            assert!(!text.contains(':'));
            assert_eq!(&RevisionSpecifier::parse(&text), rev);
        }
    }
});
