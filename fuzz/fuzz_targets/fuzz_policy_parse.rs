#![no_main]
use access_policy::{encode, DataContext, Policy};
use libfuzzer_sys::fuzz_target;

// Arbitrary bytes as a policy document must never panic
fuzz_target!(|input: &[u8]| {
    let Ok(source) = std::str::from_utf8(input) else {
        return;
    };

    let policy = match Policy::from_json(source) {
        Ok(p) => p,
        Err(_) => return,
    };

    let data = DataContext::new().with("id", "42").with("org", "acme");
    if let Ok(encoded) = encode(policy.statements(), &data) {
        assert_eq!(encoded.len(), policy.statements().len());
    }

    let _ = policy.to_json();
});
