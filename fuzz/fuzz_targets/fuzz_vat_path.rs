#![no_main]

use libfuzzer_sys::fuzz_target;
use vies_gateway::core::ValidationRequest;

fuzz_target!(|data: &[u8]| {
    if let Ok(path) = std::str::from_utf8(data) {
        if let Ok(request) = ValidationRequest::from_path(path) {
            assert!(!request.country_code().is_empty());
            assert!(!request.vat_number().is_empty());
            assert!(path.trim_end_matches('/').split('/').nth(2).is_none());
        }
    }
});
