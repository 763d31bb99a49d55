#![no_main]

use libfuzzer_sys::fuzz_target;
use vies_gateway::vat::ViesPayload;

fuzz_target!(|data: &[u8]| {
    // Any upstream body must decode to some payload without panicking.
    let result = ViesPayload::from_body(data).into_result();
    let _ = serde_json::to_string(&result);
});
