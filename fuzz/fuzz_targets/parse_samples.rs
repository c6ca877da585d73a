#![no_main]

use libfuzzer_sys::fuzz_target;
use perfrank_app::{SampleSelector, resolve_sample};
use perfrank_types::SampleSource;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = serde_json::from_slice::<SampleSource>(data) {
        let _ = resolve_sample(
            source.clone(),
            &SampleSelector {
                run_id: None,
                action: Some("get".into()),
            },
        );
        let _ = resolve_sample(source, &SampleSelector::default());
    }
});
