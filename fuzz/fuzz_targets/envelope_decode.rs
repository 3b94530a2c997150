#![no_main]

use deckbridge_proto::{Envelope, Payload};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(envelope) = Envelope::decode(text) else {
        return;
    };

    // Whatever decodes must encode again
    assert!(envelope.encode().is_ok());

    if let Ok(payload) = Payload::from_envelope(envelope) {
        let kind = payload.message_type();
        let encoded = payload.into_envelope().expect("typed payload encodes");
        assert_eq!(encoded.message_type(), Some(kind));
    }
});
