mod common;

use proptest::prelude::*;
use rustnav_core::{Decoded, ErrorKind, PacketType, Record, decode_datagram, resolve_packet_type};

use common::{
    BODY_OFFSET, DISCRIMINANT_OFFSET, ORDINAL_CONSOLE_COMMAND, ORDINAL_TICK, console_body,
    game_payload, tick_buttons_body,
};

proptest! {
    #[test]
    fn arbitrary_payloads_never_panic(payload in prop::collection::vec(any::<u8>(), 0..128)) {
        match decode_datagram(&payload) {
            Ok(decoded) => prop_assert_eq!(decoded.packet_type(), resolve_packet_type(&payload)),
            Err(err) => prop_assert!(err.offset() <= payload.len()),
        }
    }

    #[test]
    fn typed_payloads_never_panic(
        ordinal in 1u8..=15,
        body in prop::collection::vec(any::<u8>(), 0..96),
    ) {
        let payload = game_payload(ordinal, &body);
        if let Err(err) = decode_datagram(&payload) {
            prop_assert!(err.offset() >= BODY_OFFSET);
            prop_assert!(err.offset() <= payload.len());
        }
    }

    #[test]
    fn tick_buttons_roundtrip(buttons in any::<u64>()) {
        let payload = game_payload(ORDINAL_TICK, &tick_buttons_body(buttons));
        match decode_datagram(&payload).unwrap() {
            Decoded::Record(Record::Tick(input)) => prop_assert_eq!(input.buttons, buttons),
            other => prop_assert!(false, "unexpected decode result: {:?}", other),
        }
    }

    #[test]
    fn tick_cut_anywhere_is_truncated(buttons in 128u64..=u64::MAX, cut in 1usize..4) {
        let mut payload = game_payload(ORDINAL_TICK, &tick_buttons_body(buttons));
        let keep = payload.len().saturating_sub(cut).max(BODY_OFFSET + 1);
        payload.truncate(keep);
        let err = decode_datagram(&payload).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Truncated);
    }

    #[test]
    fn console_length_outside_limit_is_out_of_range(declared in prop_oneof![i32::MIN..0, 1001..i32::MAX]) {
        let payload = game_payload(ORDINAL_CONSOLE_COMMAND, &console_body(declared, &[b'a'; 16]));
        let err = decode_datagram(&payload).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::OutOfRange);
        prop_assert_eq!(err.offset(), BODY_OFFSET);
    }

    #[test]
    fn discriminants_outside_range_are_invalid(byte in prop_oneof![0u8..=140, 156u8..=255]) {
        let mut payload = vec![0u8; BODY_OFFSET];
        payload[DISCRIMINANT_OFFSET] = byte;
        prop_assert_eq!(
            decode_datagram(&payload).unwrap(),
            Decoded::Unhandled(PacketType::Invalid)
        );
    }
}
