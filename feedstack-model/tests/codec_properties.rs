//! Property-based tests for the document codec.
//!
//! Any entity built from scalars, empties, groups and repeated groups must
//! survive encode then decode with structure and property order intact.

use feedstack_model::{decode, decode_fragment, encode, encode_fragment, Entity, PropertyValue};
use proptest::prelude::*;

// Empty groups decode as Empty, so the generators never produce them.
fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9<>&\"' \\]]{0,12}"
}

fn value() -> impl Strategy<Value = PropertyValue> {
    let leaf = prop_oneof![
        3 => text().prop_map(PropertyValue::Scalar),
        1 => Just(PropertyValue::Empty),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(("[a-f]", inner.clone()), 1..4)
                .prop_map(|pairs| PropertyValue::Group(pairs.into_iter().collect())),
            prop::collection::vec(inner, 1..4).prop_map(|items| {
                PropertyValue::Repeated(
                    items
                        .into_iter()
                        .flat_map(|item| match item {
                            PropertyValue::Repeated(nested) => nested,
                            other => vec![other],
                        })
                        .collect(),
                )
            }),
        ]
    })
}

fn entity() -> impl Strategy<Value = Entity> {
    prop::collection::vec(("[a-f]{1,3}", value()), 0..6).prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #[test]
    fn decode_inverts_encode(e in entity()) {
        prop_assert_eq!(decode(&encode(&e)).unwrap(), e);
    }

    #[test]
    fn fragment_decode_inverts_fragment_encode(e in entity()) {
        prop_assert_eq!(decode_fragment(&encode_fragment(&e)).unwrap(), e);
    }

    #[test]
    fn decoded_order_matches_encoded_order(e in entity()) {
        let decoded = decode(&encode(&e)).unwrap();
        let expected: Vec<&str> = e.names().collect();
        let actual: Vec<&str> = decoded.names().collect();
        prop_assert_eq!(actual, expected);
    }
}
