//! Black-box integration test run against the public API the way a
//! host crate would use it — no access to crate-internal items.

use bitrecord::{
    bits_for_enum, data_struct, wire_enum, BitReader, BitWriter, BufBitReader, BufBitWriter,
    CompositeCodec, DataStruct, Role,
};
use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
enum Ability {
    #[default]
    Idle = 0,
    Running = 1,
}
wire_enum!(Ability, u8, 2);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Position {
    x: i16,
    y: i16,
    z: i16,
}

impl CompositeCodec for Position {
    fn write(writer: &mut dyn BitWriter, value: &Self) {
        writer.write_bits(value.x as u16 as u32, 16);
        writer.write_bits(value.y as u16 as u32, 16);
        writer.write_bits(value.z as u16 as u32, 16);
    }

    fn read(reader: &mut dyn BitReader) -> Self {
        Self {
            x: reader.read_bits(16) as u16 as i16,
            y: reader.read_bits(16) as u16 as i16,
            z: reader.read_bits(16) as u16 as i16,
        }
    }
}

data_struct! {
    role Predicted;
    struct PlayerState {
        pub counter: i32 as primitive,
        pub ability: Ability as enum,
        pub position: Position as composite,
    }
}

fn bits_to_string(bytes: &[u8], bit_len: usize) -> String {
    let mut out = String::with_capacity(bit_len);
    for i in 0..bit_len {
        let byte = bytes[i / 8];
        let bit = (byte >> (7 - i % 8)) & 1;
        out.push(if bit == 1 { '1' } else { '0' });
    }
    out
}

#[test]
fn full_serialize_packs_fields_msb_first_with_no_padding() {
    let value = PlayerState {
        counter: -1,
        ability: Ability::Running,
        position: Position { x: 1, y: -2, z: 3 },
    };
    let mut writer = BufBitWriter::new();
    value.serialize_full(&mut writer);
    assert_eq!(writer.bits_written(), 82);

    let mut expected = String::new();
    expected.push_str(&"1".repeat(32)); // 0xFFFFFFFF
    expected.push_str("01"); // Running = 1
    expected.push_str(&format!("{:016b}", 0x0001u16)); // x = 1
    expected.push_str(&format!("{:016b}", 0xFFFEu16)); // y = -2
    expected.push_str(&format!("{:016b}", 0x0003u16)); // z = 3
    assert_eq!(expected.len(), 82);

    let bytes = writer.into_bytes();
    assert_eq!(bits_to_string(&bytes, 82), expected);
}

#[test]
fn mask_serialize_writes_only_the_selected_field() {
    let value = PlayerState {
        counter: 123,
        ability: Ability::Running,
        position: Position { x: 9, y: 9, z: 9 },
    };
    let mut writer = BufBitWriter::new();
    value.serialize_mask(&mut writer, 0b010);
    assert_eq!(writer.bits_written(), 3 + 2);

    let mut target = PlayerState::default();
    let mut reader = BufBitReader::new(writer.as_bytes());
    let mask = target.deserialize_mask_ref(&mut reader);
    assert_eq!(mask, 0b010);
    assert_eq!(target.ability, Ability::Running);
    assert_eq!(target.counter, 0);
    assert_eq!(target.position, Position::default());
}

#[test]
fn diff_reports_only_the_ability_bit() {
    let a = PlayerState {
        counter: 0,
        ability: Ability::Idle,
        position: Position::default(),
    };
    let b = PlayerState {
        counter: 0,
        ability: Ability::Running,
        position: Position::default(),
    };
    assert_eq!(PlayerState::diff(&a, &b), 0b010);
}

data_struct! {
    role Input;
    struct Throttle {
        pub v: u8 as primitive,
    }
}

#[test]
fn single_field_record_has_no_mask_prefix() {
    let value = Throttle { v: 200 };
    let mut writer = BufBitWriter::new();
    value.serialize_mask(&mut writer, 0); // mask is irrelevant for N == 1
    assert_eq!(writer.bits_written(), 8);

    let mut reader = BufBitReader::new(writer.as_bytes());
    let mut target = Throttle::default();
    let mask = target.deserialize_mask_ref(&mut reader);
    assert_eq!(mask, 1);
    assert_eq!(target.v, 200);
}

data_struct! {
    role Ghost;
    struct FiveFields {
        pub a: u8 as primitive,
        pub b: u8 as primitive,
        pub c: u8 as primitive,
        pub d: u8 as primitive,
        pub e: u8 as primitive,
    }
}

#[test]
fn mask_selects_fields_zero_two_and_four() {
    let value = FiveFields {
        a: 10,
        b: 20,
        c: 30,
        d: 40,
        e: 50,
    };
    let mut writer = BufBitWriter::new();
    value.serialize_mask(&mut writer, 0b10101);
    assert_eq!(writer.bits_written(), 5 + 8 * 3);

    let mut target = FiveFields::default();
    let mut reader = BufBitReader::new(writer.as_bytes());
    let mask = target.deserialize_mask_ref(&mut reader);
    assert_eq!(mask, 0b10101);
    assert_eq!(target.a, 10);
    assert_eq!(target.b, 0);
    assert_eq!(target.c, 30);
    assert_eq!(target.d, 0);
    assert_eq!(target.e, 50);
}

data_struct! {
    role Predicted;
    struct Hero {
        pub v: u8 as primitive,
    }
}
data_struct! {
    role Ghost;
    struct Crate {
        pub v: u8 as primitive,
    }
}
data_struct! {
    role Ghost;
    struct Barrel {
        pub v: u8 as primitive,
    }
}
data_struct! {
    role Input;
    struct Steering {
        pub v: u8 as primitive,
    }
}

#[test]
fn type_ids_and_role_buckets_match_discovery_order() {
    use bitrecord::Registry;

    struct NullReceiver;
    impl bitrecord::Receiver for NullReceiver {
        fn receive_new<T: DataStruct>(&mut self, _entity_id: u32, _value: T) {}
        fn update<T: DataStruct>(&mut self, _mask: u32, _entity_id: u32, _value: T) {}
        fn grab_or_create<T: DataStruct>(&mut self, _entity_id: u32) -> T {
            T::default()
        }
        fn destroy_component<T: DataStruct>(&mut self, _entity_id: u32) {}
    }

    let registry = Registry::<NullReceiver>::build(|r| {
        r.register::<Hero>()?;
        r.register::<Crate>()?;
        r.register::<Barrel>()?;
        r.register::<Steering>()?;
        Ok(())
    })
    .unwrap();

    assert_eq!(registry.id_of::<Hero>(), Some(1));
    assert_eq!(registry.id_of::<Crate>(), Some(2));
    assert_eq!(registry.id_of::<Barrel>(), Some(3));
    assert_eq!(registry.id_of::<Steering>(), Some(4));
    assert_eq!(registry.ids_by_role(Role::Predicted), &[1]);
    assert_eq!(registry.ids_by_role(Role::Ghost), &[2, 3]);
    assert_eq!(registry.ids_by_role(Role::Input), &[4]);
}

#[test]
fn enum_width_follows_the_ceiling_log2_table() {
    let cases = [(1, 1), (2, 1), (3, 2), (4, 2), (5, 3), (7, 3), (8, 3), (9, 4)];
    for (variants, width) in cases {
        assert_eq!(bits_for_enum(variants), width, "V={variants}");
    }
}
