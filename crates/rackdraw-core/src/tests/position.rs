use crate::*;

#[test]
fn parse_position_accepts_common_unit_labels() {
    assert_eq!(parse_position("U25").map(UnitIndex::get), Ok(25));
    assert_eq!(parse_position("u07").map(UnitIndex::get), Ok(7));
    assert_eq!(parse_position("RU 3").map(UnitIndex::get), Ok(3));
    assert_eq!(parse_position("Unit-12").map(UnitIndex::get), Ok(12));
    assert_eq!(parse_position("  41 ").map(UnitIndex::get), Ok(41));
}

#[test]
fn parse_position_returns_every_in_range_unit_exactly() {
    for unit in 1..=RACK_UNITS {
        for raw in [format!("U{unit}"), format!("u{unit:02}"), unit.to_string()] {
            assert_eq!(
                parse_position(&raw).map(UnitIndex::get),
                Ok(unit),
                "input {raw:?}"
            );
        }
    }
}

#[test]
fn parse_position_rejects_labels_without_a_unit_number() {
    for raw in ["", "U", "rack-row-3", "row3-left", "top", "U25a", "U 2 5"] {
        assert!(
            matches!(parse_position(raw), Err(PositionError::NoDigits { .. })),
            "input {raw:?}"
        );
    }
}

#[test]
fn parse_position_rejects_out_of_range_units() {
    assert_eq!(
        parse_position("U50"),
        Err(PositionError::OutOfRange {
            raw: "U50".to_string(),
            value: 50
        })
    );
    assert!(matches!(
        parse_position("U0"),
        Err(PositionError::OutOfRange { value: 0, .. })
    ));
    assert!(matches!(
        parse_position("U43"),
        Err(PositionError::OutOfRange { value: 43, .. })
    ));
    assert!(matches!(
        parse_position("U99999999999999999999999"),
        Err(PositionError::OutOfRange { value: u64::MAX, .. })
    ));
}

#[test]
fn unit_index_bounds() {
    assert_eq!(UnitIndex::new(0), None);
    assert_eq!(UnitIndex::new(43), None);
    assert_eq!(UnitIndex::BOTTOM.get(), 1);
    assert_eq!(UnitIndex::TOP.get(), 42);
    assert_eq!(UnitIndex::TOP.to_string(), "U42");
}
