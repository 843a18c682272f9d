//! Property tests for baseline tracking.

use proptest::prelude::*;
use serde_json::{Value, json};
use valueobjects::{
    ColumnStore, ColumnValue, DeclaresValueObjects, LifecycleEvent, RecordColumns, Result,
    SlotDecl, SlotRegistry, Synchronizer, ValueObject, value_object,
};

value_object! {
    pub struct Measurement {
        label: String,
        reading: i64,
        tags: Vec<String>,
    }
}

struct Sensor;

impl DeclaresValueObjects for Sensor {
    fn value_objects() -> Result<SlotRegistry> {
        SlotRegistry::builder()
            .slot(SlotDecl::of::<Measurement>("measurement"))
            .build()
    }
}

fn arb_label() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _\"\\\\]{0,24}"
}

fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,8}", 0..4)
}

proptest! {
    #[test]
    fn only_modified_fields_are_dirty(
        label in arb_label(),
        reading in any::<i64>(),
        tags in arb_tags(),
        delta in 1i64..1000,
    ) {
        let mut measurement = Measurement::new();
        measurement.set_label(label).unwrap();
        measurement.set_reading(reading).unwrap();
        measurement.set_tags(tags).unwrap();
        measurement.snapshot_current();
        prop_assert!(!measurement.is_dirty());

        let changed = reading.wrapping_add(delta);
        measurement.set_reading(changed).unwrap();
        prop_assert_eq!(
            Value::Object(measurement.dirty_fields(None)),
            json!({ "reading": changed })
        );
        prop_assert!(!measurement.is_field_changed("label", true));
    }

    #[test]
    fn numeric_strings_are_loosely_unchanged(reading in -1_000_000i64..1_000_000) {
        let mut measurement = Measurement::new();
        measurement.set_reading(reading).unwrap();
        measurement.snapshot_current();
        measurement.assign_json(&json!({ "reading": reading.to_string() }));

        prop_assert!(measurement.is_field_changed("reading", true));
        prop_assert!(!measurement.is_field_changed("reading", false));
    }

    #[test]
    fn written_columns_hydrate_clean(
        label in arb_label(),
        reading in any::<i64>(),
        tags in arb_tags(),
    ) {
        let mut writer_columns = ColumnStore::new_record();
        let mut writer = Synchronizer::for_record::<Sensor>().unwrap();
        writer.dispatch(LifecycleEvent::Init, &mut writer_columns).unwrap();
        {
            let measurement = writer.slot_as_mut::<Measurement>("measurement").unwrap();
            measurement.set_label(label.clone()).unwrap();
            measurement.set_reading(reading).unwrap();
            measurement.set_tags(tags.clone()).unwrap();
        }
        writer.dispatch(LifecycleEvent::BeforeInsert, &mut writer_columns).unwrap();
        let stored = writer_columns.column("measurement");
        prop_assert!(stored.as_text().is_some());

        let mut reader_columns = ColumnStore::new_record();
        let mut reader = Synchronizer::for_record::<Sensor>().unwrap();
        reader.dispatch(LifecycleEvent::Init, &mut reader_columns).unwrap();
        let mut reader_columns = ColumnStore::loaded([("measurement", stored)]);
        reader.dispatch(LifecycleEvent::AfterLoad, &mut reader_columns).unwrap();

        let measurement = reader.slot_as::<Measurement>("measurement").unwrap();
        prop_assert_eq!(measurement.label().unwrap(), label);
        prop_assert_eq!(measurement.reading().unwrap(), reading);
        prop_assert_eq!(measurement.tags().unwrap(), tags);
        prop_assert!(!reader.is_dirty());
        prop_assert!(matches!(
            reader_columns.column("measurement"),
            ColumnValue::Structured(_)
        ));
    }
}
