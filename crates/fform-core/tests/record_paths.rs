#![forbid(unsafe_code)]

//! Integration tests: nested paths, reference swaps, and datasource events.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use fform_core::{
    AttributePath, Datasource, DatasourceEvent, Record, Schema, Value, ValueType, WriteError,
};
use proptest::prelude::*;

fn schemas() -> Arc<Schema> {
    let address = Schema::builder("Address")
        .attribute("city", ValueType::Text)
        .attribute("zip", ValueType::Int)
        .build();
    let customer = Schema::builder("Customer")
        .mandatory("name", ValueType::Text)
        .reference("address", address)
        .build();
    Schema::builder("Order")
        .attribute("quantity", ValueType::Int)
        .reference("customer", customer)
        .build()
}

fn path(s: &str) -> AttributePath {
    AttributePath::parse(s).unwrap()
}

fn order_with_address() -> (Record, Record, Record) {
    let order_schema = schemas();
    let customer_schema = order_schema
        .describe_reference(&path("customer"))
        .unwrap();
    let address_schema = order_schema
        .describe_reference(&path("customer.address"))
        .unwrap();
    let order = Record::new(order_schema);
    let customer = Record::new(customer_schema);
    let address = Record::new(address_schema);
    order
        .set_reference(&path("customer"), Some(customer.clone()))
        .unwrap();
    order
        .set_reference(&path("customer.address"), Some(address.clone()))
        .unwrap();
    (order, customer, address)
}

#[test]
fn three_level_write_lands_in_leaf_record() {
    let (order, customer, address) = order_with_address();
    order.set("customer.address.city", "Tromsø").unwrap();
    assert_eq!(address.get("city").unwrap(), Value::from("Tromsø"));
    assert_eq!(customer.get("address.city").unwrap(), Value::from("Tromsø"));
}

#[test]
fn reference_reads_through_the_chain() {
    let (order, _customer, address) = order_with_address();
    let found = order.reference(&path("customer.address")).unwrap();
    assert_eq!(found, Some(address));
}

#[test]
fn deep_reference_swap_notifies_root_path_subscribers() {
    let (order, _customer, address) = order_with_address();
    address.set("city", "Oslo").unwrap();
    let replacement = Record::new(address.schema().clone());
    replacement.set("city", "Bergen").unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let s = Rc::clone(&seen);
    let _sub = order.on_change(path("customer.address.city"), move |prev, new| {
        s.borrow_mut().push((prev.clone(), new.clone()));
    });

    order
        .set_reference(&path("customer.address"), Some(replacement))
        .unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![(Value::from("Oslo"), Value::from("Bergen"))]
    );
}

#[test]
fn unknown_path_is_reported_not_swallowed() {
    let (order, _, _) = order_with_address();
    let err = order.set("customer.phone", "123").unwrap_err();
    assert!(matches!(err, WriteError::Path(_)));
    assert!(order.get("nope").is_err());
}

#[test]
fn datasource_forwards_nested_writes_of_current_item() {
    let (order, _, _) = order_with_address();
    let ds = Datasource::new(order.schema().clone());
    ds.set_item(Some(order.clone())).unwrap();

    let paths = Rc::new(RefCell::new(Vec::new()));
    let p = Rc::clone(&paths);
    let _sub = ds.subscribe(move |event| {
        if let DatasourceEvent::ValueChanged(change) = event {
            p.borrow_mut().push(change.path.to_string());
        }
    });

    order.set("customer.address.zip", 9008_i64).unwrap();
    assert_eq!(*paths.borrow(), vec!["customer.address.zip".to_string()]);
}

proptest! {
    #[test]
    fn write_then_resolve_round_trips(quantity in any::<i64>(), city in "[a-zA-Z ]{0,16}") {
        let (order, _, _) = order_with_address();
        order.set("quantity", quantity).unwrap();
        order.set("customer.address.city", city.as_str()).unwrap();
        prop_assert_eq!(order.get("quantity").unwrap(), Value::Int(quantity));
        prop_assert_eq!(order.get("customer.address.city").unwrap(), Value::from(city));
    }

    #[test]
    fn parsed_paths_display_canonically(segments in prop::collection::vec("[a-z_]{1,8}", 1..5)) {
        let text = segments.join(".");
        let parsed = AttributePath::parse(&text).unwrap();
        prop_assert_eq!(parsed.to_string(), text);
        prop_assert_eq!(parsed.len(), segments.len());
    }
}
