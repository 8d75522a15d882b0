#![forbid(unsafe_code)]

#[cfg(feature = "widgets")]
#[test]
fn prelude_binds_a_date_field() {
    use chrono::{NaiveDate, NaiveTime};
    use fform::prelude::*;

    let schema = Schema::builder("Booking")
        .mandatory("check_in", ValueType::DateTime)
        .build();
    let booking = Record::new(schema);

    let config = BindingConfig::default();
    let field = DateField::with_config(&config, &FixedLocale::new("fr-FR"));
    let binding = FieldBinding::new(field, &config);
    binding
        .bind(&booking, &AttributePath::parse("check_in").unwrap())
        .unwrap();

    binding.edit(|field| {
        field.set_date(NaiveDate::from_ymd_opt(2024, 3, 5));
        field.set_time(NaiveTime::from_hms_opt(14, 30, 0));
    });

    assert_eq!(
        booking.get("check_in").unwrap().to_string(),
        "2024-03-05 14:30:00"
    );
    assert_eq!(binding.validate(), Ok(()));
}
