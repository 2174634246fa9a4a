use chrono::NaiveDate;
use fraudlens_data::{
    derive::FieldDeriver,
    record::{DerivedRecord, RawRecord},
};

pub(crate) fn record(
    id: &str,
    category: &str,
    timestamp: &str,
    label: &str,
    amount: f64,
) -> DerivedRecord {
    let raw = RawRecord {
        id: id.to_owned(),
        timestamp: timestamp.to_owned(),
        amount: amount.to_string(),
        category: category.to_owned(),
        merchant: format!("merchant_{category}"),
        job: "Analyst".to_owned(),
        city: "Springfield".to_owned(),
        state: "IL".to_owned(),
        city_pop: "1000".to_owned(),
        birth_date: "15-06-1980".to_owned(),
        label: label.to_owned(),
        lat: "39.78".to_owned(),
        long: "-89.65".to_owned(),
        merch_lat: "39.9".to_owned(),
        merch_long: "-89.5".to_owned(),
    };
    FieldDeriver::new(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
        .derive(&raw)
        .unwrap()
}
