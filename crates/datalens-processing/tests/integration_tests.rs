//! End-to-end tests for the preprocessing pipeline.

use datalens_processing::config::{
    DateComponent, DerivedFeature, EncodingMethod, MissingMethod, OutlierMethod, ScalingMethod,
    TextFeature,
};
use datalens_processing::{
    Pipeline, ProcessingReport, SampleDataset, Stage, TransformConfig, profile_dataset,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;

fn customer_frame() -> DataFrame {
    df! {
        "age" => [Some(25.0), None, Some(35.0), Some(45.0), Some(30.0)],
        "income" => [50_000.0, 60_000.0, 55_000.0, 1_000_000.0, 58_000.0],
        "color" => ["red", "blue", "red", "blue", "red"],
        "comment" => [Some("ok"), Some("Need refund now"), None, Some("fine"), Some("ok")],
    }
    .unwrap()
}

#[test]
fn fill_then_scale_bounds() {
    // Missing values are filled before scaling runs, so min-max output
    // has no nulls and stays inside [0, 1].
    let config = TransformConfig::default()
        .with_missing("age", MissingMethod::Mean)
        .with_scaling(ScalingMethod::Minmax, vec!["age".to_string()]);
    let outcome = Pipeline::new(config)
        .unwrap()
        .apply(&customer_frame())
        .unwrap();

    let age = outcome.data.column("age").unwrap();
    assert_eq!(age.null_count(), 0);
    for i in 0..age.len() {
        let v = age.get(i).unwrap().try_extract::<f64>().unwrap();
        assert!((0.0..=1.0).contains(&v), "value {} out of [0, 1]", v);
    }
}

#[test]
fn row_count_invariant() {
    // Only drop-missing and remove-outliers may change the row count.
    let config = TransformConfig::default()
        .with_missing("age", MissingMethod::Median)
        .with_outliers("income", OutlierMethod::Clip)
        .with_scaling(ScalingMethod::Standard, vec![])
        .with_encoding("color", EncodingMethod::Onehot);
    let input = customer_frame();
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();

    assert_eq!(outcome.data.height(), input.height());
}

#[test]
fn outlier_clip_reference_values() {
    let input = df! {
        "x" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
    }
    .unwrap();
    let config = TransformConfig::default().with_outliers("x", OutlierMethod::Clip);
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();

    // Q1 = 2.25, Q3 = 4.75, IQR = 2.5, fences [-1.5, 8.5]
    let x = outcome.data.column("x").unwrap();
    let last = x.get(5).unwrap().try_extract::<f64>().unwrap();
    assert!((last - 8.5).abs() < 1e-12);
    assert_eq!(outcome.data.height(), 6);
}

#[test]
fn outlier_remove_reference_rows() {
    let input = df! {
        "x" => [1.0, 2.0, 3.0, 4.0, 5.0, 100.0],
    }
    .unwrap();
    let config = TransformConfig::default().with_outliers("x", OutlierMethod::Remove);
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();

    assert_eq!(outcome.data.height(), 5);
    assert_eq!(outcome.rows_removed(), 1);
}

#[test]
fn onehot_rows_sum_to_one() {
    let config = TransformConfig::default().with_encoding("color", EncodingMethod::Onehot);
    let outcome = Pipeline::new(config)
        .unwrap()
        .apply(&customer_frame())
        .unwrap();

    assert!(outcome.data.column("color").is_err());
    let red = outcome.data.column("color_red").unwrap();
    let blue = outcome.data.column("color_blue").unwrap();
    for i in 0..outcome.data.height() {
        let sum = red.get(i).unwrap().try_extract::<u32>().unwrap()
            + blue.get(i).unwrap().try_extract::<u32>().unwrap();
        assert_eq!(sum, 1);
    }
}

#[test]
fn weekend_flag_from_dates() {
    // 2024-06-15 is a Saturday, 2024-06-10 a Monday, 2024-06-11 a Tuesday
    let epoch = chrono::NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days: Vec<i32> = [(2024, 6, 15), (2024, 6, 10), (2024, 6, 11)]
        .iter()
        .map(|(y, m, d)| {
            let date = chrono::NaiveDate::from_ymd_opt(*y, *m, *d).unwrap();
            (date - epoch).num_days() as i32
        })
        .collect();
    let dates = Series::new("date".into(), days)
        .cast(&DataType::Date)
        .unwrap();
    let input = DataFrame::new(vec![dates.into()]).unwrap();

    let config = TransformConfig::default().with_features(
        "date",
        vec![DerivedFeature::DatetimeFeatures(vec![
            DateComponent::Weekday,
            DateComponent::IsWeekend,
        ])],
    );
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();

    let get = |name: &str, i: usize| {
        outcome
            .data
            .column(name)
            .unwrap()
            .get(i)
            .unwrap()
            .try_extract::<i32>()
            .unwrap()
    };
    assert_eq!(get("date_is_weekend", 0), 1); // Saturday
    assert_eq!(get("date_is_weekend", 1), 0); // Monday
    assert_eq!(get("date_is_weekend", 2), 0); // Tuesday
    assert_eq!(get("date_weekday", 1), 0); // Monday = 0
}

#[test]
fn binning_on_text_column_is_reported_not_fatal() {
    let config = TransformConfig::default().with_features(
        "color",
        vec![DerivedFeature::Binning {
            n_bins: 3,
            labels: None,
        }],
    );
    let input = customer_frame();
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();

    assert!(!outcome.stage_applied(Stage::FeatureEngineering));
    assert_eq!(outcome.skips().count(), 1);
    assert_eq!(outcome.data.shape(), input.shape());
}

#[test]
fn text_features_and_contains_flag() {
    let config = TransformConfig::default().with_features(
        "comment",
        vec![DerivedFeature::TextFeatures(vec![
            TextFeature::WordCount,
            TextFeature::Contains(vec!["refund".to_string()]),
        ])],
    );
    let outcome = Pipeline::new(config)
        .unwrap()
        .apply(&customer_frame())
        .unwrap();

    let flags = outcome.data.column("comment_contains_refund").unwrap();
    assert_eq!(flags.get(1).unwrap().try_extract::<u32>().unwrap(), 1);
    assert_eq!(flags.get(0).unwrap().try_extract::<u32>().unwrap(), 0);
    assert!(flags.get(2).unwrap().is_null());

    let words = outcome.data.column("comment_word_count").unwrap();
    assert_eq!(words.get(1).unwrap().try_extract::<u32>().unwrap(), 3);
}

#[test]
fn full_pipeline_is_deterministic() {
    let config = TransformConfig::default()
        .with_missing("age", MissingMethod::Mode)
        .with_missing("comment", MissingMethod::Mode)
        .with_outliers("income", OutlierMethod::Remove)
        .with_scaling(ScalingMethod::Robust, vec![])
        .with_encoding("color", EncodingMethod::Label);
    let pipeline = Pipeline::new(config).unwrap();
    let input = customer_frame();

    let first = pipeline.apply(&input).unwrap();
    let second = pipeline.apply(&input).unwrap();
    assert_eq!(first.data, second.data);
    assert_eq!(first.outcomes, second.outcomes);
}

#[test]
fn frontend_json_config_end_to_end() {
    let pipeline = Pipeline::from_json(
        r#"{
            "handle_missing": {"age": "median"},
            "handle_outliers": {"income": "clip"},
            "scaling": {"method": "minmax", "columns": ["income"]},
            "encoding": {"color": "onehot"},
            "drop_columns": ["comment"]
        }"#,
    )
    .unwrap();
    let outcome = pipeline.apply(&customer_frame()).unwrap();

    assert!(outcome.data.column("comment").is_err());
    assert!(outcome.data.column("color_red").is_ok());
    assert_eq!(outcome.data.column("age").unwrap().null_count(), 0);
    assert_eq!(outcome.applied.len(), 5);
}

#[test]
fn unknown_method_is_a_config_error() {
    let err = Pipeline::from_json(r#"{"handle_missing": {"age": "interpolate"}}"#).unwrap_err();
    assert!(err.is_config_error());
}

#[test]
fn sample_dataset_through_pipeline() {
    let data = SampleDataset::Sales.generate().unwrap();
    let config = TransformConfig::default()
        .with_outliers("sales", OutlierMethod::Clip)
        .with_scaling(ScalingMethod::Standard, vec!["sales".to_string()])
        .with_features(
            "date",
            vec![DerivedFeature::DatetimeFeatures(vec![
                DateComponent::Month,
                DateComponent::IsWeekend,
            ])],
        );
    let outcome = Pipeline::new(config).unwrap().apply(&data).unwrap();

    assert_eq!(outcome.data.height(), 365);
    assert!(outcome.data.column("date_month").is_ok());
    assert!(outcome.data.column("date_is_weekend").is_ok());
}

#[test]
fn report_covers_run() {
    let input = customer_frame();
    let config = TransformConfig::default()
        .with_missing("age", MissingMethod::Mean)
        .with_missing("absent", MissingMethod::Zero)
        .with_encoding("color", EncodingMethod::Onehot);
    let before = profile_dataset(&input).unwrap();
    let outcome = Pipeline::new(config).unwrap().apply(&input).unwrap();
    let after = profile_dataset(&outcome.data).unwrap();

    let report = ProcessingReport::build("Run Report", before, after, &outcome);
    let markdown = report.to_markdown();
    assert!(markdown.contains("handle_missing"));
    assert!(markdown.contains("encoding"));
    assert!(markdown.contains("column not present in dataset"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["shape"]["rows_before"], 5);
    assert_eq!(json["before"]["columns"], 4);
}
