//! Built-in sample datasets.
//!
//! Three synthetic datasets for trying the pipeline without a file: a year
//! of daily sales with weekend and seasonal effects, a business-day stock
//! price random walk, and daily weather with seasonal temperature and
//! correlated humidity. Generation is seeded, so every call produces the
//! same frame.

use chrono::{Datelike, NaiveDate, Weekday};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;

const SEED: u64 = 42;
const EPOCH: i32 = 719_163; // days from CE to 1970-01-01

/// Which sample dataset to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDataset {
    Sales,
    Stock,
    Weather,
}

impl SampleDataset {
    pub fn generate(self) -> Result<DataFrame> {
        match self {
            Self::Sales => sales_data(),
            Self::Stock => stock_data(),
            Self::Weather => weather_data(),
        }
    }
}

impl std::str::FromStr for SampleDataset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sales" => Ok(Self::Sales),
            "stock" => Ok(Self::Stock),
            "weather" => Ok(Self::Weather),
            other => Err(format!(
                "unknown sample dataset '{}' (expected sales, stock, or weather)",
                other
            )),
        }
    }
}

/// Standard normal via Box-Muller.
fn normal(rng: &mut StdRng, mean: f64, std: f64) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.r#gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    mean + std * z
}

fn exponential(rng: &mut StdRng, mean: f64) -> f64 {
    let u: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    -mean * u.ln()
}

/// Gamma with integer shape as a sum of exponentials.
fn gamma(rng: &mut StdRng, shape: u32, scale: f64) -> f64 {
    (0..shape).map(|_| exponential(rng, scale)).sum()
}

fn days_of_2023() -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    start.iter_days().take_while(|d| *d <= end).collect()
}

fn date_column(name: &str, dates: &[NaiveDate]) -> PolarsResult<Series> {
    let days: Vec<i32> = dates.iter().map(|d| d.num_days_from_ce() - EPOCH).collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

/// Daily sales for 2023 with weekend, month-start, and seasonal lifts.
fn sales_data() -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let dates = days_of_2023();

    let mut sales = Vec::with_capacity(dates.len());
    let mut product_a = Vec::with_capacity(dates.len());
    let mut product_b = Vec::with_capacity(dates.len());
    let mut product_c = Vec::with_capacity(dates.len());

    for date in &dates {
        let mut s = normal(&mut rng, 1000.0, 200.0);
        let mut a = normal(&mut rng, 500.0, 100.0);
        let mut b = normal(&mut rng, 300.0, 80.0);
        let mut c = normal(&mut rng, 200.0, 50.0);

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            s *= 1.5;
            a *= 1.3;
            b *= 1.7;
            c *= 1.4;
        }
        if date.day() <= 5 {
            s *= 1.2;
        }
        match date.month() {
            6..=8 => {
                s *= 1.1;
                a *= 1.3;
            }
            11 | 12 | 1 => {
                s *= 1.2;
                b *= 1.4;
            }
            _ => {}
        }

        sales.push(s);
        product_a.push(a);
        product_b.push(b);
        product_c.push(c);
    }

    Ok(DataFrame::new(vec![
        date_column("date", &dates)?.into(),
        Series::new("sales".into(), sales).into(),
        Series::new("product_a".into(), product_a).into(),
        Series::new("product_b".into(), product_b).into(),
        Series::new("product_c".into(), product_c).into(),
    ])?)
}

/// Business-day OHLCV random walk for 2023.
fn stock_data() -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let dates: Vec<NaiveDate> = days_of_2023()
        .into_iter()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect();

    let mut close = Vec::with_capacity(dates.len());
    let mut price = 1000.0;
    for _ in &dates {
        price *= 1.0 + normal(&mut rng, 0.0005, 0.015);
        close.push(price);
    }

    let volume: Vec<f64> = (0..dates.len())
        .map(|_| normal(&mut rng, 1_000_000.0, 200_000.0))
        .collect();
    let open: Vec<f64> = close
        .iter()
        .map(|p| p * normal(&mut rng, 0.995, 0.002))
        .collect();

    // Highs above and lows below the open/close envelope
    let mut high = Vec::with_capacity(dates.len());
    let mut low = Vec::with_capacity(dates.len());
    for (o, c) in open.iter().zip(&close) {
        high.push(o.max(*c) * rng.gen_range(1.001..1.015));
        low.push(o.min(*c) * rng.gen_range(0.985..0.999));
    }

    Ok(DataFrame::new(vec![
        date_column("date", &dates)?.into(),
        Series::new("open".into(), open).into(),
        Series::new("high".into(), high).into(),
        Series::new("low".into(), low).into(),
        Series::new("close".into(), close).into(),
        Series::new("volume".into(), volume).into(),
    ])?)
}

/// Daily weather for 2023: seasonal temperature, inversely correlated
/// humidity, intermittent rain, gamma-distributed wind.
fn weather_data() -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let dates = days_of_2023();

    let temp_base = 15.0;
    let temp_amplitude = 10.0;

    let mut temperature = Vec::with_capacity(dates.len());
    let mut humidity = Vec::with_capacity(dates.len());
    let mut precipitation = Vec::with_capacity(dates.len());
    let mut wind_speed = Vec::with_capacity(dates.len());

    for date in &dates {
        let year_progress = date.ordinal() as f64 / 365.25;
        let seasonal = temp_amplitude * (std::f64::consts::TAU * (year_progress - 0.25)).sin();
        temperature.push(temp_base + seasonal + normal(&mut rng, 0.0, 2.0));

        let hum = (70.0 - seasonal + normal(&mut rng, 0.0, 5.0)).clamp(10.0, 100.0);
        humidity.push(hum);

        let rain_prob = hum / 100.0;
        let rain = if rng.r#gen::<f64>() < rain_prob * 0.3 {
            exponential(&mut rng, 5.0)
        } else {
            0.0
        };
        precipitation.push(rain);

        wind_speed.push(gamma(&mut rng, 2, 1.5));
    }

    Ok(DataFrame::new(vec![
        date_column("date", &dates)?.into(),
        Series::new("temperature".into(), temperature).into(),
        Series::new("humidity".into(), humidity).into(),
        Series::new("precipitation".into(), precipitation).into(),
        Series::new("wind_speed".into(), wind_speed).into(),
    ])?)
}
