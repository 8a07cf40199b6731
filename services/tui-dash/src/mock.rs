// services/tui-dash/src/mock.rs
//
// In-process backend for demo mode

use async_trait::async_trait;
use chrono::{Datelike, Duration as ChronoDuration, Local, Weekday};
use rand::Rng;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use svckit::types::{
    BestModel, DetailValue, ForecastPayload, ForecastPoint, PredictionResults, PredictionSummary,
    ProcessResponse, ProductDetail, ProductShare, ProductSummary, ProductsPayload, ReportPayload,
    UploadResponse,
};
use svckit::{DashError, ForecastBackend};

const DEMO_FILE_ID: &str = "demo-0001";
const NOT_PROCESSED: &str = "Required analysis has not been processed";

const MENU: [(&str, &str, f64); 8] = [
    ("Margherita Pizza", "Main", 12.5),
    ("Pepperoni Pizza", "Main", 14.0),
    ("Caesar Salad", "Starter", 9.0),
    ("Garlic Bread", "Starter", 5.5),
    ("Tiramisu", "Dessert", 7.0),
    ("Lemonade", "Drinks", 3.5),
    ("Lasagna", "Main", 15.5),
    ("Espresso", "Drinks", 2.5),
];

/// Simulates the forecast backend: every call sleeps for `latency` and the
/// first `not_ready_calls` forecast requests answer "not processed".
pub struct DemoBackend {
    latency: Duration,
    not_ready_calls: u32,
    forecast_calls: AtomicU32,
}

impl DemoBackend {
    pub fn new(latency: Duration, not_ready_calls: u32) -> Self {
        Self {
            latency,
            not_ready_calls,
            forecast_calls: AtomicU32::new(0),
        }
    }

    pub fn forecast_calls(&self) -> u32 {
        self.forecast_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            let jitter = rand::thread_rng().gen_range(0..=self.latency.as_millis() as u64 / 4);
            tokio::time::sleep(self.latency + Duration::from_millis(jitter)).await;
        }
    }

    fn generate_forecast() -> ForecastPayload {
        let mut rng = rand::thread_rng();
        let today = Local::now().date_naive();
        let mut level: f64 = 420.0;
        let mut chart_data = Vec::with_capacity(44);

        for offset in -30i64..14 {
            level = (level + rng.gen_range(-25.0..30.0)).max(150.0);
            let date = today + ChronoDuration::days(offset);
            let weekend = matches!(date.weekday(), Weekday::Fri | Weekday::Sat);
            let predicted = if weekend { level * 1.2 } else { level };
            let spread = predicted * 0.08;
            chart_data.push(ForecastPoint {
                date: date.format("%Y-%m-%d").to_string(),
                actual: (offset < 0).then(|| predicted + rng.gen_range(-spread..spread)),
                predicted,
                lower_bound: Some(predicted - spread),
                upper_bound: Some(predicted + spread),
            });
        }

        let future: Vec<&ForecastPoint> = chart_data.iter().filter(|p| p.actual.is_none()).collect();
        let avg = future.iter().map(|p| p.predicted).sum::<f64>() / future.len().max(1) as f64;
        let max = future.iter().max_by(|a, b| a.predicted.total_cmp(&b.predicted));
        let min = future.iter().min_by(|a, b| a.predicted.total_cmp(&b.predicted));

        let mut model_details = BTreeMap::new();
        model_details.insert("r2_score".to_string(), DetailValue::Number(rng.gen_range(0.78..0.93)));
        model_details.insert("mae".to_string(), DetailValue::Number(rng.gen_range(18.0..35.0)));
        model_details.insert("training_rows".to_string(), DetailValue::Number(480.0));
        model_details.insert("selection".to_string(), DetailValue::Text("lowest validation RMSE".to_string()));

        ForecastPayload {
            chart_data: chart_data.clone(),
            prediction_results: PredictionResults {
                best_model: BestModel {
                    model_type: Some("random_forest".to_string()),
                    accuracy_score: Some(rng.gen_range(0.80..0.92)),
                    extra: BTreeMap::new(),
                },
                all_models: json!([
                    {"model_type": "linear_regression", "r2": 0.74},
                    {"model_type": "decision_tree", "r2": 0.81},
                    {"model_type": "random_forest", "r2": 0.86}
                ]),
                prediction_summary: PredictionSummary {
                    avg_predicted_sales: Some(avg),
                    max_predicted_day: max.map(|p| p.date.clone()),
                    max_predicted_value: max.map(|p| p.predicted),
                    min_predicted_day: min.map(|p| p.date.clone()),
                    min_predicted_value: min.map(|p| p.predicted),
                    trend: Some(if level > 420.0 { "increasing" } else { "decreasing" }.to_string()),
                    trend_percentage: Some((level - 420.0) / 420.0 * 100.0),
                    extra: BTreeMap::new(),
                },
            },
            model_details,
        }
    }

    fn generate_products() -> ProductsPayload {
        let mut rng = rand::thread_rng();
        let mut details: Vec<ProductDetail> = MENU
            .iter()
            .map(|(name, category, price)| {
                let quantity = rng.gen_range(40..400u64);
                ProductDetail {
                    name: name.to_string(),
                    category: category.to_string(),
                    revenue: quantity as f64 * price,
                    quantity,
                    percentage: 0.0,
                }
            })
            .collect();
        details.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));

        let total: f64 = details.iter().map(|d| d.revenue).sum();
        for detail in details.iter_mut() {
            detail.percentage = detail.revenue / total * 100.0;
        }

        let top = &details[..5];
        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        for detail in &details {
            *by_category.entry(detail.category.as_str()).or_default() += detail.percentage;
        }
        let (top_category, top_category_percentage) = by_category
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(c, p)| (c.to_string(), *p))
            .unwrap_or_default();

        ProductsPayload {
            chart_data: top
                .iter()
                .map(|d| ProductShare {
                    name: d.name.clone(),
                    value: d.revenue,
                    percent: d.percentage,
                })
                .collect(),
            summary: ProductSummary {
                total_products: details.len() as u64,
                top_five_percentage: top.iter().map(|d| d.percentage).sum(),
                top_category,
                top_category_percentage,
                highest_margin_product: "Lemonade".to_string(),
            },
            product_details: details,
        }
    }

    fn generate_report() -> ReportPayload {
        ReportPayload {
            summary: "Sales held steady over the last month with a clear weekend lift. \
                      Pizzas continue to drive most of the revenue."
                .to_string(),
            insights: vec![
                "Friday and Saturday revenue runs about 20% above weekdays.".to_string(),
                "The top five products account for most of total revenue.".to_string(),
                "Drinks sell in volume but contribute little revenue.".to_string(),
            ],
            recommendations: vec![
                "Staff up for Friday and Saturday evenings.".to_string(),
                "Bundle drinks with mains to lift average ticket size.".to_string(),
            ],
            future_outlook: "The next two weeks are forecast to track the recent trend, \
                             with weekend peaks remaining the main driver."
                .to_string(),
        }
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new(Duration::from_millis(400), 2)
    }
}

#[async_trait]
impl ForecastBackend for DemoBackend {
    async fn upload(&self, path: &Path) -> Result<UploadResponse, DashError> {
        self.simulate_latency().await;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(UploadResponse {
            file_id: DEMO_FILE_ID.to_string(),
            filename,
            status: "uploaded".to_string(),
        })
    }

    async fn process(&self, file_id: &str) -> Result<ProcessResponse, DashError> {
        self.simulate_latency().await;
        Ok(ProcessResponse {
            file_id: file_id.to_string(),
            status: "processed".to_string(),
            rows_processed: 480,
            features_created: 12,
        })
    }

    async fn forecast(&self, _file_id: &str) -> Result<ForecastPayload, DashError> {
        self.simulate_latency().await;
        let call = self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        if call < self.not_ready_calls {
            return Err(DashError::Api {
                status: StatusCode::BAD_REQUEST,
                detail: Some(NOT_PROCESSED.to_string()),
                code: None,
            });
        }
        Ok(Self::generate_forecast())
    }

    async fn top_products(&self, _file_id: &str) -> Result<ProductsPayload, DashError> {
        self.simulate_latency().await;
        Ok(Self::generate_products())
    }

    async fn generate_report(&self, _file_id: &str) -> Result<ReportPayload, DashError> {
        self.simulate_latency().await;
        Ok(Self::generate_report())
    }

    fn name(&self) -> &str {
        "demo"
    }
}
