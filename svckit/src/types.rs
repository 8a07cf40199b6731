use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Response from `POST /upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub file_id: String,
    pub filename: String,
    pub status: String,
}

/// Response from `GET /process/{file_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub file_id: String,
    pub status: String,
    #[serde(default)]
    pub rows_processed: u64,
    #[serde(default)]
    pub features_created: u64,
}

// Forecast

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub chart_data: Vec<ForecastPoint>,
    #[serde(default)]
    pub prediction_results: PredictionResults,
    #[serde(default)]
    pub model_details: BTreeMap<String, DetailValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    #[serde(default)]
    pub actual: Option<f64>,
    pub predicted: f64,
    #[serde(default)]
    pub lower_bound: Option<f64>,
    #[serde(default)]
    pub upper_bound: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResults {
    #[serde(default)]
    pub best_model: BestModel,
    #[serde(default)]
    pub all_models: Value,
    #[serde(default)]
    pub prediction_summary: PredictionSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestModel {
    #[serde(default)]
    pub model_type: Option<String>,
    #[serde(default)]
    pub accuracy_score: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BestModel {
    /// `linear_regression` -> `linear regression`
    pub fn display_name(&self) -> String {
        self.model_type
            .as_deref()
            .map(|name| name.replace('_', " "))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    #[serde(default)]
    pub avg_predicted_sales: Option<f64>,
    #[serde(default)]
    pub max_predicted_day: Option<String>,
    #[serde(default)]
    pub max_predicted_value: Option<f64>,
    #[serde(default)]
    pub min_predicted_day: Option<String>,
    #[serde(default)]
    pub min_predicted_value: Option<f64>,
    #[serde(default)]
    pub trend: Option<String>,
    #[serde(default)]
    pub trend_percentage: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A `model_details` value: the backend mixes numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for DetailValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetailValue::Number(n) => write!(f, "{:.2}", n),
            DetailValue::Text(s) => f.write_str(s),
        }
    }
}

/// Counts computed with pandas come back as floats (`10.0`); accept any
/// JSON number that holds a non-negative whole value.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Ok(value as u64)
    } else {
        Err(de::Error::invalid_value(
            de::Unexpected::Float(value),
            &"a non-negative whole number",
        ))
    }
}

// Products

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductsPayload {
    #[serde(default)]
    pub chart_data: Vec<ProductShare>,
    #[serde(default)]
    pub summary: ProductSummary,
    /// Rank order as returned by the backend.
    #[serde(default)]
    pub product_details: Vec<ProductDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductShare {
    pub name: String,
    pub value: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    #[serde(default, deserialize_with = "whole_number")]
    pub total_products: u64,
    #[serde(default)]
    pub top_five_percentage: f64,
    #[serde(default)]
    pub top_category: String,
    #[serde(default)]
    pub top_category_percentage: f64,
    #[serde(default)]
    pub highest_margin_product: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub name: String,
    pub category: String,
    pub revenue: f64,
    #[serde(deserialize_with = "whole_number")]
    pub quantity: u64,
    pub percentage: f64,
}

// Report

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub future_outlook: String,
}

/// Body of `POST /report/{file_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report: ReportPayload,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiErrorBody {
    /// FastAPI validation errors carry a list under `detail`; only a plain
    /// string is treated as a user-facing message.
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forecast_payload_decodes_mixed_model_details() {
        let body = json!({
            "chart_data": [
                {"date": "2024-01-01", "actual": 120.5, "predicted": 118.0},
                {"date": "2024-01-02", "predicted": 130.0, "lower_bound": 110.0, "upper_bound": 150.0}
            ],
            "prediction_results": {
                "best_model": {"model_type": "linear_regression", "accuracy_score": 0.91, "r2": 0.88},
                "all_models": [{"model_type": "svm"}],
                "prediction_summary": {"avg_predicted_sales": 124.0, "trend": "increasing"}
            },
            "model_details": {"n_features": 12, "algorithm": "OLS"}
        });

        let payload: ForecastPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.chart_data.len(), 2);
        assert_eq!(payload.chart_data[0].actual, Some(120.5));
        assert_eq!(payload.chart_data[1].actual, None);
        assert_eq!(payload.prediction_results.best_model.display_name(), "linear regression");
        assert!(payload.prediction_results.best_model.extra.contains_key("r2"));
        assert_eq!(payload.model_details["n_features"], DetailValue::Number(12.0));
        assert_eq!(payload.model_details["algorithm"], DetailValue::Text("OLS".to_string()));
    }

    #[test]
    fn test_products_payload_keeps_rank_order() {
        let body = json!({
            "chart_data": [],
            "summary": {
                "total_products": 3,
                "top_five_percentage": 100.0,
                "top_category": "Main",
                "top_category_percentage": 70.0,
                "highest_margin_product": "Pizza"
            },
            "product_details": [
                {"name": "Burger", "category": "Main", "revenue": 50.0, "quantity": 5, "percentage": 20.0},
                {"name": "Pizza", "category": "Main", "revenue": 200.0, "quantity": 10, "percentage": 80.0}
            ]
        });

        let payload: ProductsPayload = serde_json::from_value(body).unwrap();
        let names: Vec<_> = payload.product_details.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Burger", "Pizza"]);
    }

    #[test]
    fn test_error_body_detail_text() {
        let body: ApiErrorBody = serde_json::from_value(json!({"detail": "File not found"})).unwrap();
        assert_eq!(body.detail_text().as_deref(), Some("File not found"));

        let body: ApiErrorBody = serde_json::from_value(json!({"detail": [{"loc": ["path"]}]})).unwrap();
        assert_eq!(body.detail_text(), None);
    }

    #[test]
    fn test_float_counts_decode_as_integers() {
        let payload: ProductsPayload = serde_json::from_value(serde_json::json!({
            "chart_data": [],
            "summary": {"total_products": 12.0, "top_five_percentage": 71.5},
            "product_details": [
                {"name": "Pizza", "category": "Main", "revenue": 123.4, "quantity": 10.0, "percentage": 12.345},
                {"name": "Soda", "category": "Drinks", "revenue": 20.0, "quantity": 8, "percentage": 2.0}
            ]
        }))
        .unwrap();

        assert_eq!(payload.summary.total_products, 12);
        assert_eq!(payload.product_details[0].quantity, 10);
        assert_eq!(payload.product_details[1].quantity, 8);
        assert!(crate::export::csv::products_csv(&payload.product_details).contains(",123.40,10,12.35\n"));

        let fractional = serde_json::json!({"name": "Pizza", "category": "Main", "revenue": 1.0, "quantity": 2.5, "percentage": 1.0});
        assert!(serde_json::from_value::<ProductDetail>(fractional).is_err());
        let negative = serde_json::json!({"name": "Pizza", "category": "Main", "revenue": 1.0, "quantity": -3, "percentage": 1.0});
        assert!(serde_json::from_value::<ProductDetail>(negative).is_err());
    }
}
