//! HTTP request handlers
//!
//! Pages are embedded HTML in a single dark theme; the results page feeds
//! chart specs straight into Plotly. The JSON API mirrors the page flow for
//! programmatic callers.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use polars::prelude::*;
use tracing::info;

use crate::error::FraudShieldError;
use crate::scoring::{self, Analysis, RiskLevel};
use crate::store::ResultArtifact;

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Page Handlers
// ============================================================================

/// Serve the landing page
pub async fn landing() -> Html<String> {
    // Embedded HTML for portability
    Html(LANDING_HTML.to_string())
}

/// Serve the upload form
pub async fn analyze_page() -> Html<String> {
    Html(ANALYZE_HTML.to_string())
}

/// Handle an upload, run the pipeline and render the results page.
///
/// Errors render as an HTML error page with the matching status code so the
/// browser flow never dead-ends in raw JSON.
pub async fn predict(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    match analyze_upload(&state, &mut multipart).await {
        Ok(completed) => render_results_page(&completed).into_response(),
        Err(err) => error_page(&err),
    }
}

/// One-time retrieval of a scored CSV.
pub async fn download(State(state): State<Arc<AppState>>, Path(token): Path<String>) -> Response {
    match state.store.take(&token) {
        Some(artifact) => {
            info!("Download served: {} rows", artifact.rows);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("text/csv")),
                    (
                        header::CONTENT_DISPOSITION,
                        HeaderValue::from_static(
                            "attachment; filename=\"fraud_predictions.csv\"",
                        ),
                    ),
                ],
                artifact.csv,
            )
                .into_response()
        }
        None => error_page(&ServerError::from(FraudShieldError::ExpiredToken)),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// JSON twin of the `/predict` page flow.
pub async fn api_analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let completed = analyze_upload(&state, &mut multipart).await?;
    let analysis = &completed.analysis;

    Ok(Json(serde_json::json!({
        "success": true,
        "analysis_id": completed.id,
        "file": completed.file_name,
        "rows": analysis.metrics.total_transactions,
        "metrics": analysis.metrics,
        "risk_icon": analysis.metrics.risk_level.icon(),
        "validation": analysis.validation,
        "charts": analysis.charts,
        "report": analysis.report,
        "model": analysis.model_name,
        "download_token": completed.token,
    })))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": state.engine.is_some(),
        "model": state.model_name(),
        "pending_results": state.store.len(),
    }))
}

pub async fn get_system_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "system": state.get_system_info(),
        "pipeline": state.metrics.summary(),
        "store": state.store.stats(),
        "uptime_secs": state.uptime_secs(),
    }))
}

// ============================================================================
// Shared Pipeline
// ============================================================================

/// A finished analysis with its download token.
struct CompletedAnalysis {
    id: String,
    file_name: String,
    analysis: Analysis,
    token: String,
}

async fn analyze_upload(
    state: &Arc<AppState>,
    multipart: &mut Multipart,
) -> Result<CompletedAnalysis> {
    let engine = match &state.engine {
        Some(engine) => engine.clone(),
        None => return Err(FraudShieldError::ModelUnavailable.into()),
    };

    let (file_name, data) = read_upload(multipart)
        .await?
        .ok_or(FraudShieldError::MissingUpload)?;
    info!("Received file: {} ({} bytes)", file_name, data.len());

    let df = parse_csv(&data)?;
    let analysis = engine.analyze(&df)?;

    let mut results = analysis.results.clone();
    let csv = scoring::to_csv_bytes(&mut results)?;
    let token = state.store.insert(ResultArtifact {
        csv,
        rows: analysis.metrics.total_transactions,
    });

    let id = AppState::generate_id();
    info!(
        "Analysis {} complete: {} rows, {} flagged, risk {}",
        id,
        analysis.metrics.total_transactions,
        analysis.metrics.fraud_count,
        analysis.metrics.risk_level
    );

    Ok(CompletedAnalysis {
        id,
        file_name,
        analysis,
        token,
    })
}

/// Pull the `file` part out of the multipart body.
async fn read_upload(multipart: &mut Multipart) -> Result<Option<(String, Bytes)>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        return Ok(Some((file_name, data)));
    }
    Ok(None)
}

fn parse_csv(data: &[u8]) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(data))
        .finish()
        .map_err(|e| FraudShieldError::InvalidCsv(e.to_string()).into())
}

// ============================================================================
// Rendering
// ============================================================================

fn render_results_page(completed: &CompletedAnalysis) -> Html<String> {
    let analysis = &completed.analysis;
    let metrics = &analysis.metrics;

    let level_class = match metrics.risk_level {
        RiskLevel::High => "text-red-500",
        RiskLevel::Medium => "text-yellow-400",
        RiskLevel::Low => "text-green-500",
    };
    let dist_spec = serde_json::to_string(&analysis.charts.distribution)
        .unwrap_or_else(|_| "null".to_string());
    let right_spec = serde_json::to_string(analysis.charts.secondary())
        .unwrap_or_else(|_| "null".to_string());

    let html = RESULTS_TEMPLATE
        .replace("__ANALYSIS_ID__", &html_escape(&completed.id))
        .replace("__FILE__", &html_escape(&completed.file_name))
        .replace("__TOTAL__", &crate::report::thousands(metrics.total_transactions))
        .replace(
            "__LEGITIMATE__",
            &crate::report::thousands(metrics.legitimate_count),
        )
        .replace("__FRAUD__", &crate::report::thousands(metrics.fraud_count))
        .replace("__RATE__", &format!("{:.2}", metrics.fraud_rate))
        .replace("__LEVEL_CLASS__", level_class)
        .replace("__LEVEL__", metrics.risk_level.as_str())
        .replace("__ICON__", metrics.risk_level.icon())
        .replace("__MODEL__", &html_escape(&analysis.model_name))
        .replace("__REPORT__", &html_escape(&analysis.report))
        .replace("__TOKEN__", &completed.token)
        .replace("__DIST_SPEC__", &dist_spec)
        .replace("__RIGHT_SPEC__", &right_spec);

    Html(html)
}

/// Render an error as a page with the status the JSON API would use.
fn error_page(err: &ServerError) -> Response {
    let (status, message) = err.status_and_message();
    let html = ERROR_TEMPLATE.replace("__MESSAGE__", &html_escape(&message));
    (status, Html(html)).into_response()
}

fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Embedded Pages
// ============================================================================

const LANDING_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fraud Shield — Redefining Financial Security</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen flex flex-col">
    <header class="bg-gray-800 border-b border-gray-700 px-6 py-4">
        <div class="flex items-center justify-between">
            <h1 class="text-xl font-bold">🛡️ Fraud Shield</h1>
            <span class="text-sm text-gray-400">Redefining Financial Security</span>
        </div>
    </header>
    <main class="flex-1 flex items-center justify-center p-6">
        <div class="max-w-3xl text-center">
            <h2 class="text-4xl font-bold mb-4">Batch fraud analysis for transaction exports</h2>
            <p class="text-gray-400 mb-8">Upload a CSV of card transactions and get fraud predictions, aggregate risk metrics and visual summaries in seconds. No data leaves this server.</p>
            <div class="grid grid-cols-3 gap-4 mb-10 text-left">
                <div class="bg-gray-800 rounded-lg p-5"><div class="text-2xl mb-2">📊</div><h3 class="font-semibold mb-1">Instant analysis</h3><p class="text-sm text-gray-400">Every row scored by a pre-trained classifier, with per-row probabilities where available.</p></div>
                <div class="bg-gray-800 rounded-lg p-5"><div class="text-2xl mb-2">⚡</div><h3 class="font-semibold mb-1">Risk banding</h3><p class="text-sm text-gray-400">Fraud rate rolled up into LOW, MEDIUM and HIGH bands with concrete follow-up advice.</p></div>
                <div class="bg-gray-800 rounded-lg p-5"><div class="text-2xl mb-2">🔒</div><h3 class="font-semibold mb-1">One-time downloads</h3><p class="text-sm text-gray-400">Scored results are held briefly behind a single-use link, then discarded.</p></div>
            </div>
            <a href="/analyze" class="inline-block px-8 py-3 bg-blue-600 hover:bg-blue-700 rounded-md font-semibold">🔍 Analyze Transactions</a>
        </div>
    </main>
    <footer class="bg-gray-800 border-t border-gray-700 px-6 py-3 text-sm text-gray-500 flex justify-between">
        <span>Fraud Shield</span>
        <a href="/api/health" class="hover:text-gray-300">API status</a>
    </footer>
</body>
</html>"#;

const ANALYZE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fraud Shield — Redefining Financial Security</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen flex flex-col">
    <header class="bg-gray-800 border-b border-gray-700 px-6 py-4">
        <div class="flex items-center justify-between">
            <a href="/" class="text-xl font-bold">🛡️ Fraud Shield</a>
            <span class="text-sm text-gray-400">Redefining Financial Security</span>
        </div>
    </header>
    <main class="flex-1 flex items-center justify-center p-6">
        <div class="w-full max-w-xl bg-gray-800 rounded-lg p-8">
            <h2 class="text-2xl font-bold mb-2">Upload transactions</h2>
            <p class="text-sm text-gray-400 mb-6">CSV with the usual card-transaction layout: anonymized feature columns V1 to V28 plus Amount. A Class label column, if present, is set aside automatically.</p>
            <form action="/predict" method="post" enctype="multipart/form-data" class="space-y-6">
                <label class="block border-2 border-dashed border-gray-600 rounded-lg p-8 text-center cursor-pointer hover:border-blue-500">
                    <input type="file" name="file" accept=".csv" required class="block w-full text-sm text-gray-400">
                </label>
                <button type="submit" class="w-full px-6 py-3 bg-blue-600 hover:bg-blue-700 rounded-md font-semibold">🔍 Analyze Transactions</button>
            </form>
            <p class="text-xs text-gray-500 mt-4">Uploads up to 200 MB. Files are processed in memory and never written to disk.</p>
        </div>
    </main>
</body>
</html>"#;

const RESULTS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fraud Shield — Analysis Results</title>
    <script src="https://cdn.tailwindcss.com"></script>
    <script src="https://cdn.plot.ly/plotly-2.32.0.min.js"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen">
    <header class="bg-gray-800 border-b border-gray-700 px-6 py-4">
        <div class="flex items-center justify-between">
            <a href="/" class="text-xl font-bold">🛡️ Fraud Shield</a>
            <span class="text-sm text-gray-400">Analysis __ANALYSIS_ID__ · __FILE__</span>
        </div>
    </header>
    <main class="p-6 max-w-5xl mx-auto space-y-6">
        <div class="bg-gray-800 rounded-lg p-6 flex items-center justify-between">
            <div>
                <div class="text-sm text-gray-400">Risk Level</div>
                <div class="text-3xl font-bold __LEVEL_CLASS__">__LEVEL__ __ICON__</div>
            </div>
            <div class="text-right">
                <div class="text-sm text-gray-400">Model</div>
                <div class="font-mono">__MODEL__</div>
            </div>
        </div>
        <div class="grid grid-cols-4 gap-4">
            <div class="bg-gray-800 rounded-lg p-4"><div class="text-2xl font-bold">__TOTAL__</div><div class="text-sm text-gray-400">Total Transactions</div></div>
            <div class="bg-gray-800 rounded-lg p-4"><div class="text-2xl font-bold text-green-500">__LEGITIMATE__</div><div class="text-sm text-gray-400">Legitimate</div></div>
            <div class="bg-gray-800 rounded-lg p-4"><div class="text-2xl font-bold text-red-500">__FRAUD__</div><div class="text-sm text-gray-400">Fraudulent</div></div>
            <div class="bg-gray-800 rounded-lg p-4"><div class="text-2xl font-bold">__RATE__%</div><div class="text-sm text-gray-400">Fraud Rate</div></div>
        </div>
        <div class="grid grid-cols-2 gap-4">
            <div class="bg-gray-800 rounded-lg p-4"><div id="chart-left" class="h-80"></div></div>
            <div class="bg-gray-800 rounded-lg p-4"><div id="chart-right" class="h-80"></div></div>
        </div>
        <div class="bg-gray-800 rounded-lg p-6 flex items-center justify-between">
            <div>
                <h3 class="font-semibold">Scored CSV</h3>
                <p class="text-sm text-gray-400">Original columns plus prediction and probability. The link works exactly once.</p>
            </div>
            <a href="/download/__TOKEN__" class="px-6 py-2 bg-blue-600 hover:bg-blue-700 rounded-md font-semibold">⬇️ Download Results</a>
        </div>
        <div class="bg-gray-800 rounded-lg p-6">
            <h3 class="font-semibold mb-3">Summary Report</h3>
            <pre class="whitespace-pre-wrap text-sm text-gray-300 font-mono">__REPORT__</pre>
        </div>
        <div class="text-center pb-6">
            <a href="/analyze" class="text-blue-400 hover:text-blue-300">Analyze another file</a>
        </div>
    </main>
    <script>
    const distSpec = __DIST_SPEC__;
    const rightSpec = __RIGHT_SPEC__;
    function render(divId, spec) {
        if (!spec) return;
        const layout = {title: spec.title, paper_bgcolor: '#1f2937', plot_bgcolor: '#1f2937',
                        font: {color: '#e5e7eb'}, margin: {l: 40, r: 20, t: 50, b: 40}};
        let trace;
        if (spec.kind === 'pie') {
            trace = {type: 'pie', labels: spec.labels, values: spec.values, marker: {colors: spec.colors}};
        } else {
            trace = {type: 'bar', x: spec.labels, y: spec.values,
                     marker: {color: spec.colors.length === 1 ? spec.colors[0] : spec.colors}};
            if (spec.x_title) layout.xaxis = {title: spec.x_title};
            if (spec.y_title) layout.yaxis = {title: spec.y_title};
        }
        Plotly.newPlot(divId, [trace], layout, {displaylogo: false, responsive: true});
    }
    render('chart-left', distSpec);
    render('chart-right', rightSpec);
    </script>
</body>
</html>"#;

const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fraud Shield — Error</title>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen flex items-center justify-center p-6">
    <div class="max-w-lg w-full bg-gray-800 rounded-lg p-8 text-center">
        <div class="text-4xl mb-4">❌</div>
        <h2 class="text-xl font-bold mb-2">Analysis failed</h2>
        <p class="text-gray-300 mb-6">__MESSAGE__</p>
        <a href="/analyze" class="inline-block px-6 py-2 bg-blue-600 hover:bg-blue-700 rounded-md font-semibold">Try again</a>
    </div>
</body>
</html>"#;
