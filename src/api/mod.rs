use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CalcError, ComparisonResult, DepositOutcome, DepositPlan, HORIZON_MONTHS, InsuranceOutcome,
    InsurancePlan, InverseSolveResult, InverseTarget, PayYears, TaxPolicy, evaluate_insurance,
    run_comparison, solve_required_annual_rate, solve_required_monthly_deposit,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ApiSolveTarget {
    #[serde(
        alias = "requiredMonthlyDeposit",
        alias = "required_monthly_deposit",
        alias = "monthly"
    )]
    RequiredMonthlyDeposit,
    #[serde(
        alias = "requiredAnnualRate",
        alias = "required_annual_rate",
        alias = "rate"
    )]
    RequiredAnnualRate,
}

impl From<ApiSolveTarget> for InverseTarget {
    fn from(value: ApiSolveTarget) -> Self {
        match value {
            ApiSolveTarget::RequiredMonthlyDeposit => InverseTarget::RequiredMonthlyDeposit,
            ApiSolveTarget::RequiredAnnualRate => InverseTarget::RequiredAnnualRate,
        }
    }
}

impl From<InverseTarget> for ApiSolveTarget {
    fn from(value: InverseTarget) -> Self {
        match value {
            InverseTarget::RequiredMonthlyDeposit => ApiSolveTarget::RequiredMonthlyDeposit,
            InverseTarget::RequiredAnnualRate => ApiSolveTarget::RequiredAnnualRate,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    deposit_monthly: Option<f64>,
    deposit_rate: Option<f64>,
    insurance_monthly: Option<f64>,
    pay_years: Option<u32>,
    surrender_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SolvePayload {
    deposit_monthly: Option<f64>,
    deposit_rate: Option<f64>,
    insurance_monthly: Option<f64>,
    pay_years: Option<u32>,
    surrender_rate: Option<f64>,
    solve_for: Option<ApiSolveTarget>,
}

impl From<SolvePayload> for ComparePayload {
    fn from(value: SolvePayload) -> Self {
        ComparePayload {
            deposit_monthly: value.deposit_monthly,
            deposit_rate: value.deposit_rate,
            insurance_monthly: value.insurance_monthly,
            pay_years: value.pay_years,
            surrender_rate: value.surrender_rate,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "savings-duel",
    about = "Compares a monthly compound-interest deposit against a short-pay \
             lump-refund insurance product over a 10-year horizon"
)]
struct Cli {
    #[arg(long, help = "Monthly deposit amount")]
    deposit_monthly: f64,
    #[arg(
        long,
        help = "Nominal annual deposit rate in percent, compounded monthly"
    )]
    deposit_rate: f64,
    #[arg(long, help = "Monthly insurance premium")]
    insurance_monthly: f64,
    #[arg(
        long,
        default_value_t = 5,
        help = "Premium payment period in years (5 or 7)"
    )]
    pay_years: u32,
    #[arg(
        long,
        help = "Surrender value at the 10-year mark as percent of premiums paid"
    )]
    surrender_rate: f64,
}

#[derive(Debug, Clone, Copy)]
struct CompareRequest {
    deposit: DepositPlan,
    insurance: InsurancePlan,
    tax: TaxPolicy,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    horizon_months: u32,
    pay_years: u32,
    deposit: DepositOutcome,
    insurance: InsuranceOutcome,
    result: ComparisonResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    solve_for: ApiSolveTarget,
    target_bonus: f64,
    solved_value: Option<f64>,
    feasible: bool,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: Cli) -> Result<CompareRequest, String> {
    if !cli.deposit_monthly.is_finite() || cli.deposit_monthly < 0.0 {
        return Err("--deposit-monthly must be >= 0".to_string());
    }

    if !cli.deposit_rate.is_finite() || cli.deposit_rate < 0.0 {
        return Err("--deposit-rate must be >= 0".to_string());
    }

    if !cli.insurance_monthly.is_finite() || cli.insurance_monthly < 0.0 {
        return Err("--insurance-monthly must be >= 0".to_string());
    }

    if !cli.surrender_rate.is_finite() || cli.surrender_rate < 0.0 {
        return Err("--surrender-rate must be >= 0".to_string());
    }

    let Some(pay_years) = PayYears::from_years(cli.pay_years) else {
        return Err("--pay-years must be 5 or 7".to_string());
    };

    Ok(CompareRequest {
        deposit: DepositPlan {
            monthly_amount: cli.deposit_monthly,
            annual_rate: cli.deposit_rate,
            horizon_months: HORIZON_MONTHS,
        },
        insurance: InsurancePlan {
            monthly_amount: cli.insurance_monthly,
            pay_years,
            surrender_rate: cli.surrender_rate,
        },
        tax: TaxPolicy::default(),
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        deposit_monthly: 100.0,
        deposit_rate: 2.5,
        insurance_monthly: 100.0,
        pay_years: 5,
        surrender_rate: 123.0,
    }
}

fn compare_request_from_payload(payload: ComparePayload) -> Result<CompareRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.deposit_monthly {
        cli.deposit_monthly = v;
    }
    if let Some(v) = payload.deposit_rate {
        cli.deposit_rate = v;
    }
    if let Some(v) = payload.insurance_monthly {
        cli.insurance_monthly = v;
    }
    if let Some(v) = payload.pay_years {
        cli.pay_years = v;
    }
    if let Some(v) = payload.surrender_rate {
        cli.surrender_rate = v;
    }

    build_request(cli)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .route("/api/solve", get(solve_get_handler).post(solve_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("savings-duel HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match compare_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match run_compare_request(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => calc_error_response(err),
    }
}

async fn solve_get_handler(Query(payload): Query<SolvePayload>) -> Response {
    solve_handler_impl(payload).await
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Response {
    solve_handler_impl(payload).await
}

async fn solve_handler_impl(payload: SolvePayload) -> Response {
    let solve_for = payload
        .solve_for
        .unwrap_or(ApiSolveTarget::RequiredMonthlyDeposit);
    let request = match compare_request_from_payload(payload.into()) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match run_solve_request(&request, solve_for.into()) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => calc_error_response(err),
    }
}

fn run_compare_request(request: &CompareRequest) -> Result<CompareResponse, CalcError> {
    let outcome = run_comparison(&request.deposit, &request.insurance, request.tax)?;
    Ok(CompareResponse {
        horizon_months: request.deposit.horizon_months,
        pay_years: request.insurance.pay_years.years(),
        deposit: outcome.deposit,
        insurance: outcome.insurance,
        result: outcome.result,
    })
}

/// Solves the deposit input needed to match the insurance bonus computed
/// from the same request.
fn run_solve_request(
    request: &CompareRequest,
    target: InverseTarget,
) -> Result<SolveResponse, CalcError> {
    let target_bonus = evaluate_insurance(&request.insurance)?.bonus;
    let result = match target {
        InverseTarget::RequiredMonthlyDeposit => solve_required_monthly_deposit(
            target_bonus,
            request.deposit.annual_rate,
            request.deposit.horizon_months,
            request.tax.withholding_rate,
        )?,
        InverseTarget::RequiredAnnualRate => solve_required_annual_rate(
            target_bonus,
            request.deposit.monthly_amount,
            request.deposit.horizon_months,
            request.tax.withholding_rate,
        )?,
    };

    Ok(build_solve_response(target_bonus, result))
}

fn build_solve_response(target_bonus: f64, result: InverseSolveResult) -> SolveResponse {
    SolveResponse {
        solve_for: result.target.into(),
        target_bonus,
        solved_value: result.solved_value,
        feasible: result.feasible,
        message: result.message,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliReport {
    comparison: CompareResponse,
    required_monthly_deposit: SolveResponse,
    required_annual_rate: SolveResponse,
}

/// One-shot flag mode: comparison plus both inverse solves, JSON on stdout.
pub fn run_cli() -> Result<(), String> {
    let request = build_request(Cli::parse())?;

    let report = CliReport {
        comparison: run_compare_request(&request).map_err(|e| e.to_string())?,
        required_monthly_deposit: run_solve_request(&request, InverseTarget::RequiredMonthlyDeposit)
            .map_err(|e| e.to_string())?,
        required_annual_rate: run_solve_request(&request, InverseTarget::RequiredAnnualRate)
            .map_err(|e| e.to_string())?,
    };

    let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
    println!("{json}");
    Ok(())
}

fn calc_error_response(err: CalcError) -> Response {
    let status = match err {
        CalcError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        CalcError::InvariantViolation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
