use anyhow::{Context, Result};
use clap::{Arg, Command};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swapscope::config::Config;
use swapscope::constants::get_known_mint;
use swapscope::engine::{SimulationEngine, SimulationRequest};
use swapscope::stats::{MemoryStatsRecorder, StatsRecorder};
use swapscope::types::SimulationResult;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("swapscope")
        .version("0.1.0")
        .about("🔭 Solana swap simulator - quote, MEV risk and landing cost in one dry run")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("MINT_OR_SYMBOL")
                .help("입력 토큰 (민트 주소 또는 SOL/USDC 같은 심볼)")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("MINT_OR_SYMBOL")
                .help("출력 토큰 (민트 주소 또는 심볼)")
                .required(true),
        )
        .arg(
            Arg::new("amount")
                .short('a')
                .long("amount")
                .value_name("AMOUNT")
                .help("입력 수량 (face value)")
                .required(true),
        )
        .arg(
            Arg::new("input-decimals")
                .long("input-decimals")
                .value_name("N")
                .help("입력 토큰 소수 자릿수 (심볼 사용 시 생략 가능)"),
        )
        .arg(
            Arg::new("output-decimals")
                .long("output-decimals")
                .value_name("N")
                .help("출력 토큰 소수 자릿수 (심볼 사용 시 생략 가능)"),
        )
        .arg(
            Arg::new("wallet")
                .short('w')
                .long("wallet")
                .value_name("PUBKEY")
                .help("드라이런에 사용할 지갑 주소 (없으면 휴리스틱 추정만 수행)"),
        )
        .arg(
            Arg::new("slippage-bps")
                .long("slippage-bps")
                .value_name("BPS")
                .help("슬리피지 허용치 (기본값은 설정 파일을 따름)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("설정 파일 경로")
                .default_value("config/default.toml"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("로그 레벨 (trace, debug, info, warn, error)")
                .default_value("info"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("결과를 JSON으로 출력")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").map(String::as_str);
    let log_filter = match log_level {
        Some("trace") => "trace",
        Some("debug") => "debug",
        Some("warn") => "warn",
        Some("error") => "error",
        _ => "info",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // 설정 파일이 없으면 기본값으로 동작
    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config/default.toml");
    let config = match Config::load(config_path).await {
        Ok(config) => {
            info!("📋 Config loaded from {config_path}");
            config
        }
        Err(e) => {
            warn!("⚠️ Config {config_path} not usable ({e}), using built-in defaults");
            Config::default()
        }
    };

    let request = build_request(&matches, &config)?;

    let engine = SimulationEngine::from_config(&config).context("engine initialization failed")?;
    let recorder = MemoryStatsRecorder::new();

    match engine.simulate(&request).await {
        Ok(result) => {
            recorder.record_outcome(&result);
            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                render_result(&result);
                render_stats(&recorder);
            }
            Ok(())
        }
        Err(e) => {
            error!("❌ Simulation failed: {e}");
            if e.is_network() {
                error!("🌐 Check your network connection and endpoint configuration");
            }
            std::process::exit(1);
        }
    }
}

/// Resolve a token argument: a known symbol carries its decimals, an
/// explicit mint needs the corresponding --*-decimals flag. An explicit
/// flag always wins over the symbol table.
fn resolve_token(
    value: &str,
    decimals_flag: Option<&String>,
    flag_name: &str,
) -> Result<(String, u8)> {
    let known = get_known_mint(value);

    if let Some(raw) = decimals_flag {
        let decimals = raw
            .parse::<u8>()
            .with_context(|| format!("--{flag_name} must be a small integer"))?;
        let mint = known.map(|(mint, _)| mint).unwrap_or(value);
        return Ok((mint.to_string(), decimals));
    }

    let (mint, decimals) = known.with_context(|| {
        format!("unknown token symbol {value:?}: pass a mint address plus --{flag_name}")
    })?;
    Ok((mint.to_string(), decimals))
}

fn build_request(matches: &clap::ArgMatches, config: &Config) -> Result<SimulationRequest> {
    let input = matches
        .get_one::<String>("input")
        .context("--input is required")?;
    let output = matches
        .get_one::<String>("output")
        .context("--output is required")?;

    let (input_mint, input_decimals) =
        resolve_token(input, matches.get_one::<String>("input-decimals"), "input-decimals")?;
    let (output_mint, output_decimals) =
        resolve_token(output, matches.get_one::<String>("output-decimals"), "output-decimals")?;

    let amount_in = matches
        .get_one::<String>("amount")
        .context("--amount is required")?
        .parse::<f64>()
        .context("--amount must be a number")?;

    let slippage_bps = match matches.get_one::<String>("slippage-bps") {
        Some(raw) => raw.parse::<u16>().context("--slippage-bps must be an integer")?,
        None => config.slippage_bps,
    };

    Ok(SimulationRequest {
        input_mint,
        output_mint,
        amount_in,
        input_decimals,
        output_decimals,
        wallet: matches.get_one::<String>("wallet").cloned(),
        slippage_bps,
    })
}

fn render_result(result: &SimulationResult) {
    info!("═══════════════════════════════════════════");
    info!("🔁 Swap: {} {} -> {:.6} {}", result.amount_in, result.token_in, result.expected_out, result.token_out);
    info!("🛣️ Route: {}", result.route.join(" -> "));
    info!("📉 Price impact: {:.4}%", result.price_impact_pct);
    info!("═══════════════════════════════════════════");
    info!("⚙️ Execution ({})", if result.execution.succeeded { "ok" } else { "failed" });
    info!("  🧮 Compute units: {}", result.execution.compute_units_used);
    info!("  👥 Accounts touched: {}", result.execution.accounts_touched);
    if let Some(cause) = &result.execution.failure_cause {
        warn!("  ❌ Failure cause: {cause}");
    }
    info!("═══════════════════════════════════════════");
    info!("🚨 MEV risk: {} (score {}/100)", result.risk.level, result.risk.score);
    info!(
        "  📊 Breakdown: impact {} / liquidity {} / size {}",
        result.risk.breakdown.price_impact, result.risk.breakdown.liquidity, result.risk.breakdown.trade_size
    );
    info!("  🥪 Sandwich exposure: {}", result.risk.sandwich_risk);
    info!("  🏃 Frontrun exposure: {}", result.risk.frontrun_risk);
    info!("  💸 Estimated loss: {:.4} {}", result.risk.estimated_loss, result.token_in);
    for recommendation in &result.risk.recommendations {
        info!("  💡 {recommendation}");
    }
    info!("═══════════════════════════════════════════");
    info!("🌡️ Congestion: {}", result.fees.congestion);
    info!(
        "  📈 Fee percentiles (μlam/CU): p25 {} | median {} | p75 {} | p95 {}",
        result.fees.p25, result.fees.median, result.fees.p75, result.fees.p95
    );
    for tier in &result.fees.landing_tiers {
        info!(
            "  🎯 {}: {} μlam/CU (~{:.0}% landing, {})",
            tier.label,
            tier.fee_lamports,
            tier.landing_probability * 100.0,
            tier.estimated_latency
        );
    }
    info!("═══════════════════════════════════════════");
    info!("💰 Network fee: {}", result.cost.display.network_fee);
    info!("💰 Priority fee: {}", result.cost.display.priority_fee);
    info!("💰 Total: {}", result.cost.display.total);
}

fn render_stats(recorder: &MemoryStatsRecorder) {
    let stats = recorder.read_stats();
    info!("═══════════════════════════════════════════");
    info!("📊 Session stats:");
    info!("  🔢 Simulations: {}", stats.total_simulations);
    info!("  💧 Volume: {:.4}", stats.total_volume);
    info!("  ✅ Success rate: {:.1}%", stats.success_rate * 100.0);
    info!("  🧮 Avg compute units: {:.0}", stats.avg_compute_units);
    info!("  ⛽ Avg priority fee: {:.0} μlam/CU", stats.avg_priority_fee);
}


fn print_banner() {
    println!(
        r#"
   ███████╗██╗    ██╗ █████╗ ██████╗ ███████╗ ██████╗ ██████╗ ██████╗ ███████╗
   ██╔════╝██║    ██║██╔══██╗██╔══██╗██╔════╝██╔════╝██╔═══██╗██╔══██╗██╔════╝
   ███████╗██║ █╗ ██║███████║██████╔╝███████╗██║     ██║   ██║██████╔╝█████╗
   ╚════██║██║███╗██║██╔══██║██╔═══╝ ╚════██║██║     ██║   ██║██╔═══╝ ██╔══╝
   ███████║╚███╔███╔╝██║  ██║██║     ███████║╚██████╗╚██████╔╝██║     ███████╗
   ╚══════╝ ╚══╝╚══╝ ╚═╝  ╚═╝╚═╝     ╚══════╝ ╚═════╝ ╚═════╝ ╚═╝     ╚══════╝

   🔭 Swap Simulation & MEV Risk Analysis
"#
    );
}
