// Network constants
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
pub const MAX_COMPUTE_UNITS: u64 = 1_400_000;

// Route fallback label when the aggregator reports no hops
pub const SYNTHETIC_ROUTE_LABEL: &str = "aggregator";

// Common token mints (mainnet)
pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const USDC_MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
pub const USDT_MINT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";
pub const BONK_MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const JUP_MINT: &str = "JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN";

/// Known mint lookup by symbol, with the decimals the chain registers
pub fn get_known_mint(symbol: &str) -> Option<(&'static str, u8)> {
    match symbol.to_uppercase().as_str() {
        "SOL" | "WSOL" => Some((SOL_MINT, 9)),
        "USDC" => Some((USDC_MINT, 6)),
        "USDT" => Some((USDT_MINT, 6)),
        "BONK" => Some((BONK_MINT, 5)),
        "JUP" => Some((JUP_MINT, 6)),
        _ => None,
    }
}

/// Helper to format lamport amounts as SOL
pub fn format_sol_amount(lamports: u64) -> String {
    let sol = lamports as f64 / LAMPORTS_PER_SOL as f64;
    format!("{:.6} SOL", sol)
}
