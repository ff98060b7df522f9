use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};

const WEI_DECIMALS: u8 = 18;

/// Truncate a B256 hash to "0xabcd...ef12" format
pub fn truncate_hash(hash: &B256) -> String {
    truncate_hex(&format!("{hash:#x}"))
}

/// Truncate an address to "0xabcd...ef12" format
pub fn truncate_address(addr: &Address) -> String {
    truncate_hex(&addr.to_checksum(None))
}

fn truncate_hex(s: &str) -> String {
    if s.len() > 14 {
        format!("{}...{}", &s[..8], &s[s.len() - 4..])
    } else {
        s.to_string()
    }
}

/// Format a wei value in the chain's native unit, e.g. "1.25 MATIC"
pub fn format_native(wei: U256, symbol: &str) -> String {
    format!("{} {symbol}", format_u256_as_decimal(wei, WEI_DECIMALS))
}

/// Format a U256 value as decimal with given decimals, at most six shown
pub fn format_u256_as_decimal(value: U256, decimals: u8) -> String {
    let exact = format_u256_exact(value, decimals);
    match exact.split_once('.') {
        Some((whole, frac)) if frac.len() > 6 => format!("{whole}.{}", &frac[..6]),
        Some(_) => exact,
        None => format!("{exact}.0"),
    }
}

/// Full-precision decimal rendering without trailing zeros: 1.5e18 wei is
/// "1.5", one ether is "1".
pub fn format_u256_exact(value: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let padded = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{whole}.{}", padded.trim_end_matches('0'))
}

/// Wei as a floating-point ether amount rounded to six places, for charts.
pub fn wei_to_ether_f64(wei: U256) -> f64 {
    let ether: f64 = format_u256_exact(wei, WEI_DECIMALS).parse().unwrap_or(0.0);
    (ether * 1e6).round() / 1e6
}

/// Format a number with comma separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format gas price in Gwei
pub fn format_gwei(wei: u128) -> String {
    let gwei = wei as f64 / 1e9;
    if gwei < 0.01 {
        format!("{gwei:.4} Gwei")
    } else if gwei < 10.0 {
        format!("{gwei:.2} Gwei")
    } else {
        format!("{gwei:.1} Gwei")
    }
}

/// Format a Unix timestamp as "Xm ago", "Xh ago", etc.
pub fn format_time_ago(timestamp: u64) -> String {
    let now = Utc::now().timestamp() as u64;
    if timestamp > now {
        return "just now".to_string();
    }
    let diff = now - timestamp;
    if diff < 60 {
        format!("{diff}s ago")
    } else if diff < 3600 {
        format!("{}m ago", diff / 60)
    } else if diff < 86400 {
        format!("{}h ago", diff / 3600)
    } else {
        format!("{}d ago", diff / 86400)
    }
}

/// Format a Unix timestamp as a datetime string
pub fn format_timestamp(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%b %d, %Y %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// RFC 3339 UTC timestamp, e.g. "2023-11-14T22:13:20+00:00"
pub fn format_iso_timestamp(timestamp: u64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0).map(|dt| dt.to_rfc3339())
}

/// Short UTC timestamp used in chart labels, e.g. "2023-11-14 22:13"
pub fn format_minute(timestamp: u64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
