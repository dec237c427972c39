//! JSON-RPC plumbing shared by the native-coin and token fetch paths.

use num_bigint::BigUint;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::error::ResolutionError;

/// balanceOf(address) selector.
const BALANCE_OF_SELECTOR: &str = "0x70a08231";

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorObject>,
}

/// Validate a wallet address and strip it down to bare lowercase hex.
pub(super) fn checked_address(address: &str) -> Result<String, ResolutionError> {
    let bare = address
        .trim()
        .trim_start_matches("0x")
        .to_ascii_lowercase();
    if bare.len() != 40 || !bare.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ResolutionError::InvalidAddress(address.to_string()));
    }
    Ok(bare)
}

/// eth_getBalance for the chain's native coin, in the smallest unit.
pub(super) async fn native_balance(
    client: &Client,
    endpoint: &str,
    wallet: &str,
) -> Result<BigUint, ResolutionError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_getBalance",
        "params": [format!("0x{wallet}"), "latest"],
    });
    let result = call(client, endpoint, body).await?;
    parse_quantity(&result)
}

/// eth_call of balanceOf(wallet) against an ERC-20 style contract.
pub(super) async fn token_balance(
    client: &Client,
    endpoint: &str,
    contract: &str,
    wallet: &str,
) -> Result<BigUint, ResolutionError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_call",
        "params": [
            { "to": contract, "data": balance_of_calldata(wallet) },
            "latest"
        ],
    });
    let result = call(client, endpoint, body).await?;
    parse_quantity(&result)
}

pub(super) fn balance_of_calldata(wallet: &str) -> String {
    format!("{BALANCE_OF_SELECTOR}{wallet:0>64}")
}

async fn call(
    client: &Client,
    endpoint: &str,
    body: serde_json::Value,
) -> Result<String, ResolutionError> {
    let response: RpcResponse = client
        .post(endpoint)
        .json(&body)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = response.error {
        return Err(ResolutionError::Rpc {
            message: error
                .message
                .unwrap_or_else(|| "unspecified error".to_string()),
        });
    }
    response.result.ok_or(ResolutionError::MalformedResponse {
        reason: "neither result nor error present".to_string(),
    })
}

/// Decode a 0x-prefixed hex quantity from an RPC result string.
pub(super) fn parse_quantity(result: &str) -> Result<BigUint, ResolutionError> {
    let hex = result.trim().trim_start_matches("0x");
    if hex.is_empty() {
        return Err(ResolutionError::MalformedResponse {
            reason: format!("empty quantity '{result}'"),
        });
    }
    BigUint::parse_bytes(hex.as_bytes(), 16).ok_or_else(|| ResolutionError::MalformedResponse {
        reason: format!("non-hex quantity '{result}'"),
    })
}

/// Scale a raw chain quantity down by the token's decimal factor into
/// human-readable units.
pub(super) fn scale_units(raw: &BigUint, decimals: u32) -> Result<Decimal, ResolutionError> {
    let out_of_range = || ResolutionError::AmountOutOfRange {
        raw: raw.to_string(),
    };
    let value = i128::try_from(raw).map_err(|_| out_of_range())?;
    Decimal::try_from_i128_with_scale(value, decimals)
        .map(|amount| amount.normalize())
        .map_err(|_| out_of_range())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_quantity_decodes_wei_hex() {
        let raw = parse_quantity("0xde0b6b3a7640000").expect("valid quantity");
        assert_eq!(raw, BigUint::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn test_parse_quantity_rejects_empty_and_garbage() {
        assert!(matches!(
            parse_quantity("0x"),
            Err(ResolutionError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_quantity("not-hex"),
            Err(ResolutionError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_scale_units_normalizes_token_units() {
        let one_bnb = BigUint::from(1_000_000_000_000_000_000u64);
        assert_eq!(scale_units(&one_bnb, 18).expect("fits"), dec!(1));

        let usdt_bsc = BigUint::from(1_230_000_000_000_000_000u64);
        assert_eq!(scale_units(&usdt_bsc, 18).expect("fits"), dec!(1.23));

        let half = BigUint::from(500_000_000_000_000_000u64);
        assert_eq!(scale_units(&half, 18).expect("fits"), dec!(0.5));

        let usdt_eth = BigUint::from(1_230_000u64);
        assert_eq!(scale_units(&usdt_eth, 6).expect("fits"), dec!(1.23));
    }

    #[test]
    fn test_scale_units_rejects_oversized_values() {
        let huge = BigUint::from(2u8).pow(130);
        assert!(matches!(
            scale_units(&huge, 18),
            Err(ResolutionError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_balance_of_calldata_pads_address_to_64_chars() {
        let data = balance_of_calldata("b794f5ea0ba39494ce839613fffba74279579268");
        assert!(data.starts_with("0x70a08231"));
        assert_eq!(data.len(), "0x70a08231".len() + 64);
        assert!(data.ends_with("000000000000000000000000b794f5ea0ba39494ce839613fffba74279579268"));
    }

    #[test]
    fn test_checked_address_normalizes_and_validates() {
        let wallet = checked_address("0xB794F5eA0ba39494cE839613fffBA74279579268").expect("valid");
        assert_eq!(wallet, "b794f5ea0ba39494ce839613fffba74279579268");

        assert!(matches!(
            checked_address("0xABC"),
            Err(ResolutionError::InvalidAddress(_))
        ));
        assert!(matches!(
            checked_address("0xzz94f5ea0ba39494ce839613fffba74279579268"),
            Err(ResolutionError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_rpc_response_shapes() {
        let ok: RpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0xde0b6b3a7640000"}"#)
                .expect("result shape");
        assert_eq!(ok.result.as_deref(), Some("0xde0b6b3a7640000"));
        assert!(ok.error.is_none());

        let err: RpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"bad params"}}"#,
        )
        .expect("error shape");
        assert!(err.result.is_none());
        assert_eq!(
            err.error.and_then(|e| e.message).as_deref(),
            Some("bad params")
        );
    }
}
