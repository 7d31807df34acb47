//! Request validation: address format, network name and tweet urls

use crate::error::{FaucetError, FaucetResult};

const ADDRESS_HEX_LEN: usize = 40;
const TWEET_HOSTS: [&str; 2] = ["twitter.com", "x.com"];

/// Accepts `0x` followed by exactly 40 hex digits of any case.
pub fn validate_address(address: &str) -> FaucetResult<()> {
    let valid = address
        .strip_prefix("0x")
        .map(|hex_part| {
            hex_part.len() == ADDRESS_HEX_LEN && hex::decode(hex_part).is_ok()
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(FaucetError::InvalidAddress(address.to_string()))
    }
}

/// The requested network must name the supported test network, ignoring case.
pub fn validate_network(requested: &str, supported: &str) -> FaucetResult<()> {
    if requested.eq_ignore_ascii_case(supported) {
        Ok(())
    } else {
        Err(FaucetError::UnsupportedNetwork(requested.to_string()))
    }
}

/// Accepts `http(s)://{twitter.com,x.com}/<handle>/status/<digits>` followed by anything.
pub fn validate_tweet_url(url: &str) -> FaucetResult<()> {
    if is_tweet_url(url) {
        Ok(())
    } else {
        Err(FaucetError::InvalidTweetUrl(url.to_string()))
    }
}

fn is_tweet_url(url: &str) -> bool {
    let Some(rest) = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
    else {
        return false;
    };

    let Some(path) = TWEET_HOSTS
        .iter()
        .find_map(|host| rest.strip_prefix(host).and_then(|r| r.strip_prefix('/')))
    else {
        return false;
    };

    let Some((handle, after_handle)) = path.split_once('/') else {
        return false;
    };
    if handle.is_empty()
        || !handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return false;
    }

    after_handle
        .strip_prefix("status/")
        .and_then(|id| id.chars().next())
        .map(|first| first.is_ascii_digit())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_accepts_mixed_case_hex() {
        assert!(validate_address("0xABCDEF0123456789abcdef0123456789ABCDEF01").is_ok());
        assert!(validate_address("0x0000000000000000000000000000000000000000").is_ok());
    }

    #[test]
    fn test_address_rejects_bad_shapes() {
        // 39 hex digits
        assert!(validate_address("0xABCDEF0123456789abcdef0123456789ABCDEF0").is_err());
        // 41 hex digits
        assert!(validate_address("0xABCDEF0123456789abcdef0123456789ABCDEF012").is_err());
        assert!(validate_address("0xZZCDEF0123456789abcdef0123456789ABCDEF01").is_err());
        assert!(validate_address("ABCDEF0123456789abcdef0123456789ABCDEF0123").is_err());
        assert!(validate_address("0XABCDEF0123456789abcdef0123456789ABCDEF01").is_err());
        assert!(validate_address(" 0xABCDEF0123456789abcdef0123456789ABCDEF01").is_err());
        assert!(validate_address("").is_err());
    }

    #[test]
    fn test_network_compare_ignores_case() {
        assert!(validate_network("Axiom-Testnet", "axiom-testnet").is_ok());
        assert!(matches!(
            validate_network("mainnet", "axiom-testnet"),
            Err(FaucetError::UnsupportedNetwork(net)) if net == "mainnet"
        ));
    }

    #[test]
    fn test_tweet_url_accepts_known_hosts() {
        assert!(validate_tweet_url("https://twitter.com/someuser/status/12345").is_ok());
        assert!(validate_tweet_url("https://x.com/someuser/status/12345").is_ok());
        assert!(validate_tweet_url("http://x.com/some_user_2/status/9").is_ok());
        assert!(validate_tweet_url("https://x.com/someuser/status/12345?s=20").is_ok());
        assert!(validate_tweet_url("https://twitter.com/someuser/status/12345/photo/1").is_ok());
    }

    #[test]
    fn test_tweet_url_rejects_other_shapes() {
        assert!(validate_tweet_url("https://facebook.com/someuser/status/12345").is_err());
        assert!(validate_tweet_url("https://www.x.com/someuser/status/12345").is_err());
        assert!(validate_tweet_url("https://x.com/someuser/status/").is_err());
        assert!(validate_tweet_url("https://x.com/someuser/status/abc").is_err());
        assert!(validate_tweet_url("https://x.com//status/12345").is_err());
        assert!(validate_tweet_url("https://x.com/some-user/status/12345").is_err());
        assert!(validate_tweet_url("ftp://x.com/someuser/status/12345").is_err());
        assert!(validate_tweet_url("x.com/someuser/status/12345").is_err());
    }
}
