use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::CheckoutError;

/// Resolves a normalized coupon code to its discount percentage.
pub trait CouponLookup: Send + Sync {
    fn percent_for(&self, code: &str) -> Option<u8>;

    /// Number of codes on offer, as shown by the health check.
    fn code_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CouponTableError(pub String);

impl std::fmt::Display for CouponTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid coupon entry: {}", self.0)
    }
}

impl std::error::Error for CouponTableError {}

/// Fixed code to percentage table.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticCouponTable {
    coupons: HashMap<String, u8>,
}

impl StaticCouponTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u8)>,
        S: AsRef<str>,
    {
        let coupons = entries
            .into_iter()
            .map(|(code, percent)| (normalize_code(code.as_ref()), percent.min(100)))
            .collect();
        Self { coupons }
    }

    /// Parses `CODE:PERCENT` pairs separated by commas, e.g. `SAVE10:10,RENT20:20`.
    pub fn parse(raw: &str) -> Result<Self, CouponTableError> {
        let mut entries = Vec::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (code, percent) = pair
                .split_once(':')
                .ok_or_else(|| CouponTableError(pair.to_string()))?;
            let code = code.trim();
            let percent: u8 = percent
                .trim()
                .parse()
                .map_err(|_| CouponTableError(pair.to_string()))?;
            if code.is_empty() || percent > 100 {
                return Err(CouponTableError(pair.to_string()));
            }
            entries.push((code.to_string(), percent));
        }
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl Default for StaticCouponTable {
    fn default() -> Self {
        Self::new([("SAVE10", 10), ("RENT20", 20)])
    }
}

impl CouponLookup for StaticCouponTable {
    fn percent_for(&self, code: &str) -> Option<u8> {
        self.coupons.get(code).copied()
    }

    fn code_count(&self) -> usize {
        self.len()
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Looks up a free-text code. Unknown codes fail with `InvalidCoupon`.
pub fn resolve_coupon(lookup: &dyn CouponLookup, code: &str) -> Result<AppliedCoupon, CheckoutError> {
    let normalized = normalize_code(code);
    match lookup.percent_for(&normalized) {
        Some(percent) => Ok(AppliedCoupon {
            code: normalized,
            percent,
        }),
        None => {
            debug!("Rejected coupon code {:?}", normalized);
            Err(CheckoutError::InvalidCoupon(normalized))
        }
    }
}
