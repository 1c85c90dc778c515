//! Coupon code check (single hard-wired promotion).

use serde::Serialize;

pub const SAVE30: &str = "SAVE30";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CouponCheck {
    Valid {
        code: String,
        discount: u32,
        message: String,
        category: String,
    },
    Unknown {
        message: String,
    },
}

/// Look up a coupon code. Matching is exact.
pub fn check_coupon(code: &str) -> CouponCheck {
    if code == SAVE30 {
        CouponCheck::Valid {
            code: SAVE30.to_string(),
            discount: 30,
            message: "30% discount applied".to_string(),
            category: "all".to_string(),
        }
    } else {
        CouponCheck::Unknown {
            message: "coupon not found".to_string(),
        }
    }
}
