use std::collections::BTreeMap;

use pulse_core::{
    IndicatorEntry, Point, delta, forward_fill_combine, intersect, round_to, weekly_net,
};

/// Decimal places kept by rate spreads.
const SPREAD_DECIMALS: i32 = 4;

/// Indicators whose derivation needs series other than those declared in the registry.
const DEPENDENCY_OVERRIDES: &[(&str, &[&str])] = &[
    ("ust_net_w", &["UST_AUCTION_ISSUES", "UST_REDEMPTIONS", "UST_INTEREST"]),
    ("bill_share_w", &["UST_BILL_SHARE"]),
    ("ust_redemptions_w", &["UST_REDEMPTIONS_W"]),
    ("ust_interest_w", &["UST_INTEREST_W"]),
];

/// Series an indicator needs resolved, upper-cased, in order.
///
/// The override table wins over the registry's declared list.
pub(crate) fn dependencies(indicator: &IndicatorEntry) -> Vec<String> {
    DEPENDENCY_OVERRIDES
        .iter()
        .find(|(id, _)| *id == indicator.id)
        .map_or_else(
            || {
                indicator
                    .series
                    .iter()
                    .map(|s| s.to_ascii_uppercase())
                    .collect()
            },
            |(_, deps)| deps.iter().map(|s| (*s).to_string()).collect(),
        )
}

/// Derivation applied to an indicator's resolved dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Formula {
    /// `WALCL - TGA - RRPONTSYD`, the weekly balance sheet forward-filled onto
    /// the daily TGA/RRP axis.
    NetLiquidity,
    /// `value[i] - value[i - periods]` over the first dependency.
    Delta {
        /// Lag in observations.
        periods: usize,
    },
    /// `left - right` on shared dates, rounded to 4 decimals. The first
    /// non-empty candidate in `left` is used.
    Spread {
        /// Candidate minuend series, in preference order.
        left: &'static [&'static str],
        /// Subtrahend series.
        right: &'static str,
    },
    /// One series returned unchanged.
    Passthrough {
        /// Series id.
        series: &'static str,
    },
    /// Weekly issuance minus redemptions minus interest, each aggregated by ISO week.
    WeeklyNetSettlement,
    /// First non-empty dependency, unchanged.
    FirstAvailable,
}

impl Formula {
    /// Select the formula for an indicator id. Unknown ids fall back to
    /// [`Formula::FirstAvailable`].
    #[must_use]
    pub fn for_indicator(indicator_id: &str) -> Self {
        match indicator_id {
            "net_liq" => Self::NetLiquidity,
            "rrp_delta" | "tga_delta" => Self::Delta { periods: 5 },
            "reserves_w" => Self::Delta { periods: 1 },
            "sofr_iorb" => Self::Spread {
                left: &["SOFR"],
                right: "IORB",
            },
            "bill_iorb" => Self::Spread {
                left: &["DTB4WK", "DTB3"],
                right: "IORB",
            },
            "ofr_liq_idx" => Self::Passthrough {
                series: "OFR_LIQ_IDX",
            },
            "bill_share_w" => Self::Passthrough {
                series: "UST_BILL_SHARE",
            },
            "ust_redemptions_w" => Self::Passthrough {
                series: "UST_REDEMPTIONS_W",
            },
            "ust_interest_w" => Self::Passthrough {
                series: "UST_INTEREST_W",
            },
            "ust_net_w" => Self::WeeklyNetSettlement,
            _ => Self::FirstAvailable,
        }
    }

    /// Compute the indicator series.
    ///
    /// `deps` is the ordered dependency list and `resolved` maps each
    /// upper-cased id to its points (empty when resolution failed). Missing
    /// inputs yield an empty output rather than an error.
    #[must_use]
    pub fn apply(self, deps: &[String], resolved: &BTreeMap<String, Vec<Point>>) -> Vec<Point> {
        match self {
            Self::NetLiquidity => {
                let flows = [lookup(resolved, "TGA"), lookup(resolved, "RRPONTSYD")];
                forward_fill_combine(lookup(resolved, "WALCL"), &flows, |walcl, f| {
                    walcl - f[0] - f[1]
                })
            }
            Self::Delta { periods } => deps
                .first()
                .map(|id| delta(lookup(resolved, id), periods))
                .unwrap_or_default(),
            Self::Spread { left, right } => {
                let minuend = left
                    .iter()
                    .map(|id| lookup(resolved, id))
                    .find(|s| !s.is_empty());
                let Some(minuend) = minuend else {
                    return Vec::new();
                };
                intersect(minuend, lookup(resolved, right))
                    .into_iter()
                    .map(|(date, l, r)| Point::new(date, round_to(l - r, SPREAD_DECIMALS)))
                    .collect()
            }
            Self::Passthrough { series } => lookup(resolved, series).to_vec(),
            Self::WeeklyNetSettlement => weekly_net(
                lookup(resolved, "UST_AUCTION_ISSUES"),
                &[lookup(resolved, "UST_REDEMPTIONS"), lookup(resolved, "UST_INTEREST")],
            ),
            Self::FirstAvailable => deps
                .iter()
                .map(|id| lookup(resolved, id))
                .find(|s| !s.is_empty())
                .map(<[Point]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

fn lookup<'a>(resolved: &'a BTreeMap<String, Vec<Point>>, id: &str) -> &'a [Point] {
    resolved.get(id).map_or(&[][..], Vec::as_slice)
}
