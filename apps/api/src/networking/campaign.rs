use std::collections::BTreeMap;

use serde::Serialize;

use super::models::{Campaign, Outreach, OutreachStatus};

const DEFAULT_VARIANT: &str = "default";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMetrics {
    pub total: usize,
    pub pending: usize,
    pub sent: usize,
    pub responded: usize,
    pub no_response: usize,
    /// Everything that left the pending state.
    pub contacted: usize,
    pub response_rate: f64,
    pub outreach_progress: f64,
    pub response_progress: f64,
    pub variants: Vec<VariantMetrics>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetrics {
    pub variant: String,
    pub total: usize,
    pub contacted: usize,
    pub responded: usize,
    pub response_rate: f64,
}

pub fn campaign_metrics(campaign: &Campaign) -> CampaignMetrics {
    let mut metrics = CampaignMetrics::default();
    let mut by_variant: BTreeMap<&str, VariantMetrics> = BTreeMap::new();

    for outreach in &campaign.outreach {
        metrics.total += 1;
        match outreach.status {
            OutreachStatus::Pending => metrics.pending += 1,
            OutreachStatus::Sent => metrics.sent += 1,
            OutreachStatus::Responded => metrics.responded += 1,
            OutreachStatus::NoResponse => metrics.no_response += 1,
        }

        let label = variant_label(outreach);
        let entry = by_variant.entry(label).or_insert_with(|| VariantMetrics {
            variant: label.to_string(),
            ..Default::default()
        });
        entry.total += 1;
        if outreach.status != OutreachStatus::Pending {
            entry.contacted += 1;
        }
        if outreach.status == OutreachStatus::Responded {
            entry.responded += 1;
        }
    }

    metrics.contacted = metrics.sent + metrics.responded + metrics.no_response;
    metrics.response_rate = percent(metrics.responded, metrics.contacted);
    metrics.outreach_progress =
        percent(metrics.contacted, campaign.goals.outreach_count as usize).min(100.0);
    metrics.response_progress =
        percent(metrics.responded, campaign.goals.response_target as usize).min(100.0);
    metrics.variants = by_variant
        .into_values()
        .map(|mut v| {
            v.response_rate = percent(v.responded, v.contacted);
            v
        })
        .collect();
    metrics
}

fn variant_label(outreach: &Outreach) -> &str {
    outreach
        .variant
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_VARIANT)
}

/// `part / whole` as a percentage; 0 for an empty whole.
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}
