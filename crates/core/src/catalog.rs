//! In-memory campaign catalog, the data source collaborators read campaign
//! records from. Seeded with the demo campaign list.

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CampaignError, CampaignResult};
use crate::types::{
    Campaign, CampaignStatus, CampaignVariants, DateRange, PerformanceTier, VariantMetrics,
};

/// Dashboard headline numbers across the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogOverview {
    pub total_campaigns: usize,
    pub running: usize,
    pub testing: usize,
    pub scheduled: usize,
    pub average_ctr: f64,
    pub average_conversion_rate: f64,
}

pub struct CampaignCatalog {
    campaigns: DashMap<String, Campaign>,
}

impl CampaignCatalog {
    pub fn new() -> Self {
        Self {
            campaigns: DashMap::new(),
        }
    }

    /// Catalog pre-loaded with the twelve demo campaigns.
    pub fn with_demo_campaigns() -> Self {
        let catalog = Self::new();
        for campaign in demo_campaigns() {
            catalog.upsert(campaign);
        }
        catalog
    }

    pub fn upsert(&self, campaign: Campaign) {
        debug!(campaign_id = %campaign.id, "Campaign stored");
        self.campaigns.insert(campaign.id.clone(), campaign);
    }

    pub fn get(&self, id: &str) -> CampaignResult<Campaign> {
        self.campaigns
            .get(id)
            .map(|c| c.clone())
            .ok_or_else(|| CampaignError::NotFound(id.to_string()))
    }

    /// All campaigns ordered by id (numeric ids sort numerically).
    pub fn list(&self) -> Vec<Campaign> {
        let mut all: Vec<Campaign> = self.campaigns.iter().map(|c| c.value().clone()).collect();
        all.sort_by(|a, b| (a.id.len(), &a.id).cmp(&(b.id.len(), &b.id)));
        all
    }

    /// Case-insensitive title search. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<Campaign> {
        let needle = query.trim().to_lowercase();
        self.list()
            .into_iter()
            .filter(|c| needle.is_empty() || c.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.campaigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.campaigns.is_empty()
    }

    pub fn overview(&self) -> CatalogOverview {
        let all = self.list();
        let count_status = |s: CampaignStatus| all.iter().filter(|c| c.status == s).count();
        let mean = |f: fn(&Campaign) -> f64| {
            if all.is_empty() {
                0.0
            } else {
                all.iter().map(f).sum::<f64>() / all.len() as f64
            }
        };

        CatalogOverview {
            total_campaigns: all.len(),
            running: count_status(CampaignStatus::Running),
            testing: count_status(CampaignStatus::Testing),
            scheduled: count_status(CampaignStatus::Scheduled),
            average_ctr: mean(|c: &Campaign| c.click_through_rate),
            average_conversion_rate: mean(|c: &Campaign| c.conversion_rate),
        }
    }
}

impl Default for CampaignCatalog {
    fn default() -> Self {
        Self::new()
    }
}

struct DemoRow {
    id: &'static str,
    title: &'static str,
    from: (u32, u32),
    to: (u32, u32),
    owner: &'static str,
    status: CampaignStatus,
    cr: f64,
    ctr: f64,
    tier: PerformanceTier,
    a: (f64, f64, f64),
    b: (f64, f64, f64),
}

const DEMO_YEAR: i32 = 2025;

const DEMO_ROWS: [DemoRow; 12] = [
    DemoRow { id: "1", title: "Back-to-School 2025", from: (9, 1), to: (9, 30), owner: "Alice Martin", status: CampaignStatus::Running, cr: 2.4, ctr: 4.2, tier: PerformanceTier::Good, a: (2.6, 3.9, 84_500.0), b: (2.1, 4.6, 79_200.0) },
    DemoRow { id: "2", title: "VIP Autumn", from: (9, 10), to: (10, 20), owner: "Hugo Leroy", status: CampaignStatus::Scheduled, cr: 1.2, ctr: 2.1, tier: PerformanceTier::Average, a: (1.3, 2.0, 42_000.0), b: (1.1, 2.2, 38_500.0) },
    DemoRow { id: "3", title: "Clearance Equipment", from: (9, 5), to: (10, 15), owner: "Judith Perez", status: CampaignStatus::Testing, cr: 0.7, ctr: 1.5, tier: PerformanceTier::Poor, a: (0.8, 1.4, 18_200.0), b: (0.6, 1.6, 15_800.0) },
    DemoRow { id: "4", title: "Partnership X Launch", from: (9, 25), to: (10, 25), owner: "Guillaume N.", status: CampaignStatus::Running, cr: 3.1, ctr: 5.0, tier: PerformanceTier::Good, a: (3.2, 4.8, 92_000.0), b: (3.0, 5.2, 88_500.0) },
    DemoRow { id: "5", title: "Holiday Gift Guide", from: (10, 15), to: (12, 31), owner: "Sophie Chen", status: CampaignStatus::Scheduled, cr: 2.8, ctr: 4.5, tier: PerformanceTier::Good, a: (2.9, 4.3, 76_000.0), b: (2.7, 4.7, 73_500.0) },
    DemoRow { id: "6", title: "Winter Sale Preview", from: (11, 20), to: (12, 5), owner: "Marcus Brown", status: CampaignStatus::Testing, cr: 1.9, ctr: 3.2, tier: PerformanceTier::Average, a: (2.0, 3.1, 54_000.0), b: (1.8, 3.3, 51_500.0) },
    DemoRow { id: "7", title: "Black Friday Early Access", from: (11, 18), to: (11, 24), owner: "Emma Wilson", status: CampaignStatus::Running, cr: 4.2, ctr: 6.8, tier: PerformanceTier::Good, a: (4.3, 6.5, 128_000.0), b: (4.1, 7.1, 124_500.0) },
    DemoRow { id: "8", title: "New Member Welcome", from: (10, 1), to: (10, 31), owner: "Liam Davis", status: CampaignStatus::Running, cr: 2.1, ctr: 3.6, tier: PerformanceTier::Average, a: (2.2, 3.5, 48_000.0), b: (2.0, 3.7, 45_500.0) },
    DemoRow { id: "9", title: "Re-engagement Campaign", from: (9, 12), to: (10, 12), owner: "Olivia Taylor", status: CampaignStatus::Testing, cr: 1.4, ctr: 2.8, tier: PerformanceTier::Average, a: (1.5, 2.7, 32_000.0), b: (1.3, 2.9, 29_500.0) },
    DemoRow { id: "10", title: "Premium Upgrade Offer", from: (10, 5), to: (10, 20), owner: "Noah Martinez", status: CampaignStatus::Running, cr: 3.5, ctr: 5.4, tier: PerformanceTier::Good, a: (3.6, 5.2, 98_000.0), b: (3.4, 5.6, 95_500.0) },
    DemoRow { id: "11", title: "Product Launch Teaser", from: (9, 28), to: (10, 15), owner: "Ava Anderson", status: CampaignStatus::Running, cr: 2.7, ctr: 4.1, tier: PerformanceTier::Good, a: (2.8, 4.0, 68_000.0), b: (2.6, 4.2, 65_500.0) },
    DemoRow { id: "12", title: "Customer Appreciation Week", from: (10, 15), to: (10, 22), owner: "Ethan White", status: CampaignStatus::Scheduled, cr: 3.0, ctr: 4.8, tier: PerformanceTier::Good, a: (3.1, 4.7, 82_000.0), b: (2.9, 4.9, 79_500.0) },
];

fn demo_campaigns() -> impl Iterator<Item = Campaign> {
    DEMO_ROWS.iter().filter_map(|row| {
        let from = NaiveDate::from_ymd_opt(DEMO_YEAR, row.from.0, row.from.1)?;
        let to = NaiveDate::from_ymd_opt(DEMO_YEAR, row.to.0, row.to.1)?;
        let metrics = |(cr, ctr, revenue): (f64, f64, f64)| VariantMetrics {
            conversion_rate: cr,
            click_through_rate: ctr,
            revenue,
        };
        Some(Campaign {
            id: row.id.to_string(),
            title: row.title.to_string(),
            date_range: DateRange::new(from, to),
            owner: row.owner.to_string(),
            status: row.status,
            conversion_rate: row.cr,
            click_through_rate: row.ctr,
            performance: row.tier,
            variants: CampaignVariants {
                a: metrics(row.a),
                b: metrics(row.b),
            },
        })
    })
}
