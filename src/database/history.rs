use super::{Record, Result, Store};
use crate::model::{
    Account, ChannelStats, ContentBundle, ContentRecord, GrowthDelta, SimulationRecord,
    StatsSnapshot,
};

impl Store {
    crate::query! {
        fn latest_snapshot(account: &Record<Account>) -> Option<StatsSnapshot>
            where "SELECT * FROM stats WHERE account = $account ORDER BY created_at DESC LIMIT 1"
    }

    crate::query! {
        /// Most recent simulations first.
        pub fn list_simulations(account: &Record<Account>, limit: usize) -> Vec<SimulationRecord>
            where "SELECT * FROM simulations WHERE account = $account ORDER BY created_at DESC LIMIT $limit"
    }

    crate::query! {
        /// Most recently generated content first.
        pub fn list_content(account: &Record<Account>, limit: usize) -> Vec<ContentRecord>
            where "SELECT * FROM contents WHERE account = $account ORDER BY created_at DESC LIMIT $limit"
    }

    /// The most recent statistics snapshot of the account, if it has any.
    pub async fn latest_stats(&self, account: &Record<Account>) -> Result<Option<ChannelStats>> {
        let snapshot = self.latest_snapshot(account).await?;
        Ok(snapshot.map(|snapshot| snapshot.stats))
    }

    pub async fn append_stats(
        &self,
        account: &Record<Account>,
        stats: &ChannelStats,
    ) -> Result<StatsSnapshot> {
        self.insert(&StatsSnapshot::new(account.clone(), *stats))
            .await
    }

    pub async fn append_simulation(
        &self,
        account: &Record<Account>,
        hours: f64,
        delta: &GrowthDelta,
    ) -> Result<SimulationRecord> {
        self.insert(&SimulationRecord::new(account.clone(), hours, *delta))
            .await
    }

    pub async fn append_content(
        &self,
        account: &Record<Account>,
        bundle: &ContentBundle,
    ) -> Result<ContentRecord> {
        self.insert(&ContentRecord::from_bundle(account.clone(), bundle))
            .await
    }

    /// Whether any growth step has ever been recorded for the account.
    pub async fn has_simulations(&self, account: &Record<Account>) -> Result<bool> {
        let latest = self.list_simulations(account, 1).await?;
        Ok(!latest.is_empty())
    }
}
