//! The transaction pool: record store plus maintenance orchestration.
//!
//! Point operations (add, remove, reads) go straight at the record store
//! under a read-write lock. Everything derived lives in [`PoolIndices`]
//! behind one mutex; a maintenance cycle takes that mutex, promotes newly
//! admitted records (the sort pass), resegments dirty accounts and
//! refreshes the fee-priority index. Readers of the derived views take the
//! same mutex briefly and get cloned snapshots.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use tracing::{debug, trace};

use chain_types::{Address, Hash, Timestamp, U256};

use super::account::AccountState;
use super::entities::{PoolConfig, TxRecord};
use super::errors::TxPoolError;
use super::fee_index::{DependencyGroup, FeePriorityIndex};
use super::segment::{resegment, Segment};
use super::time_index::{bucket_of, TimeIndex};
use crate::ports::inbound::TxPoolApi;
use crate::ports::outbound::PoolableTransaction;

/// Record counts below this are scanned sequentially.
pub const PARALLEL_THRESHOLD: usize = 128;

/// The derived indices, kept mutually consistent under one lock.
#[derive(Default)]
struct PoolIndices {
    time: TimeIndex,
    accounts: HashMap<Address, AccountState>,
    segments: HashMap<Address, Vec<Segment>>,
    fee: FeePriorityIndex,
}

/// Transaction pool over any [`PoolableTransaction`].
pub struct TxPool<TX> {
    config: PoolConfig,
    records: RwLock<HashMap<Hash, TxRecord<TX>>>,
    indices: Mutex<PoolIndices>,
    outdated: Mutex<Vec<TX>>,
}

/// What one sort pass promotes: time-bucket entries and per-account nonce
/// map entries for every record whose materialization claim was won.
#[derive(Default)]
struct ScanDelta {
    time: Vec<(u64, Hash)>,
    accounts: HashMap<Address, Vec<(U256, (Hash, U256))>>,
}

impl ScanDelta {
    fn absorb<TX: PoolableTransaction>(&mut self, hash: &Hash, rec: &TxRecord<TX>) {
        if !rec.try_materialize() {
            return;
        }
        let tx = rec.tx();
        self.time.push((bucket_of(tx.timestamp()), *hash));
        self.accounts
            .entry(tx.sender())
            .or_default()
            .push((tx.nonce(), (*hash, tx.fee_cost())));
    }

    fn merge(mut self, other: Self) -> Self {
        self.time.extend(other.time);
        for (addr, entries) in other.accounts {
            self.accounts.entry(addr).or_default().extend(entries);
        }
        self
    }

    fn is_empty(&self) -> bool {
        self.time.is_empty() && self.accounts.is_empty()
    }
}

impl<TX: PoolableTransaction> TxPool<TX> {
    /// An empty pool with the given configuration.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            records: RwLock::new(HashMap::new()),
            indices: Mutex::new(PoolIndices::default()),
            outdated: Mutex::new(Vec::new()),
        }
    }

    /// The pool's (clamped) configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Claims and collects every unmaterialized record.
    ///
    /// Map-reduce over the record store: workers fold private deltas, the
    /// reduce step unions them. The one-shot claim means a record lands in
    /// exactly one delta; the per-key idempotent merges downstream make a
    /// redundant scan harmless.
    fn scan_unmaterialized(&self) -> ScanDelta {
        let records = self.records.read();
        if records.len() < PARALLEL_THRESHOLD {
            let mut delta = ScanDelta::default();
            for (hash, rec) in records.iter() {
                delta.absorb(hash, rec);
            }
            delta
        } else {
            records
                .par_iter()
                .fold(ScanDelta::default, |mut delta, (hash, rec)| {
                    delta.absorb(hash, rec);
                    delta
                })
                .reduce(ScanDelta::default, ScanDelta::merge)
        }
    }

    /// Merges a sort-pass delta into the time index and nonce maps.
    ///
    /// A record superseded at its nonce (same account, same nonce, different
    /// hash) is retired: dropped from the record store and time index and
    /// pushed onto the outdated side list.
    fn apply_scan(&self, indices: &mut PoolIndices, delta: ScanDelta) {
        for (bucket, hash) in delta.time {
            indices.time.merge(bucket, [hash]);
        }

        let mut displaced = Vec::new();
        for (addr, entries) in delta.accounts {
            let account = indices.accounts.entry(addr).or_default();
            displaced.extend(account.merge(entries));
        }

        if !displaced.is_empty() {
            trace!(count = displaced.len(), "retiring superseded records");
            let mut records = self.records.write();
            let mut outdated = self.outdated.lock();
            for hash in displaced {
                if let Some(rec) = records.remove(&hash) {
                    let tx = rec.into_tx();
                    indices.time.remove(bucket_of(tx.timestamp()), &hash);
                    outdated.push(tx);
                }
            }
        }
    }

    /// Reconciles and rebuilds segments for every dirty account, then prunes
    /// accounts whose nonce map has emptied.
    fn resegment_dirty(indices: &mut PoolIndices, seq_max: usize) {
        let PoolIndices {
            accounts,
            segments,
            fee,
            ..
        } = indices;

        for (addr, account) in accounts.iter_mut() {
            if !account.is_dirty() {
                continue;
            }
            let prior = segments.remove(addr).unwrap_or_default();
            let rebuilt = resegment(account, prior, fee, seq_max);
            if !rebuilt.is_empty() {
                segments.insert(*addr, rebuilt);
            }
            account.mark_reconciled();
        }

        accounts.retain(|_, account| !account.is_empty());
    }

    /// Walks each account's segment list in nonce order, inserting unindexed
    /// segments into the fee-priority index.
    ///
    /// Each inserted group carries the previous segment's head key as its
    /// dependency. A kept segment whose predecessor changed (for example
    /// when an earlier segment was consumed) gets its group re-linked in
    /// place.
    fn rebuild_fee_groups(indices: &mut PoolIndices) {
        let PoolIndices {
            accounts,
            segments,
            fee,
            ..
        } = indices;

        for (addr, segs) in segments.iter_mut() {
            let Some(account) = accounts.get(addr) else {
                continue;
            };
            let mut prev_head: Option<Hash> = None;
            for seg in segs.iter_mut() {
                match seg.indexed_head() {
                    Some(head) => {
                        let current = fee.get(&seg.avg_fee, &head).map(|g| g.depends_on);
                        match current {
                            Some(dep) if dep == prev_head => {}
                            Some(_) => {
                                if let Some(mut group) = fee.remove_group(&seg.avg_fee, &head) {
                                    group.depends_on = prev_head;
                                    fee.insert(group);
                                }
                            }
                            None => {
                                // Group lost to a cleanup race, rebuild it.
                                Self::insert_group(account, *addr, seg, prev_head, fee);
                            }
                        }
                        prev_head = Some(head);
                    }
                    None => {
                        if let Some(head) = Self::insert_group(account, *addr, seg, prev_head, fee)
                        {
                            seg.mark_indexed(head);
                            prev_head = Some(head);
                        }
                    }
                }
            }
        }
    }

    /// Builds and inserts one segment's dependency group from the account's
    /// nonce map. Returns the group's head key.
    fn insert_group(
        account: &AccountState,
        address: Address,
        seg: &Segment,
        depends_on: Option<Hash>,
        fee: &mut FeePriorityIndex,
    ) -> Option<Hash> {
        let mut keys: Vec<Hash> = Vec::with_capacity(seg.len);
        for (i, (&nonce, &(hash, _))) in
            account.iter_from(seg.start_nonce).take(seg.len).enumerate()
        {
            debug_assert_eq!(
                nonce,
                seg.start_nonce + U256::from(i),
                "segment out of step with nonce map"
            );
            keys.push(hash);
        }
        debug_assert_eq!(keys.len(), seg.len, "segment out of step with nonce map");
        let head = *keys.first()?;
        fee.insert(DependencyGroup {
            fee: seg.avg_fee,
            address,
            keys,
            depends_on,
        });
        Some(head)
    }
}

impl<TX: PoolableTransaction> TxPoolApi<TX> for TxPool<TX> {
    fn add(&self, tx: TX) -> Result<Hash, TxPoolError> {
        let hash = tx.hash();
        let mut records = self.records.write();
        match records.entry(hash) {
            Entry::Occupied(_) => Err(TxPoolError::DuplicateTransaction(hash)),
            Entry::Vacant(slot) => {
                slot.insert(TxRecord::new(tx));
                trace!("transaction admitted");
                Ok(hash)
            }
        }
    }

    fn add_all(&self, txs: Vec<TX>) -> Vec<TX> {
        txs.into_iter()
            .filter(|tx| self.add(tx.clone()).is_ok())
            .collect()
    }

    fn remove_all(&self, txs: &[TX]) -> Vec<TX> {
        let mut indices = self.indices.lock();
        let mut records = self.records.write();
        let mut removed = Vec::new();

        for tx in txs {
            let hash = tx.hash();
            let Some(rec) = records.remove(&hash) else {
                continue;
            };
            let stored = rec.into_tx();
            indices.time.remove(bucket_of(stored.timestamp()), &hash);
            if let Some(account) = indices.accounts.get_mut(&stored.sender()) {
                account.remove(&stored.nonce(), &hash);
            }
            removed.push(stored);
        }

        if !removed.is_empty() {
            debug!(
                removed = removed.len(),
                pooled = records.len(),
                "transactions evicted"
            );
        }
        removed
    }

    fn size(&self) -> usize {
        self.records.read().len()
    }

    fn snapshot(&self) -> Vec<TX> {
        self.records
            .read()
            .values()
            .map(|rec| rec.tx().clone())
            .collect()
    }

    fn best_nonce_range(&self, address: &Address) -> Option<(U256, U256)> {
        self.indices.lock().accounts.get(address)?.nonce_range()
    }

    fn ranked_groups(&self) -> Vec<DependencyGroup> {
        self.indices.lock().fee.ranked_groups()
    }

    fn stale_keys(&self, cutoff: Timestamp) -> Vec<Hash> {
        self.indices.lock().time.keys_older_than(bucket_of(cutoff))
    }

    fn take_outdated(&self) -> Vec<TX> {
        std::mem::take(&mut *self.outdated.lock())
    }

    fn run_maintenance(&self) {
        let mut indices = self.indices.lock();

        let delta = self.scan_unmaterialized();
        if !delta.is_empty() {
            debug!(
                promoted = delta.time.len(),
                accounts = delta.accounts.len(),
                "sort pass promoted records"
            );
        }
        self.apply_scan(&mut indices, delta);

        Self::resegment_dirty(&mut indices, self.config.seq_max);
        Self::rebuild_fee_groups(&mut indices);

        trace!(
            accounts = indices.accounts.len(),
            groups = indices.fee.group_count(),
            "maintenance cycle complete"
        );
    }

    fn clear(&self) {
        let mut indices = self.indices.lock();
        self.records.write().clear();
        self.outdated.lock().clear();
        indices.time.clear();
        indices.accounts.clear();
        indices.segments.clear();
        indices.fee.clear();
        debug!("pool cleared");
    }
}
